use thiserror::Error;

#[derive(Error, Debug)]
pub enum ElectiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Symmetry error: no odd pivot for column {column}, key is unusable for this shape")]
    SymmetryError { column: usize },

    #[error("Elective transform pivot {0:#x} has no inverse")]
    DegeneratePivot(u64),

    #[error("Element {0:#x} is not invertible modulo 2^W")]
    NotInvertible(u64),

    #[error("Matrix error: {0}")]
    MatrixError(String),

    #[error("Length mismatch: expected {expected} symbols, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Key required: pass --password or --key-file")]
    KeyRequired,
}

pub type Result<T> = std::result::Result<T, ElectiveError>;
