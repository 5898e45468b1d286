use crate::chunk::chunk_count;
use crate::erasure::ErasureShape;
use crate::error::{ElectiveError, Result};
use serde::{Deserialize, Serialize};

/// Ring word width used by the file drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Width {
    U8,
    U16,
    U32,
    #[default]
    U64,
}

impl Width {
    /// Bytes per symbol
    pub fn bytes(&self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }

    pub fn bits(&self) -> usize {
        self.bytes() * 8
    }
}

impl std::str::FromStr for Width {
    type Err = ElectiveError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "8" | "u8" => Ok(Self::U8),
            "16" | "u16" => Ok(Self::U16),
            "32" | "u32" => Ok(Self::U32),
            "64" | "u64" => Ok(Self::U64),
            _ => Err(ElectiveError::UnsupportedAlgorithm(format!("width: {}", s))),
        }
    }
}

impl std::fmt::Display for Width {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "u{}", self.bits())
    }
}

/// Cipher composition order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CipherMode {
    /// Pascal diffusion before the polynomial step; decrypts with ToFunction alone
    #[default]
    Long,
    /// Polynomial step only; decrypts with ToFunction then Pascal
    Short,
}

impl std::str::FromStr for CipherMode {
    type Err = ElectiveError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            _ => Err(ElectiveError::UnsupportedAlgorithm(format!("cipher: {}", s))),
        }
    }
}

/// Block hash variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    #[default]
    Long,
    Short,
    /// Keyed by the input block itself; needs no key material
    Feedback,
}

impl std::str::FromStr for HashMode {
    type Err = ElectiveError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            "feedback" => Ok(Self::Feedback),
            _ => Err(ElectiveError::UnsupportedAlgorithm(format!("hash: {}", s))),
        }
    }
}

/// Parity file header - describes how the data file was chunked and protected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParityHeader {
    /// Format version
    pub version: u32,
    /// Symbol width
    pub width: Width,
    /// Symbols per chunk (S)
    pub block_symbols: usize,
    /// Redundancy symbols per chunk (E)
    pub redundancy: usize,
    /// Auxiliary symbols per chunk (C)
    pub auxiliary: usize,
    /// Default burst scan stride for recovery
    pub stride: usize,
    /// Size of the protected data file in bytes
    pub original_size: u64,
    /// Number of parity records that follow the header
    pub chunk_count: usize,
    /// Hex fingerprint of the key, to reject a wrong password before scanning
    pub key_check: String,
}

impl Default for ParityHeader {
    fn default() -> Self {
        Self {
            version: 1,
            width: Width::default(),
            block_symbols: 64,
            redundancy: 3,
            auxiliary: 2,
            stride: 1,
            original_size: 0,
            chunk_count: 0,
            key_check: String::new(),
        }
    }
}

impl ParityHeader {
    pub const VERSION: u32 = 1;

    /// Create a header for an explicit geometry
    pub fn new(
        width: Width,
        shape: ErasureShape,
        stride: usize,
        original_size: u64,
        key_check: String,
    ) -> Result<Self> {
        shape.validate()?;
        let chunk_count = chunk_count(to_len(original_size)?, shape.block * width.bytes());

        let header = Self {
            version: Self::VERSION,
            width,
            block_symbols: shape.block,
            redundancy: shape.redundancy,
            auxiliary: shape.auxiliary,
            stride,
            original_size,
            chunk_count,
            key_check,
        };
        header.check()?;
        Ok(header)
    }

    /// Reject headers whose geometry, stride or record count cannot describe
    /// a protected file.
    pub fn check(&self) -> Result<()> {
        self.shape()?;
        if self.stride == 0 {
            return Err(ElectiveError::InvalidShape("stride must be positive".into()));
        }
        let expected = chunk_count(to_len(self.original_size)?, self.chunk_bytes());
        if self.chunk_count != expected {
            return Err(ElectiveError::InvalidFormat(format!(
                "{} records declared but {} bytes need {}",
                self.chunk_count, self.original_size, expected
            )));
        }
        Ok(())
    }

    /// Erasure geometry, validated
    pub fn shape(&self) -> Result<ErasureShape> {
        ErasureShape::new(self.block_symbols, self.redundancy, self.auxiliary)
    }

    /// Bytes of data covered by one record
    pub fn chunk_bytes(&self) -> usize {
        self.block_symbols * self.width.bytes()
    }

    /// Bytes of one parity record (E + C symbols)
    pub fn record_bytes(&self) -> usize {
        (self.redundancy + self.auxiliary) * self.width.bytes()
    }

    /// Serialize header to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize header from JSON bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header: Self = serde_json::from_slice(data)?;
        if header.version != Self::VERSION {
            return Err(ElectiveError::InvalidFormat(format!(
                "unsupported parity version {}",
                header.version
            )));
        }
        header.check()?;
        Ok(header)
    }
}

fn to_len(size: u64) -> Result<usize> {
    usize::try_from(size)
        .map_err(|_| ElectiveError::InvalidFormat(format!("size {} does not fit in memory", size)))
}
