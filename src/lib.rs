//! Elective - keyed ring transforms over Z/2^W
//!
//! A symmetry vector derived from a password or key file drives two
//! triangular matrices, the Elective Symmetry and the Elective Transform.
//! Combined with the Pascal (binomial) transform they give three tools that
//! share one set of primitives:
//!
//! - **Cipher**: exact, invertible block encryption in two composition orders
//! - **Hash**: keyed or data-fed (feedback) block digests
//! - **Erasure code**: per-block redundancy that validates a block and
//!   repairs a single contiguous burst of corrupted symbols
//!
//! ## Transform Pipeline
//!
//! ```text
//! Key → Symmetry → {Pascal, Elective Transform, Elective Symmetry} → Cipher / Hash
//!                 → Erasure context (2S rows, odd-pivot elimination, fold) → Protect / Validate / Repair
//! ```
//!
//! Ring arithmetic wraps modulo 2^W, so 2 is a zero divisor and only odd
//! elements are invertible. Every pivot search in the crate tests oddness.
//!
//! ## Example
//!
//! ```no_run
//! use elective::cli::{protect_file, recover_file, KeySource, ProtectOptions, RecoverOptions};
//! use std::path::Path;
//!
//! let key = KeySource::Password("my_secret".into());
//!
//! let protect = ProtectOptions {
//!     key: key.clone(),
//!     ..Default::default()
//! };
//! protect_file(Path::new("data.bin"), Path::new("data.epf"), &protect).unwrap();
//!
//! let recover = RecoverOptions {
//!     key,
//!     ..Default::default()
//! };
//! let report = recover_file(Path::new("data.bin"), Path::new("data.epf"), &recover).unwrap();
//! assert!(report.is_complete());
//! ```

pub mod analysis;
pub mod chunk;
pub mod cipher;
pub mod cli;
pub mod elective;
pub mod erasure;
pub mod error;
pub mod hash;
pub mod header;
pub mod parity;
pub mod pascal;
pub mod ring;
pub mod symmetry;
pub mod view;

pub use cipher::BlockCipher;
pub use elective::{ElectiveSymmetry, ElectiveTransform};
pub use erasure::{ErasureContext, ErasureShape};
pub use error::{ElectiveError, Result};
pub use hash::BlockHasher;
pub use header::{CipherMode, HashMode, ParityHeader, Width};
pub use parity::{read_parity_file, write_parity_file, ParityFile};
pub use pascal::PascalTriangle;
pub use ring::{Nibble, Ring};
pub use symmetry::Symmetry;
