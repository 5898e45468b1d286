pub mod encrypt;
pub mod hash;
pub mod info;
pub mod keygen;
pub mod protect;
pub mod recover;

pub use encrypt::*;
pub use hash::*;
pub use info::*;
pub use keygen::*;
pub use protect::*;
pub use recover::*;

use crate::error::{ElectiveError, Result};
use crate::ring::{symbols_from_bytes_into, symbols_to_bytes, Ring};
use crate::symmetry::Symmetry;
use rayon::prelude::*;
use std::path::PathBuf;

/// Where a command takes its key material from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeySource {
    #[default]
    None,
    Password(String),
    KeyFile(PathBuf),
}

impl KeySource {
    /// Pick the source from the mutually exclusive CLI flags
    pub fn from_flags(password: Option<String>, key_file: Option<PathBuf>) -> Self {
        match (password, key_file) {
            (Some(password), _) => Self::Password(password),
            (None, Some(path)) => Self::KeyFile(path),
            (None, None) => Self::None,
        }
    }

    /// Derive a symmetry vector of `len` symbols
    pub fn symmetry<T: Ring>(&self, len: usize) -> Result<Symmetry<T>> {
        match self {
            Self::None => Err(ElectiveError::KeyRequired),
            Self::Password(password) => Symmetry::from_password(password, len),
            Self::KeyFile(path) => {
                let bytes = std::fs::read(path)?;
                Symmetry::from_key_bytes(&bytes, len)
            }
        }
    }
}

/// Run a generic function at the concrete ring type selected by a [`Width`].
///
/// [`Width`]: crate::header::Width
macro_rules! dispatch_width {
    ($width:expr, $func:ident ( $($arg:expr),* $(,)? )) => {
        match $width {
            $crate::header::Width::U8 => $func::<u8>($($arg),*),
            $crate::header::Width::U16 => $func::<u16>($($arg),*),
            $crate::header::Width::U32 => $func::<u32>($($arg),*),
            $crate::header::Width::U64 => $func::<u64>($($arg),*),
        }
    };
}
pub(crate) use dispatch_width;

/// Apply a block operation to every whole chunk of `input`, writing `output`.
///
/// Chunks run on the rayon pool; each worker owns its input, output and
/// scratch symbol buffers.
pub(crate) fn transform_chunks<T, F>(
    input: &[u8],
    output: &mut [u8],
    block_symbols: usize,
    op: F,
) -> Result<()>
where
    T: Ring,
    F: Fn(&[T], &mut [T], &mut [T]) -> Result<()> + Sync,
{
    let chunk_bytes = block_symbols * T::BYTES;
    debug_assert_eq!(input.len(), output.len());
    debug_assert_eq!(input.len() % chunk_bytes, 0);

    output
        .par_chunks_mut(chunk_bytes)
        .zip(input.par_chunks(chunk_bytes))
        .try_for_each_init(
            || {
                (
                    vec![T::ZERO; block_symbols],
                    vec![T::ZERO; block_symbols],
                    vec![T::ZERO; block_symbols],
                )
            },
            |(block, result, scratch), (dst, src)| {
                symbols_from_bytes_into(src, block);
                op(block, result, scratch)?;
                symbols_to_bytes(result, dst);
                Ok(())
            },
        )
}
