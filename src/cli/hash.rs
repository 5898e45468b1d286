use crate::chunk::pad_chunk;
use crate::cli::{dispatch_width, KeySource};
use crate::error::Result;
use crate::hash::BlockHasher;
use crate::header::{HashMode, Width};
use crate::ring::{symbols_from_bytes_into, symbols_to_bytes, Ring};
use rayon::prelude::*;
use std::path::Path;

/// Options for the hash command
#[derive(Debug, Clone)]
pub struct HashOptions {
    /// Ignored by the feedback mode
    pub key: KeySource,
    pub width: Width,
    pub block_symbols: usize,
    /// Digest symbols per block (H)
    pub digest_symbols: usize,
    pub mode: HashMode,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            key: KeySource::None,
            width: Width::default(),
            block_symbols: 64,
            digest_symbols: 4,
            mode: HashMode::default(),
        }
    }
}

/// Hash a file block by block; returns one hex digest per block
pub fn hash_file(input_path: &Path, options: &HashOptions) -> Result<Vec<String>> {
    let data = std::fs::read(input_path)?;
    hash_bytes(&data, options)
}

/// Hash a buffer block by block, zero-padding the final short block
pub fn hash_bytes(data: &[u8], options: &HashOptions) -> Result<Vec<String>> {
    dispatch_width!(options.width, hash_symbols(data, options))
}

fn hash_symbols<T: Ring>(data: &[u8], options: &HashOptions) -> Result<Vec<String>> {
    let hasher = match options.mode {
        HashMode::Feedback => BlockHasher::<T>::feedback(options.block_symbols, options.digest_symbols)?,
        mode => {
            let symmetry = options.key.symmetry::<T>(options.block_symbols)?;
            BlockHasher::new(&symmetry, mode, options.digest_symbols)?
        }
    };
    let chunk_bytes = options.block_symbols * T::BYTES;
    let digest_bytes = options.digest_symbols * T::BYTES;

    data.par_chunks(chunk_bytes)
        .map_init(
            || {
                (
                    vec![T::ZERO; options.block_symbols],
                    vec![T::ZERO; options.digest_symbols],
                    vec![T::ZERO; options.block_symbols],
                )
            },
            |(block, digest, scratch), chunk| {
                if chunk.len() < chunk_bytes {
                    symbols_from_bytes_into(&pad_chunk(chunk, chunk_bytes, |_| {}), block);
                } else {
                    symbols_from_bytes_into(chunk, block);
                }
                hasher.digest_into(block, digest, scratch)?;
                let mut bytes = vec![0u8; digest_bytes];
                symbols_to_bytes(digest, &mut bytes);
                Ok(hex::encode(bytes))
            },
        )
        .collect()
}
