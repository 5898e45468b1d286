use crate::chunk::pad_chunk;
use crate::cli::{dispatch_width, KeySource};
use crate::erasure::{ErasureContext, ErasureShape};
use crate::error::Result;
use crate::header::{ParityHeader, Width};
use crate::parity::{key_fingerprint, write_parity_file, ParityFile};
use crate::ring::{symbols_from_bytes_into, symbols_to_bytes, Ring};
use log::info;
use rayon::prelude::*;
use std::path::Path;

/// Options for the protect command
#[derive(Debug, Clone)]
pub struct ProtectOptions {
    pub key: KeySource,
    pub width: Width,
    /// Symbols per protected chunk (S)
    pub block_symbols: usize,
    /// Redundancy symbols per chunk (E), the longest repairable burst
    pub redundancy: usize,
    /// Auxiliary symbols per chunk (C) used to locate the burst
    pub auxiliary: usize,
    /// Burst scan stride recorded for recovery
    pub stride: usize,
}

impl Default for ProtectOptions {
    fn default() -> Self {
        Self {
            key: KeySource::None,
            width: Width::default(),
            block_symbols: 64,
            redundancy: 3,
            auxiliary: 2,
            stride: 1,
        }
    }
}

impl ProtectOptions {
    pub fn shape(&self) -> Result<ErasureShape> {
        ErasureShape::new(self.block_symbols, self.redundancy, self.auxiliary)
    }
}

/// Compute a parity file for `input_path`
pub fn protect_file(input_path: &Path, parity_path: &Path, options: &ProtectOptions) -> Result<ParityHeader> {
    let data = std::fs::read(input_path)?;
    let parity = dispatch_width!(options.width, protect_symbols(&data, options))?;
    write_parity_file(parity_path, &parity)?;
    info!(
        "protected {} bytes in {} chunks ({} parity bytes each)",
        data.len(),
        parity.header.chunk_count,
        parity.header.record_bytes()
    );
    Ok(parity.header)
}

/// Compute parity records for a buffer, zero-padding the final short chunk
pub fn protect_bytes(data: &[u8], options: &ProtectOptions) -> Result<ParityFile> {
    dispatch_width!(options.width, protect_symbols(data, options))
}

fn protect_symbols<T: Ring>(data: &[u8], options: &ProtectOptions) -> Result<ParityFile> {
    let shape = options.shape()?;
    let symmetry = options.key.symmetry::<T>(shape.block)?;
    let context = ErasureContext::new(&symmetry, shape)?;
    let header = ParityHeader::new(
        options.width,
        shape,
        options.stride,
        data.len() as u64,
        key_fingerprint(&symmetry),
    )?;

    let chunk_bytes = header.chunk_bytes();
    let record_bytes = header.record_bytes();
    let records = data
        .par_chunks(chunk_bytes)
        .map_init(
            || {
                (
                    context.scratch(),
                    vec![T::ZERO; shape.block],
                    vec![T::ZERO; shape.extension_len()],
                )
            },
            |(scratch, block, extension), chunk| {
                if chunk.len() < chunk_bytes {
                    symbols_from_bytes_into(&pad_chunk(chunk, chunk_bytes, |_| {}), block);
                } else {
                    symbols_from_bytes_into(chunk, block);
                }
                context.extend_into(block, extension, scratch)?;
                let mut record = vec![0u8; record_bytes];
                symbols_to_bytes(extension, &mut record);
                Ok(record)
            },
        )
        .collect::<Result<Vec<_>>>()?;

    Ok(ParityFile { header, records })
}
