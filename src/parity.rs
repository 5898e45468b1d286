use crate::error::{ElectiveError, Result};
use crate::header::ParityHeader;
use crate::ring::{symbols_to_bytes, Ring};
use crate::symmetry::Symmetry;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic bytes for the parity file format
const PARITY_MAGIC: &[u8; 4] = b"EPF\x01";

/// Upper bound on the JSON header; real headers are a few hundred bytes
const MAX_HEADER_LEN: usize = 64 * 1024;

/// A parity file: header plus one fixed-size record per data chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParityFile {
    pub header: ParityHeader,
    /// Raw records, each `header.record_bytes()` long
    pub records: Vec<Vec<u8>>,
}

impl ParityFile {
    pub fn new(header: ParityHeader) -> Self {
        Self {
            header,
            records: Vec::new(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// Short hex fingerprint of a symmetry vector, stored in the header
pub fn key_fingerprint<T: Ring>(symmetry: &Symmetry<T>) -> String {
    let mut bytes = vec![0u8; symmetry.len() * T::BYTES];
    symbols_to_bytes(symmetry.as_slice(), &mut bytes);
    let digest = Sha256::digest(&bytes);
    hex::encode(&digest[..8])
}

/// Read magic, length and header; returns the header and the bytes consumed
fn read_preamble<R: Read>(reader: &mut R) -> Result<(ParityHeader, u64)> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != PARITY_MAGIC {
        return Err(ElectiveError::InvalidFormat(
            "Invalid parity magic bytes".into(),
        ));
    }

    let mut header_len_bytes = [0u8; 4];
    reader.read_exact(&mut header_len_bytes)?;
    let header_len = u32::from_le_bytes(header_len_bytes) as usize;
    if header_len > MAX_HEADER_LEN {
        return Err(ElectiveError::InvalidFormat(format!(
            "parity header of {} bytes exceeds {}",
            header_len, MAX_HEADER_LEN
        )));
    }

    let mut header_bytes = vec![0u8; header_len];
    reader.read_exact(&mut header_bytes)?;
    let header = ParityHeader::from_bytes(&header_bytes)?;
    Ok((header, (PARITY_MAGIC.len() + 4 + header_len) as u64))
}

/// Read a parity file from disk
pub fn read_parity_file(path: &Path) -> Result<ParityFile> {
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let (header, consumed) = read_preamble(&mut reader)?;

    let record_bytes = header.record_bytes();
    let needed = (header.chunk_count as u64).checked_mul(record_bytes as u64);
    let available = file_len.saturating_sub(consumed);
    if needed.map_or(true, |needed| needed > available) {
        return Err(ElectiveError::InvalidFormat(format!(
            "parity file holds {} record bytes, header declares {} records of {}",
            available, header.chunk_count, record_bytes
        )));
    }

    let mut records = Vec::with_capacity(header.chunk_count);
    for index in 0..header.chunk_count {
        let mut record = vec![0u8; record_bytes];
        reader.read_exact(&mut record).map_err(|e| {
            ElectiveError::InvalidFormat(format!("parity record {} truncated: {}", index, e))
        })?;
        records.push(record);
    }

    Ok(ParityFile { header, records })
}

/// Write a parity file to disk (creates new file or overwrites)
pub fn write_parity_file(path: &Path, parity: &ParityFile) -> Result<()> {
    if parity.records.len() != parity.header.chunk_count {
        return Err(ElectiveError::LengthMismatch {
            expected: parity.header.chunk_count,
            actual: parity.records.len(),
        });
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(PARITY_MAGIC)?;

    let header_bytes = parity.header.to_bytes()?;
    writer.write_all(&(header_bytes.len() as u32).to_le_bytes())?;
    writer.write_all(&header_bytes)?;

    for record in &parity.records {
        writer.write_all(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read just the header from a parity file (without loading the records)
pub fn read_parity_header(path: &Path) -> Result<ParityHeader> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    read_preamble(&mut reader).map(|(header, _)| header)
}
