use crate::chunk::{chunk_range, pad_chunk};
use crate::cli::{dispatch_width, KeySource};
use crate::erasure::{ErasureContext, Scratch};
use crate::error::{ElectiveError, Result};
use crate::parity::{key_fingerprint, read_parity_file, ParityFile};
use crate::ring::{symbols_from_bytes, symbols_from_bytes_into, symbols_to_bytes, Ring};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::ops::Range;
use std::path::Path;

/// Options for the recover command
#[derive(Debug, Clone, Default)]
pub struct RecoverOptions {
    pub key: KeySource,
    /// Overrides the scan stride stored in the parity header
    pub stride: Option<usize>,
    /// Report only; never rewrite the data file
    pub dry_run: bool,
}

/// Outcome for one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum BlockStatus {
    Intact,
    /// Burst repaired; `offset` is the first symbol of the solved window
    Repaired { offset: usize },
    Unrecoverable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkReport {
    pub index: usize,
    /// Byte range of the chunk in the data file
    pub range: Range<usize>,
    pub status: BlockStatus,
}

/// Per-chunk results of a recovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    pub chunks: Vec<ChunkReport>,
    /// Whether the data file was rewritten
    pub written: bool,
}

impl RecoveryReport {
    pub fn intact_count(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.status == BlockStatus::Intact)
            .count()
    }

    pub fn repaired(&self) -> impl Iterator<Item = &ChunkReport> {
        self.chunks
            .iter()
            .filter(|c| matches!(c.status, BlockStatus::Repaired { .. }))
    }

    pub fn unrecoverable(&self) -> impl Iterator<Item = &ChunkReport> {
        self.chunks
            .iter()
            .filter(|c| c.status == BlockStatus::Unrecoverable)
    }

    /// True when every chunk now validates
    pub fn is_complete(&self) -> bool {
        self.unrecoverable().next().is_none()
    }
}

/// Validate `data_path` against its parity file and repair what can be repaired
pub fn recover_file(data_path: &Path, parity_path: &Path, options: &RecoverOptions) -> Result<RecoveryReport> {
    let parity = read_parity_file(parity_path)?;
    let mut data = std::fs::read(data_path)?;

    let mut report = recover_bytes(&mut data, &parity, options)?;
    if report.repaired().next().is_some() && !options.dry_run {
        std::fs::write(data_path, &data)?;
        report.written = true;
        info!("rewrote {}", data_path.display());
    }
    Ok(report)
}

/// Validate and repair a buffer in place against parity records
///
/// The parity must describe exactly `data`: one record per chunk of
/// `data.len()` bytes. Every chunk then gets a status in the report.
pub fn recover_bytes(data: &mut [u8], parity: &ParityFile, options: &RecoverOptions) -> Result<RecoveryReport> {
    let header = &parity.header;
    header.check()?;
    if data.len() as u64 != header.original_size {
        return Err(ElectiveError::InvalidFormat(format!(
            "data is {} bytes but parity covers {}",
            data.len(),
            header.original_size
        )));
    }
    if parity.records.len() != header.chunk_count {
        return Err(ElectiveError::LengthMismatch {
            expected: header.chunk_count,
            actual: parity.records.len(),
        });
    }
    let record_bytes = header.record_bytes();
    if let Some(index) = parity.records.iter().position(|r| r.len() != record_bytes) {
        return Err(ElectiveError::InvalidFormat(format!(
            "parity record {} is {} bytes, expected {}",
            index,
            parity.records[index].len(),
            record_bytes
        )));
    }
    let stride = options.stride.unwrap_or(header.stride);
    if stride == 0 {
        return Err(ElectiveError::InvalidShape("recovery stride must be positive".into()));
    }

    dispatch_width!(header.width, recover_symbols(data, parity, &options.key, stride))
}

fn recover_symbols<T: Ring>(
    data: &mut [u8],
    parity: &ParityFile,
    key: &KeySource,
    stride: usize,
) -> Result<RecoveryReport> {
    let header = &parity.header;
    let shape = header.shape()?;
    let symmetry = key.symmetry::<T>(shape.block)?;
    if key_fingerprint(&symmetry) != header.key_check {
        return Err(ElectiveError::InvalidKey(
            "key does not match the parity file".into(),
        ));
    }

    let context = ErasureContext::new(&symmetry, shape)?;
    let chunk_bytes = header.chunk_bytes();
    let size = data.len();

    let whole_len = size - size % chunk_bytes;
    let tail_len = size - whole_len;
    let (whole, tail) = data.split_at_mut(whole_len);

    let mut chunks: Vec<ChunkReport> = whole
        .par_chunks_mut(chunk_bytes)
        .zip(parity.records.par_iter())
        .enumerate()
        .map_init(
            || (context.scratch(), vec![T::ZERO; shape.block]),
            |(scratch, block), (index, (chunk, record))| {
                symbols_from_bytes_into(chunk, block);
                let status = check_block(&context, block, record, stride, scratch)?;
                if let BlockStatus::Repaired { .. } = status {
                    symbols_to_bytes(block, chunk);
                }
                Ok(ChunkReport {
                    index,
                    range: chunk_range(index, chunk_bytes, size),
                    status,
                })
            },
        )
        .collect::<Result<Vec<_>>>()?;

    // the tail is zero-padded to a full chunk, so it is handled on its own after the rest
    if tail_len > 0 {
        let index = whole_len / chunk_bytes;
        let record = parity.records.get(index).ok_or(ElectiveError::LengthMismatch {
            expected: index + 1,
            actual: parity.records.len(),
        })?;
        let padded = pad_chunk(tail, chunk_bytes, |_| {});
        let mut block: Vec<T> = symbols_from_bytes(&padded);
        let mut scratch = context.scratch();
        let status = check_block(&context, &mut block, record, stride, &mut scratch)?;
        if let BlockStatus::Repaired { .. } = status {
            let mut repaired = vec![0u8; chunk_bytes];
            symbols_to_bytes(&block, &mut repaired);
            tail.copy_from_slice(&repaired[..tail_len]);
        }
        chunks.push(ChunkReport {
            index,
            range: chunk_range(index, chunk_bytes, size),
            status,
        });
    }

    for chunk in &chunks {
        match chunk.status {
            BlockStatus::Intact => {}
            BlockStatus::Repaired { offset } => info!(
                "chunk {} (bytes {}..{}) repaired, burst at symbol {}",
                chunk.index, chunk.range.start, chunk.range.end, offset
            ),
            BlockStatus::Unrecoverable => warn!(
                "chunk {} (bytes {}..{}) is unrecoverable",
                chunk.index, chunk.range.start, chunk.range.end
            ),
        }
    }

    Ok(RecoveryReport {
        chunks,
        written: false,
    })
}

fn check_block<T: Ring>(
    context: &ErasureContext<T>,
    block: &mut [T],
    record: &[u8],
    stride: usize,
    scratch: &mut Scratch<T>,
) -> Result<BlockStatus> {
    let extension: Vec<T> = symbols_from_bytes(record);
    if context.validate(block, &extension, scratch)? {
        return Ok(BlockStatus::Intact);
    }
    debug!("validation failed, scanning with stride {}", stride);
    Ok(match context.repair(block, &extension, stride, scratch)? {
        Some(offset) => BlockStatus::Repaired { offset },
        None => BlockStatus::Unrecoverable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::protect::{protect_bytes, ProtectOptions};
    use crate::header::Width;

    fn protect(data: &[u8]) -> ParityFile {
        let opts = ProtectOptions {
            key: KeySource::Password("PASSWORD".into()),
            width: Width::U32,
            block_symbols: 32,
            redundancy: 4,
            auxiliary: 2,
            stride: 1,
        };
        protect_bytes(data, &opts).unwrap()
    }

    fn options() -> RecoverOptions {
        RecoverOptions {
            key: KeySource::Password("PASSWORD".into()),
            ..Default::default()
        }
    }

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| ((i * 131 + 7) % 256) as u8).collect()
    }

    #[test]
    fn test_intact_data() {
        let data = sample(128 * 3);
        let parity = protect(&data);
        let mut copy = data.clone();
        let report = recover_bytes(&mut copy, &parity, &options()).unwrap();
        assert_eq!(report.intact_count(), 3);
        assert!(report.is_complete());
        assert_eq!(copy, data);
    }

    #[test]
    fn test_burst_in_one_chunk_repaired() {
        let data = sample(128 * 3);
        let parity = protect(&data);
        let mut damaged = data.clone();
        // symbols 10..12 of chunk 1
        for b in &mut damaged[128 + 40..128 + 48] {
            *b ^= 0xFF;
        }
        let report = recover_bytes(&mut damaged, &parity, &options()).unwrap();
        assert_eq!(damaged, data);
        let repaired: Vec<_> = report.repaired().collect();
        assert_eq!(repaired.len(), 1);
        assert_eq!(repaired[0].index, 1);
        assert_eq!(repaired[0].range, 128..256);
        assert_eq!(report.intact_count(), 2);
    }

    #[test]
    fn test_tail_chunk_repaired() {
        let data = sample(128 + 50);
        let parity = protect(&data);
        let mut damaged = data.clone();
        damaged[128 + 1] ^= 0x10;
        damaged[128 + 6] ^= 0x01;
        let report = recover_bytes(&mut damaged, &parity, &options()).unwrap();
        assert_eq!(damaged, data);
        assert_eq!(report.chunks.len(), 2);
        assert_eq!(report.chunks[1].range, 128..178);
        assert!(matches!(report.chunks[1].status, BlockStatus::Repaired { .. }));
    }

    #[test]
    fn test_scattered_damage_reported() {
        let data = sample(128 * 2);
        let parity = protect(&data);
        let mut damaged = data.clone();
        for i in [4usize, 40, 80, 120] {
            damaged[i] ^= 0x55;
        }
        let report = recover_bytes(&mut damaged, &parity, &options()).unwrap();
        let bad: Vec<_> = report.unrecoverable().map(|c| c.index).collect();
        assert_eq!(bad, vec![0]);
        assert!(!report.is_complete());
        assert_eq!(&damaged[128..], &data[128..]);
    }

    #[test]
    fn test_short_record_list_rejected() {
        let data = sample(200);
        let mut parity = protect(&data);
        assert_eq!(parity.header.chunk_count, 2);
        parity.header.chunk_count = 1;
        parity.records.truncate(1);

        let mut copy = data.clone();
        assert!(matches!(
            recover_bytes(&mut copy, &parity, &options()),
            Err(ElectiveError::InvalidFormat(_))
        ));
        assert_eq!(copy, data);
    }

    #[test]
    fn test_missing_records_never_report_complete() {
        let data = sample(128 * 3);
        let mut parity = protect(&data);
        parity.header.chunk_count = 1;
        parity.records.truncate(1);

        let mut damaged = data.clone();
        for b in &mut damaged[256..] {
            *b = 0;
        }
        assert!(recover_bytes(&mut damaged, &parity, &options()).is_err());
    }

    #[test]
    fn test_data_length_must_match_parity() {
        let parity = protect(&sample(128 * 3));
        for len in [128 * 3 + 16, 128 * 3 - 1, 0] {
            let mut other = sample(len);
            assert!(
                matches!(
                    recover_bytes(&mut other, &parity, &options()),
                    Err(ElectiveError::InvalidFormat(_))
                ),
                "length {}",
                len
            );
        }
    }

    #[test]
    fn test_zero_stride_rejected_before_scanning() {
        let data = sample(128 * 3);
        let parity = protect(&data);
        let mut damaged = data.clone();
        damaged[128 + 40] ^= 0xFF;

        let still = RecoverOptions {
            stride: Some(0),
            ..options()
        };
        assert!(matches!(
            recover_bytes(&mut damaged.clone(), &parity, &still),
            Err(ElectiveError::InvalidShape(_))
        ));

        let mut bad_header = parity.clone();
        bad_header.header.stride = 0;
        assert!(recover_bytes(&mut damaged, &bad_header, &options()).is_err());

        let report = recover_bytes(&mut damaged, &parity, &options()).unwrap();
        assert_eq!(report.chunks.len(), 3);
        assert_eq!(damaged, data);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let data = sample(256);
        let parity = protect(&data);
        let mut copy = data.clone();
        let wrong = RecoverOptions {
            key: KeySource::Password("nope".into()),
            ..Default::default()
        };
        assert!(matches!(
            recover_bytes(&mut copy, &parity, &wrong),
            Err(ElectiveError::InvalidKey(_))
        ));
    }
}
