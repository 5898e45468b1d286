use crate::error::{ElectiveError, Result};

/// Size of the little-endian original-length trailer after a padded tail chunk
pub const TRAILER_SIZE: usize = 8;

/// Split data into the run of whole chunks and the short tail after it
/// The tail is empty when `chunk_bytes` divides the data length
pub fn segment(data: &[u8], chunk_bytes: usize) -> (&[u8], &[u8]) {
    let whole = data.len() - data.len() % chunk_bytes;
    data.split_at(whole)
}

/// Copy a short tail into a full chunk, filling the rest with `fill`
pub fn pad_chunk(tail: &[u8], chunk_bytes: usize, fill: impl FnOnce(&mut [u8])) -> Vec<u8> {
    let mut chunk = vec![0u8; chunk_bytes];
    chunk[..tail.len()].copy_from_slice(tail);
    fill(&mut chunk[tail.len()..]);
    chunk
}

/// Number of chunks (the last possibly short) covering `data_size` bytes
pub fn chunk_count(data_size: usize, chunk_bytes: usize) -> usize {
    data_size.div_ceil(chunk_bytes)
}

/// Append the original length trailer
pub fn append_trailer(out: &mut Vec<u8>, original_size: u64) {
    out.extend_from_slice(&original_size.to_le_bytes());
}

/// Split a trailer-terminated buffer into its body and the stored original length
pub fn split_trailer(data: &[u8]) -> Result<(&[u8], u64)> {
    if data.len() < TRAILER_SIZE {
        return Err(ElectiveError::InvalidFormat(
            "data too short for length trailer".into(),
        ));
    }
    let (body, trailer) = data.split_at(data.len() - TRAILER_SIZE);
    let mut bytes = [0u8; TRAILER_SIZE];
    bytes.copy_from_slice(trailer);
    Ok((body, u64::from_le_bytes(bytes)))
}

/// Byte range of chunk `index` within a file of `data_size` bytes
pub fn chunk_range(index: usize, chunk_bytes: usize, data_size: usize) -> std::ops::Range<usize> {
    let start = index * chunk_bytes;
    start..(start + chunk_bytes).min(data_size)
}
