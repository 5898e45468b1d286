use crate::chunk::{append_trailer, pad_chunk, segment, split_trailer, TRAILER_SIZE};
use crate::cipher::BlockCipher;
use crate::cli::{dispatch_width, transform_chunks, KeySource};
use crate::error::{ElectiveError, Result};
use crate::header::{CipherMode, Width};
use crate::ring::{symbols_from_bytes, symbols_to_bytes, Ring};
use log::debug;
use rand::RngCore;
use std::path::Path;

/// Options for the encrypt and decrypt commands
#[derive(Debug, Clone)]
pub struct EncryptOptions {
    pub key: KeySource,
    pub width: Width,
    /// Symbols per cipher block
    pub block_symbols: usize,
    pub mode: CipherMode,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self {
            key: KeySource::None,
            width: Width::default(),
            block_symbols: 64,
            mode: CipherMode::default(),
        }
    }
}

impl EncryptOptions {
    fn chunk_bytes(&self) -> Result<usize> {
        let chunk_bytes = self.block_symbols * self.width.bytes();
        // a chunk no larger than the trailer would make its presence undetectable
        if chunk_bytes <= TRAILER_SIZE {
            return Err(ElectiveError::InvalidShape(format!(
                "cipher block of {} bytes must exceed {} bytes",
                chunk_bytes, TRAILER_SIZE
            )));
        }
        Ok(chunk_bytes)
    }
}

/// Encrypt a file; returns the number of cipher blocks written
pub fn encrypt_file(input_path: &Path, output_path: &Path, options: &EncryptOptions) -> Result<usize> {
    let data = std::fs::read(input_path)?;
    let encrypted = encrypt_bytes(&data, options)?;
    std::fs::write(output_path, &encrypted)?;
    Ok(encrypted.len() / options.chunk_bytes()?)
}

/// Decrypt a file; returns the number of plaintext bytes written
pub fn decrypt_file(input_path: &Path, output_path: &Path, options: &EncryptOptions) -> Result<usize> {
    let data = std::fs::read(input_path)?;
    let decrypted = decrypt_bytes(&data, options)?;
    std::fs::write(output_path, &decrypted)?;
    Ok(decrypted.len())
}

/// Encrypt a buffer. A short tail is padded with random bytes into a full
/// block and followed by the original length as an 8-byte trailer.
pub fn encrypt_bytes(data: &[u8], options: &EncryptOptions) -> Result<Vec<u8>> {
    options.chunk_bytes()?;
    dispatch_width!(options.width, encrypt_symbols(data, options))
}

/// Reverse [`encrypt_bytes`]
pub fn decrypt_bytes(data: &[u8], options: &EncryptOptions) -> Result<Vec<u8>> {
    options.chunk_bytes()?;
    dispatch_width!(options.width, decrypt_symbols(data, options))
}

fn encrypt_symbols<T: Ring>(data: &[u8], options: &EncryptOptions) -> Result<Vec<u8>> {
    let symmetry = options.key.symmetry::<T>(options.block_symbols)?;
    let cipher = BlockCipher::new(&symmetry, options.mode)?;
    let chunk_bytes = options.block_symbols * T::BYTES;

    let (whole, tail) = segment(data, chunk_bytes);
    let mut output = vec![0u8; whole.len()];
    transform_chunks(whole, &mut output, options.block_symbols, |block, out, scratch| {
        cipher.encrypt_block(block, out, scratch)
    })?;

    if !tail.is_empty() {
        debug!("padding {} byte tail to {} bytes", tail.len(), chunk_bytes);
        let padded = pad_chunk(tail, chunk_bytes, |rest| rand::thread_rng().fill_bytes(rest));
        let block: Vec<T> = symbols_from_bytes(&padded);
        let mut encrypted = vec![T::ZERO; options.block_symbols];
        let mut scratch = vec![T::ZERO; options.block_symbols];
        cipher.encrypt_block(&block, &mut encrypted, &mut scratch)?;

        let start = output.len();
        output.resize(start + chunk_bytes, 0);
        symbols_to_bytes(&encrypted, &mut output[start..]);
        append_trailer(&mut output, data.len() as u64);
    }

    Ok(output)
}

fn decrypt_symbols<T: Ring>(data: &[u8], options: &EncryptOptions) -> Result<Vec<u8>> {
    let symmetry = options.key.symmetry::<T>(options.block_symbols)?;
    let cipher = BlockCipher::new(&symmetry, options.mode)?;
    let chunk_bytes = options.block_symbols * T::BYTES;

    let (body, original_size) = if data.len() % chunk_bytes != 0 {
        let (body, size) = split_trailer(data)?;
        (body, Some(size as usize))
    } else {
        (data, None)
    };

    if body.len() % chunk_bytes != 0 {
        return Err(ElectiveError::InvalidFormat(format!(
            "ciphertext of {} bytes is not whole {} byte blocks plus trailer",
            data.len(),
            chunk_bytes
        )));
    }

    let mut output = vec![0u8; body.len()];
    transform_chunks(body, &mut output, options.block_symbols, |block, out, scratch| {
        cipher.decrypt_block(block, out, scratch)
    })?;

    if let Some(size) = original_size {
        if size > body.len() || size + chunk_bytes <= body.len() {
            return Err(ElectiveError::InvalidFormat(format!(
                "trailer length {} does not fit {} decrypted bytes",
                size,
                body.len()
            )));
        }
        output.truncate(size);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn options(width: Width, mode: CipherMode) -> EncryptOptions {
        EncryptOptions {
            key: KeySource::Password("PASSWORD".into()),
            width,
            block_symbols: 16,
            mode,
        }
    }

    #[test]
    fn test_roundtrip_all_widths() {
        let data: Vec<u8> = (0..1000).map(|i| (i * 7 % 251) as u8).collect();
        for width in [Width::U8, Width::U16, Width::U32, Width::U64] {
            for mode in [CipherMode::Long, CipherMode::Short] {
                let opts = options(width, mode);
                let enc = encrypt_bytes(&data, &opts).unwrap();
                assert_ne!(&enc[..16], &data[..16]);
                assert_eq!(decrypt_bytes(&enc, &opts).unwrap(), data, "{:?} {:?}", width, mode);
            }
        }
    }

    #[test]
    fn test_exact_fit_has_no_trailer() {
        let opts = options(Width::U32, CipherMode::Long);
        let data = vec![0x5Au8; 128];
        let enc = encrypt_bytes(&data, &opts).unwrap();
        assert_eq!(enc.len(), 128);
        assert_eq!(decrypt_bytes(&enc, &opts).unwrap(), data);
    }

    #[test]
    fn test_tail_gets_trailer() {
        let opts = options(Width::U64, CipherMode::Short);
        let data = vec![1u8; 130];
        let enc = encrypt_bytes(&data, &opts).unwrap();
        assert_eq!(enc.len(), 256 + TRAILER_SIZE);
        assert_eq!(&enc[256..], &130u64.to_le_bytes());
        assert_eq!(decrypt_bytes(&enc, &opts).unwrap(), data);
    }

    #[test]
    fn test_empty_input() {
        let opts = options(Width::U16, CipherMode::Long);
        let enc = encrypt_bytes(&[], &opts).unwrap();
        assert!(enc.is_empty());
        assert!(decrypt_bytes(&enc, &opts).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_key_garbles() {
        let opts = options(Width::U64, CipherMode::Long);
        let data = b"attack at dawn, attack at dawn, attack at dawn, attack at dawn!!".repeat(3);
        let enc = encrypt_bytes(&data, &opts).unwrap();
        let wrong = EncryptOptions {
            key: KeySource::Password("password".into()),
            ..opts
        };
        assert_ne!(decrypt_bytes(&enc, &wrong).unwrap(), data);
    }

    #[test]
    fn test_requires_key_and_sane_block() {
        let data = vec![0u8; 10];
        assert!(matches!(
            encrypt_bytes(&data, &EncryptOptions::default()),
            Err(ElectiveError::KeyRequired)
        ));
        let tiny = EncryptOptions {
            block_symbols: 1,
            ..options(Width::U64, CipherMode::Long)
        };
        assert!(encrypt_bytes(&data, &tiny).is_err());
    }

    #[test]
    fn test_corrupt_trailer_rejected() {
        let opts = options(Width::U8, CipherMode::Long);
        let mut enc = encrypt_bytes(&[1, 2, 3], &opts).unwrap();
        let n = enc.len();
        enc[n - TRAILER_SIZE..].copy_from_slice(&99u64.to_le_bytes());
        assert!(decrypt_bytes(&enc, &opts).is_err());
    }

    #[test]
    fn test_file_roundtrip_with_key_file() {
        let dir = tempdir().unwrap();
        let key = dir.path().join("key.bin");
        let plain = dir.path().join("plain.txt");
        let cipher = dir.path().join("plain.enc");
        let restored = dir.path().join("plain.out");
        std::fs::write(&key, (0..64u8).collect::<Vec<_>>()).unwrap();
        std::fs::write(&plain, b"file level round trip through a key file").unwrap();

        let opts = EncryptOptions {
            key: KeySource::KeyFile(key),
            ..Default::default()
        };
        let blocks = encrypt_file(&plain, &cipher, &opts).unwrap();
        assert_eq!(blocks, 1);
        decrypt_file(&cipher, &restored, &opts).unwrap();
        assert_eq!(std::fs::read(&restored).unwrap(), std::fs::read(&plain).unwrap());
    }
}
