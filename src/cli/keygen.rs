use crate::error::{ElectiveError, Result};
use log::info;
use rand::rngs::OsRng;
use rand::RngCore;
use std::path::Path;

/// Options for the keygen command
#[derive(Debug, Clone)]
pub struct KeygenOptions {
    /// Key length in bytes
    pub bytes: usize,
    /// Overwrite an existing key file
    pub force: bool,
}

impl Default for KeygenOptions {
    fn default() -> Self {
        Self {
            bytes: 32,
            force: false,
        }
    }
}

/// Write fresh random key material to `path`
pub fn generate_key_file(path: &Path, options: &KeygenOptions) -> Result<()> {
    if options.bytes == 0 {
        return Err(ElectiveError::InvalidKey("key length must be positive".into()));
    }
    if path.exists() && !options.force {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists (use --force to overwrite)", path.display()),
        )
        .into());
    }

    let mut key = vec![0u8; options.bytes];
    OsRng.fill_bytes(&mut key);
    std::fs::write(path, &key)?;
    info!("wrote {} byte key to {}", options.bytes, path.display());
    Ok(())
}
