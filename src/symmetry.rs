use crate::error::{ElectiveError, Result};
use crate::ring::Ring;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Key-derived symmetry vector seeding every keyed matrix in the crate.
///
/// The leading element is always odd so that matrices built from it have an
/// invertible pivot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symmetry<T> {
    symbols: Vec<T>,
}

impl<T: Ring> Symmetry<T> {
    /// Wrap raw symbols, forcing an even lead odd by adding one.
    pub fn new(mut symbols: Vec<T>) -> Result<Self> {
        let lead = symbols
            .first_mut()
            .ok_or_else(|| ElectiveError::InvalidKey("empty symmetry vector".into()))?;
        if !lead.is_odd() {
            *lead = lead.add(T::ONE);
        }
        Ok(Self { symbols })
    }

    /// SHA-256 of the password, read as little-endian symbols and cycled to `len`.
    pub fn from_password(password: &str, len: usize) -> Result<Self> {
        if password.is_empty() {
            return Err(ElectiveError::InvalidKey("empty password".into()));
        }
        let digest = Sha256::digest(password.as_bytes());
        Self::from_key_bytes(&digest, len)
    }

    /// Cycle raw key bytes into `len` little-endian symbols.
    pub fn from_key_bytes(bytes: &[u8], len: usize) -> Result<Self> {
        if len == 0 {
            return Err(ElectiveError::InvalidShape(
                "symmetry length must be positive".into(),
            ));
        }
        if bytes.len() < T::BYTES {
            return Err(ElectiveError::InvalidKey(format!(
                "need at least {} key bytes, got {}",
                T::BYTES,
                bytes.len()
            )));
        }

        let words: Vec<T> = bytes.chunks_exact(T::BYTES).map(T::read_le).collect();
        let symbols = words.iter().copied().cycle().take(len).collect();
        Self::new(symbols)
    }

    /// Fresh random symmetry of `len` symbols.
    pub fn random(len: usize) -> Result<Self> {
        let mut bytes = vec![0u8; len * T::BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from_key_bytes(&bytes, len)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn lead(&self) -> T {
        self.symbols[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_lead_forced_odd() {
        let s = Symmetry::new(vec![4u8, 6, 8]).unwrap();
        assert_eq!(s.as_slice(), &[5, 6, 8]);
        let s = Symmetry::new(vec![7u8, 6, 8]).unwrap();
        assert_eq!(s.lead(), 7);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            Symmetry::<u32>::new(vec![]),
            Err(ElectiveError::InvalidKey(_))
        ));
        assert!(Symmetry::<u32>::from_password("", 8).is_err());
        assert!(Symmetry::<u64>::from_key_bytes(&[1, 2, 3], 8).is_err());
    }

    #[test]
    fn test_password_is_cycled_little_endian() {
        let s = Symmetry::<u64>::from_password("PASSWORD", 10).unwrap();
        let digest = Sha256::digest(b"PASSWORD");
        let raw = u64::from_le_bytes(digest[0..8].try_into().unwrap());
        assert_eq!(s.len(), 10);
        assert_eq!(s.lead(), raw | 1);
        assert_eq!(s.as_slice()[4], raw);
        assert_eq!(s.as_slice()[5], s.as_slice()[1]);
        assert_eq!(s.as_slice()[9], s.as_slice()[1]);
    }

    #[test]
    fn test_password_deterministic_and_distinct() {
        let a = Symmetry::<u32>::from_password("alpha", 16).unwrap();
        let b = Symmetry::<u32>::from_password("alpha", 16).unwrap();
        let c = Symmetry::<u32>::from_password("beta", 16).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_random_has_odd_lead() {
        for _ in 0..8 {
            let s = Symmetry::<u16>::random(32).unwrap();
            assert_eq!(s.len(), 32);
            assert!(s.lead().is_odd());
        }
    }
}
