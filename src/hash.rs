use crate::elective::{to_polynomial, ElectiveTransform};
use crate::error::{ElectiveError, Result};
use crate::header::HashMode;
use crate::pascal::{to_pascal, PascalTriangle};
use crate::ring::Ring;
use crate::symmetry::Symmetry;

/// Block digest built from the cipher primitives.
///
/// - `Long`: first H coefficients of `ToPolynomial(ToPascal(block))`
/// - `Short`: first H coefficients of `ToPolynomial(block)`
/// - `Feedback`: like `Long`, but the transform is keyed by the block itself
///
/// Simple repeating inputs separate poorly: any constant block whose value is
/// a multiple of a high enough power of two digests to zero, and the feedback
/// variant maps every small odd constant block to the same digest.
#[derive(Debug, Clone)]
pub struct BlockHasher<T> {
    mode: HashMode,
    digest_len: usize,
    triangle: PascalTriangle<T>,
    transform: Option<ElectiveTransform<T>>,
}

impl<T: Ring> BlockHasher<T> {
    /// Keyed hasher for `Long` or `Short`; the block length is the key length.
    pub fn new(symmetry: &Symmetry<T>, mode: HashMode, digest_len: usize) -> Result<Self> {
        if mode == HashMode::Feedback {
            return Self::feedback(symmetry.len(), digest_len);
        }
        Self::check_shape(symmetry.len(), digest_len)?;
        Ok(Self {
            mode,
            digest_len,
            triangle: PascalTriangle::new(symmetry.len()),
            transform: Some(ElectiveTransform::new(symmetry)?),
        })
    }

    /// Keyless hasher deriving its transform from each input block.
    pub fn feedback(block_len: usize, digest_len: usize) -> Result<Self> {
        Self::check_shape(block_len, digest_len)?;
        Ok(Self {
            mode: HashMode::Feedback,
            digest_len,
            triangle: PascalTriangle::new(block_len),
            transform: None,
        })
    }

    fn check_shape(block_len: usize, digest_len: usize) -> Result<()> {
        if digest_len == 0 || digest_len > block_len {
            return Err(ElectiveError::InvalidShape(format!(
                "digest length {} must be within 1..={}",
                digest_len, block_len
            )));
        }
        Ok(())
    }

    pub fn mode(&self) -> HashMode {
        self.mode
    }

    pub fn block_len(&self) -> usize {
        self.triangle.height()
    }

    pub fn digest_len(&self) -> usize {
        self.digest_len
    }

    /// Digest one block into `output` (`digest_len` symbols).
    pub fn digest_into(&self, block: &[T], output: &mut [T], scratch: &mut [T]) -> Result<()> {
        let len = self.block_len();
        if block.len() != len || scratch.len() != len {
            return Err(ElectiveError::LengthMismatch {
                expected: len,
                actual: block.len(),
            });
        }
        if output.len() != self.digest_len {
            return Err(ElectiveError::LengthMismatch {
                expected: self.digest_len,
                actual: output.len(),
            });
        }

        match (self.mode, &self.transform) {
            (HashMode::Long, Some(transform)) => {
                to_pascal(block, scratch, &self.triangle);
                to_polynomial(scratch, output, transform);
            }
            (HashMode::Short, Some(transform)) => to_polynomial(block, output, transform),
            _ => {
                let transform = ElectiveTransform::from_block(block)?;
                to_pascal(block, scratch, &self.triangle);
                to_polynomial(scratch, output, &transform);
            }
        }
        Ok(())
    }

    pub fn digest(&self, block: &[T]) -> Result<Vec<T>> {
        let mut output = vec![T::ZERO; self.digest_len];
        let mut scratch = vec![T::ZERO; self.block_len()];
        self.digest_into(block, &mut output, &mut scratch)?;
        Ok(output)
    }
}
