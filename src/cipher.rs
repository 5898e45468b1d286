use crate::elective::{
    to_function, to_polynomial, ElectiveSymmetry, ElectiveTransform,
};
use crate::error::{ElectiveError, Result};
use crate::header::CipherMode;
use crate::pascal::{to_pascal, PascalTriangle};
use crate::ring::Ring;
use crate::symmetry::Symmetry;

/// Keyed block cipher over S-symbol blocks.
///
/// Long mode: `encrypt = ToPolynomial(ToPascal(p))`, `decrypt = ToFunction(c)`.
/// Short mode: `encrypt = ToPolynomial(p)`, `decrypt = ToPascal(ToFunction(c))`.
///
/// All tables are built once and only read afterwards, so one cipher can be
/// shared by reference across worker threads. Each worker passes its own
/// scratch buffer of `block_len()` symbols.
#[derive(Debug, Clone)]
pub struct BlockCipher<T> {
    mode: CipherMode,
    triangle: PascalTriangle<T>,
    symmetry: ElectiveSymmetry<T>,
    transform: ElectiveTransform<T>,
}

impl<T: Ring> BlockCipher<T> {
    pub fn new(symmetry: &Symmetry<T>, mode: CipherMode) -> Result<Self> {
        let len = symmetry.len();
        Ok(Self {
            mode,
            triangle: PascalTriangle::new(len),
            symmetry: ElectiveSymmetry::new(symmetry, len),
            transform: ElectiveTransform::new(symmetry)?,
        })
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn block_len(&self) -> usize {
        self.triangle.height()
    }

    fn check(&self, block: &[T], output: &[T], scratch: &[T]) -> Result<()> {
        let expected = self.block_len();
        for actual in [block.len(), output.len(), scratch.len()] {
            if actual != expected {
                return Err(ElectiveError::LengthMismatch { expected, actual });
            }
        }
        Ok(())
    }

    pub fn encrypt_block(&self, block: &[T], output: &mut [T], scratch: &mut [T]) -> Result<()> {
        self.check(block, output, scratch)?;
        match self.mode {
            CipherMode::Long => {
                to_pascal(block, scratch, &self.triangle);
                to_polynomial(scratch, output, &self.transform);
            }
            CipherMode::Short => to_polynomial(block, output, &self.transform),
        }
        Ok(())
    }

    pub fn decrypt_block(&self, block: &[T], output: &mut [T], scratch: &mut [T]) -> Result<()> {
        self.check(block, output, scratch)?;
        match self.mode {
            CipherMode::Long => to_function(block, output, &self.symmetry),
            CipherMode::Short => {
                to_function(block, scratch, &self.symmetry);
                to_pascal(&*scratch, output, &self.triangle);
            }
        }
        Ok(())
    }

    /// Encrypt a buffer of whole blocks in place.
    pub fn encrypt_in_place(&self, data: &mut [T]) -> Result<()> {
        self.apply_in_place(data, Self::encrypt_block)
    }

    /// Decrypt a buffer of whole blocks in place.
    pub fn decrypt_in_place(&self, data: &mut [T]) -> Result<()> {
        self.apply_in_place(data, Self::decrypt_block)
    }

    fn apply_in_place(
        &self,
        data: &mut [T],
        op: fn(&Self, &[T], &mut [T], &mut [T]) -> Result<()>,
    ) -> Result<()> {
        let len = self.block_len();
        if len == 0 || data.len() % len != 0 {
            return Err(ElectiveError::LengthMismatch {
                expected: len,
                actual: data.len(),
            });
        }

        let mut input = vec![T::ZERO; len];
        let mut scratch = vec![T::ZERO; len];
        for block in data.chunks_exact_mut(len) {
            input.copy_from_slice(block);
            op(self, &input, block, &mut scratch)?;
        }
        Ok(())
    }
}
