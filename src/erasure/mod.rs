//! Redundancy over blocks: protect, validate and repair one contiguous burst.
//!
//! An [`ErasureContext`] is built once per key and [`ErasureShape`], then only
//! read. Every block operation takes a caller-owned [`Scratch`], so one
//! context can serve any number of worker threads.

mod interleave;
mod solve;

pub use interleave::InterleaveMap;
pub use solve::row_solve;

use crate::elective::{to_function_r, ElectiveSymmetry};
use crate::error::{ElectiveError, Result};
use crate::ring::Ring;
use crate::symmetry::Symmetry;
use log::debug;
use serde::{Deserialize, Serialize};

/// Geometry of one protected block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErasureShape {
    /// Symbols per block (S)
    pub block: usize,
    /// Redundancy symbols kept per block (E); also the longest repairable burst
    pub redundancy: usize,
    /// Extra folded symbols stored only to tell repair candidates apart (C)
    pub auxiliary: usize,
}

impl ErasureShape {
    pub fn new(block: usize, redundancy: usize, auxiliary: usize) -> Result<Self> {
        let shape = Self {
            block,
            redundancy,
            auxiliary,
        };
        shape.validate()?;
        Ok(shape)
    }

    pub fn validate(&self) -> Result<()> {
        if self.block == 0 {
            return Err(ElectiveError::InvalidShape("block must hold symbols".into()));
        }
        if self.redundancy == 0 || self.redundancy > self.block {
            return Err(ElectiveError::InvalidShape(format!(
                "redundancy {} must be within 1..={}",
                self.redundancy, self.block
            )));
        }
        if self.redundancy + self.auxiliary > self.block {
            return Err(ElectiveError::InvalidShape(format!(
                "redundancy {} plus auxiliary {} exceeds block of {}",
                self.redundancy, self.auxiliary, self.block
            )));
        }
        Ok(())
    }

    /// Symbols stored per block: `redundancy + auxiliary`.
    pub fn extension_len(&self) -> usize {
        self.redundancy + self.auxiliary
    }

    /// Highest burst start offset a repair scan considers.
    pub fn last_offset(&self) -> usize {
        self.block - self.redundancy
    }
}

/// Per-worker buffers for block operations, obtained from
/// [`ErasureContext::scratch`].
#[derive(Debug, Clone)]
pub struct Scratch<T> {
    column: Vec<T>,
    block: Vec<T>,
    /// First block accepted by a repair scan
    accepted: Vec<T>,
}

impl<T: Ring> Scratch<T> {
    pub(crate) fn new(shape: &ErasureShape) -> Self {
        Self {
            column: vec![T::ZERO; shape.block],
            block: vec![T::ZERO; shape.block],
            accepted: vec![T::ZERO; shape.block],
        }
    }

    fn block_len(&self) -> usize {
        self.column.len()
    }
}

/// Keyed erasure-coding context.
#[derive(Debug, Clone)]
pub struct ErasureContext<T> {
    shape: ErasureShape,
    symmetry: ElectiveSymmetry<T>,
    map: InterleaveMap,
    /// Folded parity rows `0..redundancy`, truncated to the block width.
    parity: Vec<Vec<T>>,
}

impl<T: Ring> ErasureContext<T> {
    /// Build the 2S-row symmetry matrix and its interleave map.
    ///
    /// Fails with [`ElectiveError::SymmetryError`] when some column has no odd
    /// pivot; the key is then unusable for this shape.
    pub fn new(symmetry: &Symmetry<T>, shape: ErasureShape) -> Result<Self> {
        shape.validate()?;
        if symmetry.len() < shape.block {
            return Err(ElectiveError::InvalidShape(format!(
                "symmetry of {} symbols is shorter than block of {}",
                symmetry.len(),
                shape.block
            )));
        }

        let size = shape.block;
        let matrix = ElectiveSymmetry::new(symmetry, 2 * size);
        let mut rows = matrix.rows()[size..].to_vec();
        let map = InterleaveMap::build(&mut rows, &shape)?;

        let parity = rows
            .into_iter()
            .take(shape.redundancy)
            .map(|mut row| {
                row.truncate(size);
                row
            })
            .collect();

        debug!(
            "erasure context: block={} redundancy={} auxiliary={} interleave ops={}",
            size,
            shape.redundancy,
            shape.auxiliary,
            map.len()
        );

        Ok(Self {
            shape,
            symmetry: matrix,
            map,
            parity,
        })
    }

    pub fn shape(&self) -> &ErasureShape {
        &self.shape
    }

    pub fn interleave(&self) -> &InterleaveMap {
        &self.map
    }

    pub fn scratch(&self) -> Scratch<T> {
        Scratch::new(&self.shape)
    }

    fn check_block(&self, block: &[T]) -> Result<()> {
        if block.len() != self.shape.block {
            return Err(ElectiveError::LengthMismatch {
                expected: self.shape.block,
                actual: block.len(),
            });
        }
        Ok(())
    }

    fn check_scratch(&self, scratch: &Scratch<T>) -> Result<()> {
        if scratch.block_len() != self.shape.block {
            return Err(ElectiveError::LengthMismatch {
                expected: self.shape.block,
                actual: scratch.block_len(),
            });
        }
        Ok(())
    }

    fn check_extension(&self, extension: &[T]) -> Result<()> {
        let expected = self.shape.extension_len();
        if extension.len() != expected {
            return Err(ElectiveError::LengthMismatch {
                expected,
                actual: extension.len(),
            });
        }
        Ok(())
    }

    /// Candidate redundancy for every parity row, folded by the interleave map.
    fn fill_column(&self, block: &[T], column: &mut [T]) {
        to_function_r(block, column, &self.symmetry);
        self.map.replay(column);
    }

    /// Write the `redundancy + auxiliary` extension symbols of `block`.
    pub fn extend_into(&self, block: &[T], output: &mut [T], scratch: &mut Scratch<T>) -> Result<()> {
        self.check_block(block)?;
        self.check_extension(output)?;
        self.check_scratch(scratch)?;
        self.fill_column(block, &mut scratch.column);
        output.copy_from_slice(&scratch.column[..output.len()]);
        Ok(())
    }

    pub fn protect(&self, block: &[T]) -> Result<Vec<T>> {
        let mut output = vec![T::ZERO; self.shape.extension_len()];
        self.extend_into(block, &mut output, &mut self.scratch())?;
        Ok(output)
    }

    /// Exact comparison of the recomputed extension against `extension`.
    pub fn validate(&self, block: &[T], extension: &[T], scratch: &mut Scratch<T>) -> Result<bool> {
        self.check_block(block)?;
        self.check_extension(extension)?;
        self.check_scratch(scratch)?;
        Ok(self.matches(block, extension, &mut scratch.column))
    }

    fn matches(&self, block: &[T], extension: &[T], column: &mut [T]) -> bool {
        self.fill_column(block, column);
        column[..extension.len()] == *extension
    }

    /// Solve for the `redundancy` symbols starting at `offset`, treating them
    /// as unknown and every other symbol of `block` as correct.
    ///
    /// Fails with [`ElectiveError::MatrixError`] when the parity rows restricted
    /// to the burst have no usable odd pivots.
    pub fn recover_at(&self, block: &mut [T], offset: usize, extension: &[T]) -> Result<()> {
        self.check_block(block)?;
        if extension.len() < self.shape.redundancy {
            return Err(ElectiveError::LengthMismatch {
                expected: self.shape.redundancy,
                actual: extension.len(),
            });
        }
        if offset > self.shape.last_offset() {
            return Err(ElectiveError::InvalidShape(format!(
                "burst at {} runs past block of {}",
                offset, self.shape.block
            )));
        }

        let e = self.shape.redundancy;
        let burst = offset..offset + e;

        let mut order: Vec<usize> = (0..e).collect();
        let mut rhs = extension[..e].to_vec();
        for i in 0..e {
            let position = offset + i;
            if !self.parity[order[i]][position].is_odd() {
                let swap = (i + 1..e)
                    .find(|&j| self.parity[order[j]][position].is_odd())
                    .ok_or_else(|| {
                        ElectiveError::MatrixError(format!("no odd coefficient for symbol {}", position))
                    })?;
                order.swap(i, swap);
                rhs.swap(i, swap);
            }
        }

        let mut matrix = Vec::with_capacity(e);
        let mut constants = Vec::with_capacity(e);
        for (i, &r) in order.iter().enumerate() {
            let row = &self.parity[r];
            let known = block
                .iter()
                .zip(row)
                .enumerate()
                .filter(|(j, _)| !burst.contains(j))
                .fold(rhs[i], |acc, (_, (&value, &coeff))| acc.sub(value.mul(coeff)));

            let pivot = row[offset + i];
            let inv = pivot.inverse().ok_or_else(|| {
                ElectiveError::MatrixError(format!("pivot {:#x} is not a unit", pivot.to_u64()))
            })?;
            matrix.push(row[burst.clone()].iter().map(|c| c.mul(inv)).collect::<Vec<T>>());
            constants.push(known.mul(inv));
        }

        row_solve(&mut matrix, &mut constants)?;
        block[burst].copy_from_slice(&constants);
        Ok(())
    }

    /// Search for one corrupted burst of at most `redundancy` symbols.
    ///
    /// Candidate starts are `0, stride, 2*stride, ..` up to and including
    /// `block - redundancy`. A candidate is accepted only when the repaired
    /// block reproduces the whole stored extension. Every candidate is tried:
    /// when two accepted candidates disagree the damage is ambiguous and
    /// `None` is returned with `block` untouched. Otherwise `block` is
    /// overwritten and the first accepting offset returned.
    ///
    /// Damage confined to the high bits of a symbol is often ambiguous, since
    /// the extension only sees it through the parity of its coefficients.
    /// Without auxiliary symbols every solvable candidate reproduces the
    /// redundancy, so scanning needs `auxiliary > 0` to locate the burst.
    pub fn repair(
        &self,
        block: &mut [T],
        extension: &[T],
        stride: usize,
        scratch: &mut Scratch<T>,
    ) -> Result<Option<usize>> {
        self.check_block(block)?;
        self.check_extension(extension)?;
        self.check_scratch(scratch)?;
        if stride == 0 {
            return Err(ElectiveError::InvalidShape("repair stride must be positive".into()));
        }

        let e = self.shape.redundancy;
        let mut found = None;
        for offset in (0..=self.shape.last_offset()).step_by(stride) {
            scratch.block.copy_from_slice(block);
            scratch.block[offset..offset + e].copy_from_slice(&extension[..e]);

            match self.recover_at(&mut scratch.block, offset, extension) {
                Ok(()) => {}
                Err(ElectiveError::MatrixError(reason)) => {
                    debug!("repair candidate at offset {} rejected: {}", offset, reason);
                    continue;
                }
                Err(other) => return Err(other),
            }

            if !self.matches(&scratch.block, extension, &mut scratch.column) {
                continue;
            }
            match found {
                None => {
                    scratch.accepted.copy_from_slice(&scratch.block);
                    found = Some(offset);
                }
                Some(first) if scratch.accepted != scratch.block => {
                    debug!(
                        "repair candidates at offsets {} and {} disagree, damage is ambiguous",
                        first, offset
                    );
                    return Ok(None);
                }
                Some(_) => {}
            }
        }

        if found.is_some() {
            block.copy_from_slice(&scratch.accepted);
        }
        Ok(found)
    }
}

/// Build a fresh context for `symmetry` and attempt one windowed repair.
pub fn repair_with_symmetry<T: Ring>(
    symmetry: &Symmetry<T>,
    shape: ErasureShape,
    block: &mut [T],
    extension: &[T],
    stride: usize,
) -> Result<Option<usize>> {
    let context = ErasureContext::new(symmetry, shape)?;
    let mut scratch = context.scratch();
    context.repair(block, extension, stride, &mut scratch)
}
