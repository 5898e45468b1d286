use super::ErasureShape;
use crate::error::{ElectiveError, Result};
use crate::ring::Ring;

/// Replayable sequence of row additions `row[target] += row[source]`.
///
/// Recorded while eliminating odd entries from the parity rows and folding
/// them down to the redundancy count; replaying it over a column of
/// candidate redundancy values performs the same combination on that column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterleaveMap {
    pairs: Vec<(usize, usize)>,
}

impl InterleaveMap {
    /// Eliminate and fold `rows` in place, recording every addition.
    ///
    /// `rows` are the lower `shape.block` rows of a symmetry matrix. Pivots
    /// are chosen by oddness, not by being nonzero: an even pivot has no
    /// inverse modulo 2^W. On success `rows[..shape.redundancy]` hold the
    /// folded parity rows.
    pub fn build<T: Ring>(rows: &mut [Vec<T>], shape: &ErasureShape) -> Result<Self> {
        let size = shape.block;
        if rows.len() != size || rows.iter().any(|r| r.len() < size) {
            return Err(ElectiveError::InvalidShape(format!(
                "interleave needs {} rows of at least {} columns",
                size, size
            )));
        }

        let mut map = Self::default();

        for column in 0..size {
            let pivot = (column..size)
                .find(|&j| rows[j][column].is_odd())
                .ok_or(ElectiveError::SymmetryError { column })?;

            if pivot != column {
                map.combine(rows, column, pivot);
            }

            for j in 0..size {
                if j != column && rows[j][column].is_odd() {
                    map.combine(rows, j, column);
                }
            }
        }

        let kept = shape.redundancy;
        for i in kept..size {
            map.combine(rows, i % kept, i);
        }

        Ok(map)
    }

    fn combine<T: Ring>(&mut self, rows: &mut [Vec<T>], target: usize, source: usize) {
        let (dst, src) = pair_mut(rows, target, source);
        for (d, &s) in dst.iter_mut().zip(src.iter()) {
            *d = d.add(s);
        }
        self.pairs.push((target, source));
    }

    /// Apply the recorded additions to a column of values.
    pub fn replay<T: Ring>(&self, column: &mut [T]) {
        for &(target, source) in &self.pairs {
            column[target] = column[target].add(column[source]);
        }
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn pair_mut<T>(rows: &mut [Vec<T>], target: usize, source: usize) -> (&mut Vec<T>, &Vec<T>) {
    debug_assert_ne!(target, source);
    if target < source {
        let (head, tail) = rows.split_at_mut(source);
        (&mut head[target], &tail[0])
    } else {
        let (head, tail) = rows.split_at_mut(target);
        (&mut tail[0], &head[source])
    }
}
