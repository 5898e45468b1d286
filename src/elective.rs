//! Key-derived triangular matrices and the two directions they map between.
//!
//! [`ElectiveSymmetry`] takes polynomial coefficients to block symbols
//! ("function" direction). [`ElectiveTransform`] solves Pascal-domain symbols
//! back into coefficients ("polynomial" direction) by back-substitution.

use crate::error::{ElectiveError, Result};
use crate::ring::Ring;
use crate::symmetry::Symmetry;
use crate::view::SymbolSource;

/// Finite-difference matrix grown from a symmetry vector.
///
/// With `f = symmetry[0]` and `n = symmetry.len()` columns:
/// - column 0 alternates `f, -f, f, ...` by row parity
/// - row 0 carries `symmetry[1..]` in columns `1..n`
/// - every other entry is the backward difference of the row above,
///   `m[j][i] = m[j-1][i-1] - m[j-1][i]`
#[derive(Debug, Clone)]
pub struct ElectiveSymmetry<T> {
    rows: Vec<Vec<T>>,
}

impl<T: Ring> ElectiveSymmetry<T> {
    pub fn new(symmetry: &Symmetry<T>, height: usize) -> Self {
        Self::exact(symmetry.as_slice(), height)
    }

    /// Build from raw symbols without forcing the lead odd.
    pub fn exact(symmetry: &[T], height: usize) -> Self {
        let width = symmetry.len();
        let mut rows: Vec<Vec<T>> = Vec::with_capacity(height);
        if width == 0 {
            return Self {
                rows: vec![Vec::new(); height],
            };
        }

        let lead = symmetry[0];
        for j in 0..height {
            let mut row = Vec::with_capacity(width);
            row.push(if j % 2 == 0 { lead } else { lead.neg() });
            if j == 0 {
                row.extend_from_slice(&symmetry[1..]);
            } else {
                let above = &rows[j - 1];
                for i in 1..width {
                    row.push(above[i - 1].sub(above[i]));
                }
            }
            rows.push(row);
        }

        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn row(&self, index: usize) -> &[T] {
        &self.rows[index]
    }

    pub(crate) fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }
}

/// Triangular system used to turn Pascal-domain symbols into coefficients.
///
/// Row `i` is `[symmetry[0], symmetry[1], ..., symmetry[i]]`, so every row is
/// a prefix of one coefficient vector.
#[derive(Debug, Clone)]
pub struct ElectiveTransform<T> {
    coefficients: Vec<T>,
    pivot_inverse: Option<T>,
}

impl<T: Ring> ElectiveTransform<T> {
    pub fn new(symmetry: &Symmetry<T>) -> Result<Self> {
        Self::from_coefficients(symmetry.as_slice().to_vec())
    }

    /// Build directly from a data block, forcing its lead odd.
    ///
    /// Used by the feedback hash, which keys the transform with its own input.
    pub fn from_block(block: &[T]) -> Result<Self> {
        let symmetry = Symmetry::new(block.to_vec())?;
        Self::new(&symmetry)
    }

    fn from_coefficients(coefficients: Vec<T>) -> Result<Self> {
        let pivot = *coefficients
            .first()
            .ok_or_else(|| ElectiveError::InvalidShape("empty elective transform".into()))?;

        let pivot_inverse = if pivot == T::ONE {
            None
        } else {
            Some(
                pivot
                    .inverse()
                    .ok_or(ElectiveError::DegeneratePivot(pivot.to_u64()))?,
            )
        };

        Ok(Self {
            coefficients,
            pivot_inverse,
        })
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn row(&self, index: usize) -> &[T] {
        &self.coefficients[..=index]
    }

    /// Inverse of the pivot, `None` when the pivot is already one.
    pub fn pivot_inverse(&self) -> Option<T> {
        self.pivot_inverse
    }
}

/// Dot the trailing `output.len()` rows of `matrix` against the polynomial read
/// back to front: `output[k] = sum_j row[n-1-j] * polynomial[j]`.
pub fn to_function<T: Ring>(polynomial: &[T], output: &mut [T], matrix: &ElectiveSymmetry<T>) {
    let n = polynomial.len();
    let first = matrix.height() - output.len();
    debug_assert!(n <= matrix.width());

    for (k, out) in output.iter_mut().enumerate() {
        let row = matrix.row(first + k);
        *out = polynomial
            .iter()
            .enumerate()
            .fold(T::ZERO, |acc, (j, &p)| acc.mul_add(row[n - 1 - j], p));
    }
}

/// Dot the trailing `output.len()` rows of `matrix` against the polynomial in
/// natural order.
pub fn to_function_r<T, D>(polynomial: &D, output: &mut [T], matrix: &ElectiveSymmetry<T>)
where
    T: Ring,
    D: SymbolSource<T> + ?Sized,
{
    let n = polynomial.len();
    let first = matrix.height() - output.len();
    debug_assert!(n <= matrix.width());

    for (k, out) in output.iter_mut().enumerate() {
        let row = matrix.row(first + k);
        *out = (0..n).fold(T::ZERO, |acc, j| acc.mul_add(row[j], polynomial.at(j)));
    }
}

/// Back-substitute `pascal` through the transform.
///
/// `output[i] = inv * (pascal[n-1-i] - sum_{q<i} row_i[i-q] * output[q])`
/// with `n = pascal.len()`. Only `output.len()` coefficients are produced;
/// each depends on earlier ones alone, so a short output is a prefix of the
/// full solution.
pub fn to_polynomial<T: Ring>(pascal: &[T], output: &mut [T], transform: &ElectiveTransform<T>) {
    let n = pascal.len();
    debug_assert!(output.len() <= n && n <= transform.len());

    for i in 0..output.len() {
        let row = transform.row(i);
        let mut sum = pascal[n - 1 - i];
        for q in 0..i {
            sum = sum.sub(row[i - q].mul(output[q]));
        }
        output[i] = match transform.pivot_inverse() {
            Some(inv) => sum.mul(inv),
            None => sum,
        };
    }
}
