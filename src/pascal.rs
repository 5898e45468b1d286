//! Binomial-coefficient table over the ring and the diffusion map it induces.

use crate::ring::Ring;
use crate::view::SymbolSource;
use rayon::prelude::*;

/// Triangular table of binomial coefficients reduced modulo 2^W.
///
/// Row `i` holds `i + 1` entries, `C(i, 0) ..= C(i, i)`. Independent of any key.
#[derive(Debug, Clone)]
pub struct PascalTriangle<T> {
    rows: Vec<Vec<T>>,
}

impl<T: Ring> PascalTriangle<T> {
    pub fn new(height: usize) -> Self {
        let mut rows: Vec<Vec<T>> = Vec::with_capacity(height);

        for i in 0..height {
            let mut row = Vec::with_capacity(i + 1);
            row.push(T::ONE);
            if i > 0 {
                let prev = &rows[i - 1];
                for j in 1..i {
                    row.push(prev[j - 1].add(prev[j]));
                }
                row.push(T::ONE);
            }
            rows.push(row);
        }

        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &[T] {
        &self.rows[index]
    }
}

/// `output[i] = sum_j C(i, j) * data[j]` for every output row.
pub fn to_pascal<T, D>(data: &D, output: &mut [T], triangle: &PascalTriangle<T>)
where
    T: Ring,
    D: SymbolSource<T> + ?Sized,
{
    debug_assert!(output.len() <= data.len() && output.len() <= triangle.height());

    for (i, out) in output.iter_mut().enumerate() {
        *out = triangle
            .row(i)
            .iter()
            .enumerate()
            .fold(T::ZERO, |acc, (j, &c)| acc.mul_add(c, data.at(j)));
    }
}

/// Same dot products against the data read back to front.
pub fn to_pascal_reversed<T, D>(data: &D, output: &mut [T], triangle: &PascalTriangle<T>)
where
    T: Ring,
    D: SymbolSource<T> + ?Sized,
{
    let last = data.len() - 1;

    for (i, out) in output.iter_mut().enumerate() {
        *out = triangle
            .row(i)
            .iter()
            .enumerate()
            .fold(T::ZERO, |acc, (j, &c)| acc.mul_add(c, data.at(last - j)));
    }
}

/// Reversed read with alternating sign `(-1)^(i+j)`.
///
/// This is the inverse binomial transform of the reversed input, so
/// `to_pascal_polar_reversed(reverse(to_pascal(x))) == x`.
pub fn to_pascal_polar_reversed<T, D>(data: &D, output: &mut [T], triangle: &PascalTriangle<T>)
where
    T: Ring,
    D: SymbolSource<T> + ?Sized,
{
    let last = data.len() - 1;

    for (i, out) in output.iter_mut().enumerate() {
        let mut sum = T::ZERO;
        for (j, &c) in triangle.row(i).iter().enumerate() {
            let term = c.mul(data.at(last - j));
            sum = if (i + j) % 2 == 1 {
                sum.sub(term)
            } else {
                sum.add(term)
            };
        }
        *out = sum;
    }
}

/// [`to_pascal`] with rows distributed over the rayon pool.
pub fn to_pascal_parallel<T: Ring>(data: &[T], output: &mut [T], triangle: &PascalTriangle<T>) {
    output.par_iter_mut().enumerate().for_each(|(i, out)| {
        *out = triangle
            .row(i)
            .iter()
            .zip(data)
            .fold(T::ZERO, |acc, (&c, &d)| acc.mul_add(c, d));
    });
}

/// Allocating convenience wrapper around [`to_pascal`].
pub fn as_pascal<T: Ring>(data: &[T], triangle: &PascalTriangle<T>) -> Vec<T> {
    let mut result = vec![T::ZERO; data.len()];
    to_pascal(data, &mut result, triangle);
    result
}
