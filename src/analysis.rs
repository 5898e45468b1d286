//! Inverse problem of key derivation: recover the symmetry vector that maps a
//! known polynomial onto a known block.

use crate::error::{ElectiveError, Result};
use crate::pascal::{to_pascal, to_pascal_polar_reversed, PascalTriangle};
use crate::ring::Ring;
use crate::view::{PaddedView, SymbolSource};

/// Recover `e` such that `ToFunctionR(polynomial)` under the symmetry matrix
/// built from `e` reproduces `data`.
///
/// Fails with [`ElectiveError::NotInvertible`] when the polynomial's trailing
/// coefficient is even; [`padded_extract_symmetry`] sidesteps that case.
pub fn extract_symmetry<T: Ring>(
    data: &[T],
    polynomial: &[T],
    triangle: &PascalTriangle<T>,
) -> Result<Vec<T>> {
    back_substitute(data, polynomial, triangle)
}

/// Extraction over both inputs extended by one `ONE` symbol.
///
/// The sentinel makes the trailing coefficient a unit and keeps an all-zero
/// tail from degenerating. `triangle` must have height `data.len() + 1`; the
/// result holds `data.len() + 1` symbols.
pub fn padded_extract_symmetry<T: Ring>(
    data: &[T],
    polynomial: &[T],
    triangle: &PascalTriangle<T>,
) -> Result<Vec<T>> {
    back_substitute(&PaddedView::new(data), &PaddedView::new(polynomial), triangle)
}

fn back_substitute<T, D, P>(data: &D, polynomial: &P, triangle: &PascalTriangle<T>) -> Result<Vec<T>>
where
    T: Ring,
    D: SymbolSource<T> + ?Sized,
    P: SymbolSource<T> + ?Sized,
{
    let n = data.len();
    if polynomial.len() != n {
        return Err(ElectiveError::LengthMismatch {
            expected: n,
            actual: polynomial.len(),
        });
    }
    if n == 0 || triangle.height() < n {
        return Err(ElectiveError::InvalidShape(format!(
            "triangle of height {} cannot transform {} symbols",
            triangle.height(),
            n
        )));
    }

    let trailing = polynomial.at(n - 1);
    let inv = trailing
        .inverse()
        .ok_or(ElectiveError::NotInvertible(trailing.to_u64()))?;

    let mut pascal = vec![T::ZERO; n];
    to_pascal(data, &mut pascal, triangle);

    let mut symmetry: Vec<T> = Vec::with_capacity(n);
    for m in 0..n {
        let mut sum = pascal[n - 1 - m];
        for (t, &e) in symmetry.iter().enumerate() {
            sum = sum.sub(e.mul(polynomial.at(n - 1 - m + t)));
        }
        symmetry.push(sum.mul(inv));
    }

    Ok(symmetry)
}

/// Replay an extracted symmetry against its polynomial without building the
/// symmetry matrix: correlate, then undo the Pascal step.
///
/// Works for any recovered lead, odd or even.
pub fn reproduce_block<T: Ring>(polynomial: &[T], symmetry: &[T]) -> Result<Vec<T>> {
    let n = polynomial.len();
    if symmetry.len() != n {
        return Err(ElectiveError::LengthMismatch {
            expected: n,
            actual: symmetry.len(),
        });
    }
    if n == 0 {
        return Ok(Vec::new());
    }

    // A[k] = sum_m e[m] * poly[m + k], stored reversed for the polar pass
    let mut correlated = vec![T::ZERO; n];
    for k in 0..n {
        let value = (0..n - k).fold(T::ZERO, |acc, m| acc.mul_add(symmetry[m], polynomial[m + k]));
        correlated[n - 1 - k] = value;
    }

    let mut block = vec![T::ZERO; n];
    to_pascal_polar_reversed(&correlated, &mut block, &PascalTriangle::new(n));
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elective::{to_function_r, ElectiveSymmetry};
    use crate::symmetry::Symmetry;

    fn sample(seed: u32, n: usize) -> Vec<u32> {
        (0..n as u32)
            .map(|i| (i.wrapping_add(seed)).wrapping_mul(0x9E37_79B9) ^ (seed << 7))
            .collect()
    }

    #[test]
    fn test_extract_recovers_generating_symmetry() {
        let sym = Symmetry::new(sample(5, 16)).unwrap();
        let mut poly = sample(6, 16);
        poly[15] |= 1;

        let es = ElectiveSymmetry::new(&sym, 16);
        let mut data = vec![0u32; 16];
        to_function_r(&poly, &mut data, &es);

        let extracted = extract_symmetry(&data, &poly, &PascalTriangle::new(16)).unwrap();
        assert_eq!(extracted, sym.as_slice());
        assert_eq!(reproduce_block(&poly, &extracted).unwrap(), data);
    }

    #[test]
    fn test_even_trailing_coefficient_rejected() {
        let data = sample(1, 8);
        let mut poly = sample(2, 8);
        poly[7] &= !1;
        let err = extract_symmetry(&data, &poly, &PascalTriangle::new(8));
        assert!(matches!(err, Err(ElectiveError::NotInvertible(_))));
    }

    #[test]
    fn test_padded_extraction_reproduces_data() {
        let data = sample(10, 16);
        let mut poly = sample(9, 16);
        poly[15] &= !1;

        let e = padded_extract_symmetry(&data, &poly, &PascalTriangle::new(17)).unwrap();
        assert_eq!(e.len(), 17);

        let padded_poly = PaddedView::new(&poly).to_vec();
        let replayed = reproduce_block(&padded_poly, &e).unwrap();
        assert_eq!(&replayed[..16], &data[..]);

        let es = ElectiveSymmetry::exact(&e, 17);
        let mut via_matrix = vec![0u32; 17];
        to_function_r(&PaddedView::new(&poly), &mut via_matrix, &es);
        assert_eq!(&via_matrix[..16], &data[..]);
    }

    #[test]
    fn test_padded_handles_zero_tail() {
        let mut data = sample(3, 12);
        for x in &mut data[6..] {
            *x = 0;
        }
        let poly = vec![0u32; 12];
        let e = padded_extract_symmetry(&data, &poly, &PascalTriangle::new(13)).unwrap();
        let replayed = reproduce_block(&PaddedView::new(&poly).to_vec(), &e).unwrap();
        assert_eq!(&replayed[..12], &data[..]);
    }

    #[test]
    fn test_shape_errors() {
        let t = PascalTriangle::<u32>::new(4);
        assert!(extract_symmetry(&[1, 2, 3], &[1, 2], &t).is_err());
        assert!(extract_symmetry(&[1; 8], &[1; 8], &t).is_err());
        assert!(padded_extract_symmetry(&[1; 4], &[1; 4], &t).is_err());
        assert!(reproduce_block(&[1u32, 2], &[1]).is_err());
    }
}
