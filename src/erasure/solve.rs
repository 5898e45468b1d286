use crate::error::{ElectiveError, Result};
use crate::ring::Ring;
use log::warn;

/// Gauss-Jordan elimination of `matrix * x = constants` over Z/2^W.
///
/// On success `constants` holds `x` and `matrix` is the identity. For each
/// pivot column a nonzero entry is searched forward from the diagonal; when
/// none is left, an earlier row with a nonzero entry in that column is folded
/// together with the next row into the pivot row and the search is retried.
/// The fold adds the earlier entry twice, so the retried pivot is even and
/// the call ends in a matrix error; the fold is logged with `warn!`.
pub fn row_solve<T: Ring>(matrix: &mut [Vec<T>], constants: &mut [T]) -> Result<()> {
    let n = matrix.len();
    if constants.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(ElectiveError::MatrixError(format!(
            "system must be {}x{} with {} constants",
            n,
            n,
            constants.len()
        )));
    }

    for i in 0..n {
        let mut attempts = 0;
        loop {
            if let Some(j) = (i..n).find(|&j| !matrix[j][i].is_zero()) {
                if j != i {
                    matrix.swap(i, j);
                    constants.swap(i, j);
                }
                break;
            }

            attempts += 1;
            if attempts > n {
                return Err(ElectiveError::MatrixError(format!(
                    "column {} stays zero after {} fallback combinations",
                    i, n
                )));
            }

            let earlier = (0..i)
                .find(|&j| !matrix[j][i].is_zero())
                .ok_or_else(|| ElectiveError::MatrixError(format!("column {} is zero", i)))?;
            if i + 1 >= n {
                return Err(ElectiveError::MatrixError(format!(
                    "no row left to combine for column {}",
                    i
                )));
            }

            warn!(
                "row_solve: backward fallback on column {} using rows {} and {}",
                i,
                earlier,
                i + 1
            );
            for k in 0..n {
                let extra = matrix[i + 1][k].add(matrix[earlier][k]);
                matrix[i][k] = matrix[i][k].add(matrix[earlier][k]).add(extra);
            }
            let extra = constants[i + 1].add(constants[earlier]);
            constants[i] = constants[i].add(constants[earlier]).add(extra);
        }

        let pivot = matrix[i][i];
        if pivot != T::ONE {
            let inv = pivot.inverse().ok_or_else(|| {
                ElectiveError::MatrixError(format!(
                    "pivot {:#x} in column {} is not a unit",
                    pivot.to_u64(),
                    i
                ))
            })?;
            for value in matrix[i].iter_mut() {
                *value = value.mul(inv);
            }
            constants[i] = constants[i].mul(inv);
        }

        for j in 0..n {
            if j == i {
                continue;
            }
            let factor = matrix[j][i];
            if factor.is_zero() {
                continue;
            }
            constants[j] = constants[j].sub(constants[i].mul(factor));
            for k in 0..n {
                matrix[j][k] = matrix[j][k].sub(matrix[i][k].mul(factor));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solves_unit_triangular_system() {
        // x = [3, 5, 7]
        let mut m = vec![vec![1u8, 2, 3], vec![0, 1, 4], vec![0, 0, 1]];
        let mut s = vec![3 + 10 + 21, 5 + 28, 7];
        row_solve(&mut m, &mut s).unwrap();
        assert_eq!(s, vec![3, 5, 7]);
        assert_eq!(m, vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]]);
    }

    #[test]
    fn test_forward_search_swaps_rows() {
        // x = [2, 9]
        let mut m = vec![vec![0u32, 3], vec![5, 1]];
        let mut s = vec![27, 19];
        row_solve(&mut m, &mut s).unwrap();
        assert_eq!(s, vec![2, 9]);
    }

    #[test]
    fn test_odd_pivots_are_normalized() {
        let x = [0x1234_5678_9ABC_DEF0u64, 42, u64::MAX];
        // leading minors 3, -9, -49 are all odd
        let a = vec![vec![3u64, 6, 1], vec![5, 7, 2], vec![9, 4, 10]];
        let mut s: Vec<u64> = a
            .iter()
            .map(|r| r.iter().zip(&x).fold(0u64, |acc, (&c, &v)| acc.mul_add(c, v)))
            .collect();
        let mut m = a.clone();
        row_solve(&mut m, &mut s).unwrap();
        assert_eq!(s, x.to_vec());
    }

    #[test]
    fn test_even_pivot_is_matrix_error() {
        let mut m = vec![vec![2u16, 1], vec![4, 3]];
        let mut s = vec![1, 1];
        assert!(matches!(
            row_solve(&mut m, &mut s),
            Err(ElectiveError::MatrixError(_))
        ));
    }

    #[test]
    fn test_zero_column_is_matrix_error() {
        let mut m = vec![vec![0u8, 1], vec![0, 1]];
        let mut s = vec![0, 0];
        assert!(row_solve(&mut m, &mut s).is_err());
    }

    #[test]
    fn test_backward_fallback_combines_rows() {
        // column 1 is zero from the diagonal down but set in row 0
        let mut m = vec![vec![1u8, 1, 0], vec![0, 0, 1], vec![0, 0, 1]];
        let mut s = vec![1, 2, 3];
        let result = row_solve(&mut m, &mut s);

        // row 1 became row1 + row0 + (row2 + row0); the doubled pivot is not a unit
        assert_eq!(m[1], vec![2, 2, 2]);
        assert_eq!(s[1], 2 + 1 + 3 + 1);
        match result {
            Err(ElectiveError::MatrixError(reason)) => {
                assert!(reason.contains("pivot 0x2 in column 1"), "{}", reason)
            }
            other => panic!("expected a matrix error, got {:?}", other),
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let mut m = vec![vec![1u8, 0]];
        let mut s = vec![0];
        assert!(row_solve(&mut m, &mut s).is_err());
    }
}
