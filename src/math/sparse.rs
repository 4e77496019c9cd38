//! Column statistics and dense products over `sprs` CSR matrices.
//!
//! Rows are documents, so every pass walks `outer_iterator` once and
//! touches stored entries only. Implicit entries are zero.

use sprs::{CsMat, TriMat};

use crate::error::{ClassifierError, Result};
use crate::math::matrix::Matrix;

/// Builds a `rows.len() × cols` CSR matrix from `(column, value)` rows.
/// Zero values are dropped and duplicate columns are summed.
pub fn csr_from_rows(rows: &[Vec<(usize, f64)>], cols: usize) -> Result<CsMat<f64>> {
    let nnz = rows.iter().map(|r| r.len()).sum();
    let mut tri: TriMat<f64> = TriMat::with_capacity((rows.len(), cols), nnz);
    for (r, row) in rows.iter().enumerate() {
        for &(c, v) in row {
            if c >= cols {
                return Err(ClassifierError::shape_mismatch(format!(
                    "column {} out of range for {} columns", c, cols
                )));
            }
            if v != 0.0 {
                tri.add_triplet(r, c, v);
            }
        }
    }
    Ok(tri.to_csr())
}

/// Column-wise reductions and dense products on a CSR matrix.
pub trait SparseColumns {
    /// Sum of every column.
    fn column_sums(&self) -> Vec<f64>;

    /// Sum of squares of every column.
    fn column_square_sums(&self) -> Vec<f64>;

    /// Number of rows holding a stored value in each column.
    fn column_nonzero_counts(&self) -> Vec<usize>;

    /// Per-column `(min, max)`, counting implicit zeros whenever a column
    /// has fewer stored entries than there are rows.
    fn column_min_max(&self) -> Vec<(f64, f64)>;

    /// Dense `rhs · selfᵗ`: for a `K × cols` right-hand side the result is
    /// `K × rows`.
    fn mul_transposed_by(&self, rhs: &Matrix) -> Matrix;

    /// Dense `lhs · self`: for a `K × rows` left-hand side the result is
    /// `K × cols`.
    fn left_mul_by(&self, lhs: &Matrix) -> Matrix;

    /// Rewrites every stored value in place with `f(row, col, value)`.
    fn map_stored<F>(&mut self, f: F)
    where
        F: FnMut(usize, usize, f64) -> f64;
}

impl SparseColumns for CsMat<f64> {
    fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols()];
        for row in self.outer_iterator() {
            for (c, &v) in row.iter() {
                sums[c] += v;
            }
        }
        sums
    }

    fn column_square_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols()];
        for row in self.outer_iterator() {
            for (c, &v) in row.iter() {
                sums[c] += v * v;
            }
        }
        sums
    }

    fn column_nonzero_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.cols()];
        for row in self.outer_iterator() {
            for (c, _) in row.iter() {
                counts[c] += 1;
            }
        }
        counts
    }

    fn column_min_max(&self) -> Vec<(f64, f64)> {
        let mut bounds = vec![(f64::INFINITY, f64::NEG_INFINITY); self.cols()];
        for row in self.outer_iterator() {
            for (c, &v) in row.iter() {
                bounds[c].0 = bounds[c].0.min(v);
                bounds[c].1 = bounds[c].1.max(v);
            }
        }
        let counts = self.column_nonzero_counts();
        for (bound, &count) in bounds.iter_mut().zip(counts.iter()) {
            if count < self.rows() {
                bound.0 = bound.0.min(0.0);
                bound.1 = bound.1.max(0.0);
            }
        }
        bounds
    }

    fn mul_transposed_by(&self, rhs: &Matrix) -> Matrix {
        if rhs.cols != self.cols() {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(rhs.rows, self.rows());
        for (n, row) in self.outer_iterator().enumerate() {
            for k in 0..rhs.rows {
                let weights = &rhs.data[k];
                res.data[k][n] = row.iter().map(|(c, &v)| weights[c] * v).sum();
            }
        }
        res
    }

    fn left_mul_by(&self, lhs: &Matrix) -> Matrix {
        if lhs.cols != self.rows() {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(lhs.rows, self.cols());
        for (n, row) in self.outer_iterator().enumerate() {
            for k in 0..lhs.rows {
                let coeff = lhs.data[k][n];
                if coeff == 0.0 {
                    continue;
                }
                let out = &mut res.data[k];
                for (c, &v) in row.iter() {
                    out[c] += coeff * v;
                }
            }
        }
        res
    }

    fn map_stored<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, usize, f64) -> f64,
    {
        for (r, mut row) in self.outer_iterator_mut().enumerate() {
            for (c, v) in row.iter_mut() {
                *v = f(r, c, *v);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsMat<f64> {
        csr_from_rows(&[
            vec![(0, 1.0), (2, 3.0)],
            vec![(3, 2.0), (0, 1.0), (3, 1.0)],
            vec![(0, 1.0), (1, 0.0)],
        ], 4).unwrap()
    }

    fn dense(m: &CsMat<f64>) -> Matrix {
        let mut res = Matrix::zeros(m.rows(), m.cols());
        for (r, row) in m.outer_iterator().enumerate() {
            for (c, &v) in row.iter() {
                res.data[r][c] = v;
            }
        }
        res
    }

    #[test]
    fn build_merges_duplicates_and_drops_zeros() {
        let m = sample();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.nnz(), 5);
        assert_eq!(m.get(1, 3), Some(&3.0));
        assert_eq!(m.get(0, 2), Some(&3.0));
        assert_eq!(m.get(2, 1), None);
    }

    #[test]
    fn build_rejects_out_of_range_column() {
        assert!(csr_from_rows(&[vec![(2, 1.0)]], 2).is_err());
    }

    #[test]
    fn column_statistics_include_implicit_zeros() {
        let m = sample();
        assert_eq!(m.column_sums(), vec![3.0, 0.0, 3.0, 3.0]);
        assert_eq!(m.column_square_sums(), vec![3.0, 0.0, 9.0, 9.0]);
        assert_eq!(m.column_nonzero_counts(), vec![3, 0, 1, 1]);
        let bounds = m.column_min_max();
        assert_eq!(bounds[0], (1.0, 1.0));
        assert_eq!(bounds[2], (0.0, 3.0));
    }

    #[test]
    fn sparse_products_match_dense_products() {
        let m = sample();
        let d_m = dense(&m);
        let w = Matrix::from_data(vec![
            vec![0.5, -1.0, 2.0, 0.25],
            vec![1.0, 0.0, -0.5, 3.0],
        ]);
        assert_eq!(m.mul_transposed_by(&w), &w * &d_m.transpose());

        let d = Matrix::from_data(vec![
            vec![1.0, 0.0, -1.0],
            vec![0.5, 2.0, 0.0],
        ]);
        assert_eq!(m.left_mul_by(&d), &d * &d_m);
    }

    #[test]
    fn map_stored_sees_row_and_column() {
        let mut m = sample();
        m.map_stored(|r, c, v| if c == 0 { v } else { v * 10.0 + r as f64 });
        assert_eq!(m.get(0, 2), Some(&30.0));
        assert_eq!(m.get(1, 3), Some(&31.0));
        assert_eq!(m.get(2, 0), Some(&1.0));
    }
}
