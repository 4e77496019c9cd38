use crate::error::{ClassifierError, Result};
use crate::math::matrix::Matrix;

/// Conditional log-likelihood of the labels under a softmax model.
pub struct LogLikelihood;

/// Small epsilon added inside ln() to prevent ln(0) = -inf.
const EPS: f64 = 1e-12;

impl LogLikelihood {
    /// Computes the scalar log-likelihood:
    ///   L = sum_n ln(probabilities[y_n][n] + eps)
    ///
    /// `probabilities` — `K × N` softmax output
    /// `labels`        — 1-based true class of each column
    pub fn total(probabilities: &Matrix, labels: &[usize]) -> Result<f64> {
        if labels.len() != probabilities.cols {
            return Err(ClassifierError::shape_mismatch(format!(
                "{} labels for {} probability columns", labels.len(), probabilities.cols
            )));
        }
        let mut total = 0.0;
        for (n, &y) in labels.iter().enumerate() {
            if y == 0 || y > probabilities.rows {
                return Err(ClassifierError::InvalidLabel { label: y, n_classes: probabilities.rows });
            }
            total += (probabilities.data[y - 1][n] + EPS).ln();
        }
        Ok(total)
    }

    /// Residual `delta - probabilities` whose product with the feature
    /// matrix is the gradient of `total` w.r.t. the weights.
    pub fn residual(delta: &Matrix, probabilities: &Matrix) -> Matrix {
        delta - probabilities
    }
}

/// One-hot `K × N` indicator matrix: column `n` has a 1 at row `labels[n] - 1`.
pub fn indicator_matrix(labels: &[usize], n_classes: usize) -> Result<Matrix> {
    let mut delta = Matrix::zeros(n_classes, labels.len());
    for (n, &label) in labels.iter().enumerate() {
        if label == 0 || label > n_classes {
            return Err(ClassifierError::InvalidLabel { label, n_classes });
        }
        delta.data[label - 1][n] = 1.0;
    }
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_is_one_hot_per_column() {
        let delta = indicator_matrix(&[2, 1, 3], 3).unwrap();
        assert_eq!(delta.data, vec![
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ]);
        for n in 0..3 {
            assert_eq!(delta.column_sum(n), 1.0);
        }
    }

    #[test]
    fn indicator_rejects_bad_label() {
        assert!(matches!(
            indicator_matrix(&[1, 4], 3),
            Err(ClassifierError::InvalidLabel { label: 4, n_classes: 3 })
        ));
    }

    #[test]
    fn likelihood_is_zero_for_certain_correct_predictions() {
        let p = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert!(LogLikelihood::total(&p, &[1, 2]).unwrap().abs() < 1e-9);
        assert!(LogLikelihood::total(&p, &[2, 1]).unwrap() < -20.0);
    }

    #[test]
    fn likelihood_rejects_bad_labels() {
        let p = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert!(matches!(
            LogLikelihood::total(&p, &[1, 3]),
            Err(ClassifierError::InvalidLabel { label: 3, n_classes: 2 })
        ));
        assert!(matches!(LogLikelihood::total(&p, &[0, 1]), Err(ClassifierError::InvalidLabel { .. })));
        assert!(matches!(LogLikelihood::total(&p, &[1]), Err(ClassifierError::ShapeMismatch(_))));
    }

    #[test]
    fn residual_is_delta_minus_probabilities() {
        let delta = indicator_matrix(&[1], 2).unwrap();
        let p = Matrix::from_data(vec![vec![0.75], vec![0.25]]);
        let r = LogLikelihood::residual(&delta, &p);
        assert_eq!(r.data, vec![vec![0.25], vec![-0.25]]);
    }
}
