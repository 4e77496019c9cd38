use tracing::debug;

use crate::data::feature_matrix::FeatureMatrix;
use crate::error::{ClassifierError, Result};
use crate::math::sparse::SparseColumns;
use crate::scale::scale_mode::ScaleMode;

/// One transform with the statistics it was fitted on.
#[derive(Debug, Clone, PartialEq)]
pub enum FittedScale {
    TfIdf { idf: Vec<f64> },
    ColumnNormalize { sums: Vec<f64> },
    Standardize { means: Vec<f64>, deviations: Vec<f64> },
    MinMax { mins: Vec<f64>, maxs: Vec<f64> },
}

impl FittedScale {
    /// Computes the statistics `mode` needs from `matrix`.
    pub fn fit(matrix: &FeatureMatrix, mode: ScaleMode) -> Result<FittedScale> {
        let n = matrix.n_documents();
        if n == 0 {
            return Err(ClassifierError::EmptyInput("cannot fit scaling on an empty partition".into()));
        }
        let n_f = n as f64;
        let stored = matrix.stored();
        let offsets = matrix.offsets();

        let fitted = match mode {
            ScaleMode::TfIdf => {
                require_uncentered(matrix)?;
                let idf = stored.column_nonzero_counts()
                    .into_iter()
                    .map(|df| ((n_f + 1.0) / (df as f64 + 1.0)).ln())
                    .collect();
                FittedScale::TfIdf { idf }
            }
            ScaleMode::ColumnNormalize => {
                // A sum within rounding noise of 0 (a centered column) counts as 0.
                let sums = effective_sums(matrix)
                    .into_iter()
                    .zip(effective_abs_sums(matrix))
                    .map(|(s, magnitude)| if s.abs() <= n_f * f64::EPSILON * magnitude { 0.0 } else { s })
                    .collect();
                FittedScale::ColumnNormalize { sums }
            }
            ScaleMode::Standardize => {
                let sums = stored.column_sums();
                let squares = stored.column_square_sums();
                let mut means = Vec::with_capacity(stored.cols());
                let mut deviations = Vec::with_capacity(stored.cols());
                for c in 0..stored.cols() {
                    let o = offsets[c];
                    let sum = sums[c] + n_f * o;
                    let square_sum = squares[c] + 2.0 * o * sums[c] + n_f * o * o;
                    let mean = sum / n_f;
                    let variance = (square_sum / n_f - mean * mean).max(0.0);
                    means.push(mean);
                    deviations.push(variance.sqrt());
                }
                FittedScale::Standardize { means, deviations }
            }
            ScaleMode::MinMax => {
                let (mins, maxs) = stored.column_min_max()
                    .into_iter()
                    .zip(offsets.iter())
                    .map(|((lo, hi), o)| (lo + o, hi + o))
                    .unzip();
                FittedScale::MinMax { mins, maxs }
            }
        };
        Ok(fitted)
    }

    /// Applies the fitted transform. The matrix must have as many columns as
    /// the one the transform was fitted on.
    pub fn apply(&self, mut matrix: FeatureMatrix) -> Result<FeatureMatrix> {
        let width = match self {
            FittedScale::TfIdf { idf } => idf.len(),
            FittedScale::ColumnNormalize { sums } => sums.len(),
            FittedScale::Standardize { means, .. } => means.len(),
            FittedScale::MinMax { mins, .. } => mins.len(),
        };
        if width != matrix.n_features() {
            return Err(ClassifierError::shape_mismatch(format!(
                "scaling fitted on {} columns, matrix has {}", width, matrix.n_features()
            )));
        }

        match self {
            FittedScale::TfIdf { idf } => {
                require_uncentered(&matrix)?;
                let totals: Vec<f64> = matrix.stored().outer_iterator()
                    .map(|row| row.iter()
                        .filter(|(c, _)| *c != 0)
                        .map(|(_, &v)| v)
                        .sum())
                    .collect();
                matrix.stored_mut().map_stored(|r, c, v| {
                    if c == 0 || totals[r] == 0.0 {
                        v
                    } else {
                        v / totals[r] * idf[c]
                    }
                });
            }
            FittedScale::ColumnNormalize { sums } => {
                // Zero-sum columns are left as they are.
                let scale: Vec<f64> = sums.iter()
                    .map(|&s| if s != 0.0 { 1.0 / s } else { 1.0 })
                    .collect();
                matrix.apply_affine(&scale, &vec![0.0; scale.len()]);
            }
            FittedScale::Standardize { means, deviations } => {
                let (scale, shift) = affine_onto(means, deviations, |m, d| (1.0 / d, -m / d));
                matrix.apply_affine(&scale, &shift);
            }
            FittedScale::MinMax { mins, maxs } => {
                let spans: Vec<f64> = maxs.iter().zip(mins.iter()).map(|(hi, lo)| hi - lo).collect();
                let (scale, shift) = affine_onto(mins, &spans, |lo, span| (1.0 / span, -lo / span));
                matrix.apply_affine(&scale, &shift);
            }
        }
        Ok(matrix)
    }
}

/// An ordered scaling pipeline, fitted on one partition and reusable on
/// others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scaler {
    steps: Vec<FittedScale>,
}

impl Scaler {
    /// Fits each mode on the output of the previous one and returns the
    /// transformed matrix with the fitted pipeline.
    pub fn fit_transform(mut matrix: FeatureMatrix, modes: &[ScaleMode]) -> Result<(FeatureMatrix, Scaler)> {
        let mut steps = Vec::with_capacity(modes.len());
        for &mode in modes {
            let step = FittedScale::fit(&matrix, mode)?;
            matrix = step.apply(matrix)?;
            debug!(?mode, "applied scaling");
            steps.push(step);
        }
        Ok((matrix, Scaler { steps }))
    }

    /// Replays the fitted pipeline on another partition.
    pub fn transform(&self, mut matrix: FeatureMatrix) -> Result<FeatureMatrix> {
        for step in &self.steps {
            matrix = step.apply(matrix)?;
        }
        Ok(matrix)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Fits `mode` on `matrix` and applies it to the same matrix.
pub fn scale(matrix: FeatureMatrix, mode: ScaleMode) -> Result<FeatureMatrix> {
    FittedScale::fit(&matrix, mode)?.apply(matrix)
}

fn require_uncentered(matrix: &FeatureMatrix) -> Result<()> {
    if matrix.has_offsets() {
        return Err(ClassifierError::Scaling(
            "tf-idf needs a matrix whose implicit entries are zero; apply it before standardize or min-max".into(),
        ));
    }
    Ok(())
}

fn effective_sums(matrix: &FeatureMatrix) -> Vec<f64> {
    let n = matrix.n_documents() as f64;
    matrix.stored().column_sums()
        .into_iter()
        .zip(matrix.offsets().iter())
        .map(|(s, o)| s + n * o)
        .collect()
}

/// Sum of absolute effective values per column.
fn effective_abs_sums(matrix: &FeatureMatrix) -> Vec<f64> {
    let stored = matrix.stored();
    let mut sums = vec![0.0; stored.cols()];
    let mut counts = vec![0usize; stored.cols()];
    for row in stored.outer_iterator() {
        for (c, &v) in row.iter() {
            sums[c] += (v + matrix.offsets()[c]).abs();
            counts[c] += 1;
        }
    }
    let n = stored.rows();
    for (c, sum) in sums.iter_mut().enumerate() {
        *sum += (n - counts[c]) as f64 * matrix.offsets()[c].abs();
    }
    sums
}

/// Builds per-column `(scale, shift)` from a center and a spread; a zero
/// spread maps the whole column to 0.
fn affine_onto<F>(centers: &[f64], spreads: &[f64], f: F) -> (Vec<f64>, Vec<f64>)
where
    F: Fn(f64, f64) -> (f64, f64),
{
    centers.iter().zip(spreads.iter())
        .map(|(&c, &s)| if s == 0.0 { (0.0, 0.0) } else { f(c, s) })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::row::RowSchema;

    const EPS: f64 = 1e-12;

    fn matrix() -> FeatureMatrix {
        // 3 terms, 4 documents.
        let rows = vec!["1,2,0,1,1", "2,0,3,1,2", "3,1,0,1,1", "4,0,0,1,2"];
        FeatureMatrix::load(rows, &RowSchema::labeled(3, 2)).unwrap()
    }

    fn assert_bias_is_one(m: &FeatureMatrix) {
        for r in 0..m.n_documents() {
            assert_eq!(m.value(r, 0), 1.0);
        }
    }

    #[test]
    fn tf_idf_weights_by_document_length_and_rarity() {
        let m = scale(matrix(), ScaleMode::TfIdf).unwrap();
        // doc 1: total 3, term 1 df = 2 -> (2/3) * ln(5/3)
        assert!((m.value(0, 1) - 2.0 / 3.0 * (5.0f64 / 3.0).ln()).abs() < EPS);
        // term 3 appears everywhere -> ln(5/5) = 0
        assert!(m.value(0, 3).abs() < EPS);
        assert_bias_is_one(&m);
    }

    #[test]
    fn column_normalize_divides_by_sum() {
        let m = scale(matrix(), ScaleMode::ColumnNormalize).unwrap();
        assert!((m.value(0, 1) - 2.0 / 3.0).abs() < EPS);
        assert!((m.value(2, 1) - 1.0 / 3.0).abs() < EPS);
        assert!((m.value(1, 3) - 0.25).abs() < EPS);
        assert_bias_is_one(&m);
    }

    #[test]
    fn column_normalize_leaves_zero_sum_column() {
        let rows = vec!["1,0,2,1", "2,0,1,2"];
        let m = scale(FeatureMatrix::load(rows, &RowSchema::labeled(2, 2)).unwrap(), ScaleMode::ColumnNormalize).unwrap();
        assert_eq!(m.value(0, 1), 0.0);
        assert!(m.value(0, 1).is_finite());
    }

    #[test]
    fn standardize_gives_zero_mean_unit_variance() {
        let m = scale(matrix(), ScaleMode::Standardize).unwrap();
        for c in 1..=2 {
            let values: Vec<f64> = (0..4).map(|r| m.value(r, c)).collect();
            let mean = values.iter().sum::<f64>() / 4.0;
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-9);
            assert!((var - 1.0).abs() < 1e-9);
        }
        // constant column maps to 0
        assert_eq!(m.value(0, 3), 0.0);
        assert_bias_is_one(&m);
    }

    #[test]
    fn min_max_maps_onto_unit_interval() {
        let m = scale(matrix(), ScaleMode::MinMax).unwrap();
        assert!((m.value(0, 1) - 1.0).abs() < EPS);
        assert!((m.value(2, 1) - 0.5).abs() < EPS);
        assert!(m.value(1, 1).abs() < EPS);
        assert_eq!(m.value(0, 3), 0.0);
        assert_bias_is_one(&m);
    }

    #[test]
    fn column_normalize_after_standardize_keeps_centered_columns() {
        let centered = scale(matrix(), ScaleMode::Standardize).unwrap();
        let m = scale(centered.clone(), ScaleMode::ColumnNormalize).unwrap();
        for r in 0..4 {
            for c in 1..=3 {
                assert!((m.value(r, c) - centered.value(r, c)).abs() < EPS);
            }
        }
        assert_bias_is_one(&m);
    }

    #[test]
    fn tf_idf_after_standardize_is_rejected() {
        let m = scale(matrix(), ScaleMode::Standardize).unwrap();
        assert!(matches!(scale(m, ScaleMode::TfIdf), Err(ClassifierError::Scaling(_))));
    }

    #[test]
    fn fitted_pipeline_replays_training_statistics() {
        let (train, scaler) = Scaler::fit_transform(matrix(), &[ScaleMode::TfIdf, ScaleMode::ColumnNormalize]).unwrap();
        assert_eq!(scaler.len(), 2);
        let replayed = scaler.transform(matrix()).unwrap();
        assert_eq!(train, replayed);

        let other = FeatureMatrix::load(vec!["9,1,1,0,1"], &RowSchema::labeled(3, 2)).unwrap();
        let scaled = scaler.transform(other).unwrap();
        assert_bias_is_one(&scaled);
    }

    #[test]
    fn scaling_is_deterministic() {
        let a = scale(scale(matrix(), ScaleMode::TfIdf).unwrap(), ScaleMode::ColumnNormalize).unwrap();
        let b = scale(scale(matrix(), ScaleMode::TfIdf).unwrap(), ScaleMode::ColumnNormalize).unwrap();
        assert_eq!(a, b);
    }
}
