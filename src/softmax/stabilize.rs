use serde::{Serialize, Deserialize};

use crate::math::matrix::Matrix;

/// Value substituted for an exponential that is not finite.
pub const EXP_CLAMP: f64 = 1.0e100;

/// How raw scores are brought into range before exponentiation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stabilizer {
    /// Subtract each column's largest finite score; the top class gets `exp(0) = 1`.
    #[default]
    SubtractColumnMax,
    /// Subtract the same constant from every score.
    FixedShift { shift: f64 },
    /// Divide each column by the population standard deviation of its
    /// scores, then subtract the column's largest scaled score. Columns
    /// with zero spread are only shifted.
    ScaleColumn,
}

/// Result of a column-wise softmax.
#[derive(Debug, Clone)]
pub struct SoftmaxOutput {
    /// `K × N`; column `n` is the class distribution of document `n`.
    pub probabilities: Matrix,
    /// Exponentials that were not finite and got clamped.
    pub clamped: usize,
    /// Columns whose finite exponentials overflowed when summed and were
    /// divided by their largest entry before normalizing.
    pub rescaled: usize,
    /// Columns whose exponentials summed to 0 and were left unnormalized.
    pub zero_columns: usize,
}

/// Turns a `K × N` score matrix into per-column distributions.
///
/// Non-finite exponentials are replaced by [`EXP_CLAMP`], or by `f64::MAX`
/// when a finite exponential in the same column already reaches
/// `EXP_CLAMP`. If the column total overflows, the column is divided by its
/// largest entry before normalizing. A column whose exponentials sum to
/// exactly 0 is left as computed.
pub fn softmax_columns(mut scores: Matrix, stabilizer: Stabilizer) -> SoftmaxOutput {
    let mut clamped = 0;
    let mut rescaled = 0;
    let mut zero_columns = 0;

    for n in 0..scores.cols {
        let factor = match stabilizer {
            Stabilizer::ScaleColumn => {
                let spread = finite_spread(scores.data.iter().map(|row| row[n]));
                if spread > 0.0 { 1.0 / spread } else { 1.0 }
            }
            _ => 1.0,
        };
        let shift = match stabilizer {
            Stabilizer::SubtractColumnMax | Stabilizer::ScaleColumn => {
                let max = scores.data.iter()
                    .map(|row| row[n] * factor)
                    .filter(|x| x.is_finite())
                    .fold(f64::NEG_INFINITY, f64::max);
                if max.is_finite() { max } else { 0.0 }
            }
            Stabilizer::FixedShift { shift } => shift,
        };

        let mut largest = 0.0f64;
        for row in scores.data.iter_mut() {
            row[n] = (row[n] * factor - shift).exp();
            if row[n].is_finite() {
                largest = largest.max(row[n]);
            }
        }
        let ceiling = if largest < EXP_CLAMP { EXP_CLAMP } else { f64::MAX };

        let mut total = 0.0;
        let mut peak = 0.0f64;
        for row in scores.data.iter_mut() {
            if !row[n].is_finite() {
                row[n] = ceiling;
                clamped += 1;
            }
            total += row[n];
            peak = peak.max(row[n]);
        }

        if !total.is_finite() {
            total = 0.0;
            for row in scores.data.iter_mut() {
                row[n] /= peak;
                total += row[n];
            }
            rescaled += 1;
        }

        if total != 0.0 {
            for row in scores.data.iter_mut() {
                row[n] /= total;
            }
        } else {
            zero_columns += 1;
        }
    }

    SoftmaxOutput { probabilities: scores, clamped, rescaled, zero_columns }
}

/// Population standard deviation of the finite values; 0 when there are
/// none.
fn finite_spread<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let finite: Vec<f64> = values.into_iter().filter(|x| x.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }
    let k = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / k;
    let variance = finite.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / k;
    let sd = variance.sqrt();
    if sd.is_finite() { sd } else { 0.0 }
}
