use serde::{Serialize, Deserialize};

use crate::error::{ClassifierError, Result};
use crate::math::matrix::Matrix;
use crate::softmax::model::SoftmaxRegression;

/// Optional in-place rescale of the weight matrix after each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WeightRescale {
    /// Leave the weights as the step produced them.
    #[default]
    None,
    /// Divide each weight column by its population standard deviation
    /// across classes. Columns with zero deviation are left alone.
    UnitVariance,
}

impl WeightRescale {
    pub fn apply(&self, weights: &mut Matrix) {
        match self {
            WeightRescale::None => {}
            WeightRescale::UnitVariance => {
                let k = weights.rows as f64;
                for c in 0..weights.cols {
                    let mean = weights.column_sum(c) / k;
                    let variance = weights.data.iter()
                        .map(|row| (row[c] - mean).powi(2))
                        .sum::<f64>() / k;
                    let sd = variance.sqrt();
                    if sd > 0.0 {
                        for row in weights.data.iter_mut() {
                            row[c] /= sd;
                        }
                    }
                }
            }
        }
    }
}

/// Batch gradient ascent with an L2 penalty.
///
/// One step computes `W += eta * (G - lambda * W)` where `G` is the
/// log-likelihood gradient `(Delta - P) · X`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientAscent {
    pub eta: f64,
    pub lambda: f64,
}

impl GradientAscent {
    pub fn new(eta: f64, lambda: f64) -> Result<GradientAscent> {
        if !eta.is_finite() || eta < 0.0 {
            return Err(ClassifierError::invalid_hyperparameter(format!("eta must be finite and >= 0, got {eta}")));
        }
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(ClassifierError::invalid_hyperparameter(format!("lambda must be finite and >= 0, got {lambda}")));
        }
        Ok(GradientAscent { eta, lambda })
    }

    /// Applies one regularized update to `model` given the unpenalized
    /// gradient, shaped like the weights.
    pub fn step(&self, model: &mut SoftmaxRegression, mut gradient: Matrix) -> Result<()> {
        let weights = model.weights_mut();
        if !gradient.same_shape(weights) {
            return Err(ClassifierError::shape_mismatch(format!(
                "gradient is {}x{}, weights are {}x{}",
                gradient.rows, gradient.cols, weights.rows, weights.cols
            )));
        }
        // An exactly-zero rate leaves the weights untouched.
        if self.eta == 0.0 {
            return Ok(());
        }
        gradient.scale_add(-self.lambda, weights);
        weights.scale_add(self.eta, &gradient);
        Ok(())
    }
}
