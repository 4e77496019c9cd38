use crate::error::{ClassifierError, Result};

/// Fraction of predictions equal to the truth. An empty input scores 0.
pub fn accuracy(predictions: &[usize], truth: &[usize]) -> Result<f64> {
    if predictions.len() != truth.len() {
        return Err(ClassifierError::shape_mismatch(format!(
            "{} predictions for {} labels", predictions.len(), truth.len()
        )));
    }
    if truth.is_empty() {
        return Ok(0.0);
    }
    let correct = predictions.iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}
