use std::fmt;

use serde::{Serialize, Deserialize};

use crate::error::{ClassifierError, Result};

/// `K × K` grid of raw counts indexed `[true - 1][predicted - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    n_classes: usize,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(n_classes: usize) -> ConfusionMatrix {
        ConfusionMatrix { n_classes, counts: vec![vec![0; n_classes]; n_classes] }
    }

    /// Builds a fresh matrix from paired 1-based labels.
    pub fn from_predictions(predictions: &[usize], truth: &[usize], n_classes: usize) -> Result<ConfusionMatrix> {
        if predictions.len() != truth.len() {
            return Err(ClassifierError::shape_mismatch(format!(
                "{} predictions for {} labels", predictions.len(), truth.len()
            )));
        }
        let mut matrix = ConfusionMatrix::new(n_classes);
        for (&p, &t) in predictions.iter().zip(truth.iter()) {
            matrix.record(t, p)?;
        }
        Ok(matrix)
    }

    pub fn record(&mut self, truth: usize, predicted: usize) -> Result<()> {
        for label in [truth, predicted] {
            if label == 0 || label > self.n_classes {
                return Err(ClassifierError::InvalidLabel { label, n_classes: self.n_classes });
            }
        }
        self.counts[truth - 1][predicted - 1] += 1;
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Count at `[truth][predicted]`; `None` outside `1..=K`.
    pub fn get(&self, truth: usize, predicted: usize) -> Option<usize> {
        let row = self.counts.get(truth.checked_sub(1)?)?;
        row.get(predicted.checked_sub(1)?).copied()
    }

    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Number of examples whose true class is `truth`.
    pub fn row_sum(&self, truth: usize) -> Option<usize> {
        let row = self.counts.get(truth.checked_sub(1)?)?;
        Some(row.iter().sum())
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.n_classes).map(|i| self.counts[i][i]).sum()
    }

    /// Accuracy read off the diagonal; 0 for an empty matrix.
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.correct() as f64 / total as f64,
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.counts {
            let cells: Vec<String> = row.iter().map(|c| format!("{c:>5}")).collect();
            writeln!(f, "{}", cells.join(""))?;
        }
        Ok(())
    }
}
