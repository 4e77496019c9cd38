use serde::{Serialize, Deserialize};

/// Per-iteration training statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `IterationStats` value at the end of every completed
/// iteration. The full history is also returned when the run ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationStats {
    /// 1-based iteration number within this run.
    pub iteration: usize,
    /// Total iterations requested for this run.
    pub total_iterations: usize,
    /// Log-likelihood of the training labels under the weights the step
    /// started from.
    pub log_likelihood: f64,
    /// Training accuracy as a fraction in [0, 1], read from the same
    /// probabilities as `log_likelihood`.
    pub train_accuracy: f64,
    /// Validation accuracy after the step, if a validation set was provided.
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of this iteration in milliseconds.
    pub elapsed_ms: u64,
}
