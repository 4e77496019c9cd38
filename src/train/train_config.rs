use std::sync::mpsc;

use crate::optim::gradient_ascent::WeightRescale;
use crate::train::iteration_stats::IterationStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `iterations`     — number of full-batch gradient steps; there is no
///                      convergence test
/// - `weight_rescale` — optional rescale of the weights after each step
/// - `log_every`      — emit an `info` log line every this many iterations
///                      (0 disables the per-iteration line)
/// - `progress_tx`    — optional channel sender; one `IterationStats` is sent
///                      per completed iteration. If the receiver is dropped
///                      the loop stops early.
pub struct TrainConfig {
    pub iterations: usize,
    pub weight_rescale: WeightRescale,
    pub log_every: usize,
    pub progress_tx: Option<mpsc::Sender<IterationStats>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no rescale and no progress channel.
    pub fn new(iterations: usize) -> Self {
        TrainConfig {
            iterations,
            weight_rescale: WeightRescale::None,
            log_every: 1,
            progress_tx: None,
        }
    }
}
