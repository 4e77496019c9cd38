use std::time::Instant;

use tracing::{debug, info};

use crate::data::feature_matrix::FeatureMatrix;
use crate::error::{ClassifierError, Result};
use crate::eval::metrics::accuracy;
use crate::loss::log_likelihood::{indicator_matrix, LogLikelihood};
use crate::optim::gradient_ascent::GradientAscent;
use crate::softmax::model::{predicted_classes, SoftmaxRegression};
use crate::train::iteration_stats::IterationStats;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `model` for `config.iterations` full-batch steps and returns the
/// statistics of every completed iteration.
///
/// # Arguments
/// - `model`      — initialized model; its weights are updated in place
/// - `train`      — labeled training partition
/// - `validation` — optional labeled partition scored after every step
/// - `optimizer`  — learning rate and L2 penalty
/// - `config`     — iteration budget, weight rescale, progress channel
///
/// Each iteration computes the class probabilities of the training set,
/// takes one regularized gradient step, optionally rescales the weights,
/// then scores training and validation accuracy. Accuracy passes never
/// touch the weights.
///
/// # Early termination
/// The loop stops before the budget only if the `progress_tx` receiver has
/// been dropped.
pub fn train_loop(
    model: &mut SoftmaxRegression,
    train: &FeatureMatrix,
    validation: Option<&FeatureMatrix>,
    optimizer: &GradientAscent,
    config: &TrainConfig,
) -> Result<Vec<IterationStats>> {
    if config.iterations == 0 {
        return Err(ClassifierError::invalid_hyperparameter("iterations must be positive"));
    }
    if train.n_documents() == 0 {
        return Err(ClassifierError::EmptyInput("training partition has no documents".into()));
    }

    let train_labels = train.labels()?;
    let val_labels = validation.map(|v| v.labels()).transpose()?;

    model.begin_training()?;
    let result = run_iterations(model, train, validation, optimizer, config, &train_labels, val_labels.as_deref());
    model.finish_training();
    result
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn run_iterations(
    model: &mut SoftmaxRegression,
    train: &FeatureMatrix,
    validation: Option<&FeatureMatrix>,
    optimizer: &GradientAscent,
    config: &TrainConfig,
    train_labels: &[usize],
    val_labels: Option<&[usize]>,
) -> Result<Vec<IterationStats>> {
    let delta = indicator_matrix(train_labels, model.n_classes())?;
    let mut history = Vec::with_capacity(config.iterations);

    for iteration in 1..=config.iterations {
        let t_start = Instant::now();

        // ── Step ──────────────────────────────────────────────────────────
        let probabilities = model.probabilities(train)?;
        let log_likelihood = LogLikelihood::total(&probabilities, train_labels)?;
        let train_accuracy = accuracy(&predicted_classes(&probabilities), train_labels)?;

        let residual = LogLikelihood::residual(&delta, &probabilities);
        let gradient = train.left_product(&residual)?;
        optimizer.step(model, gradient)?;
        config.weight_rescale.apply(model.weights_mut());
        model.record_iteration();

        // ── Validation ────────────────────────────────────────────────────
        let val_accuracy = match (validation, val_labels) {
            (Some(v), Some(labels)) => Some(accuracy(&model.predict_classes(v)?, labels)?),
            _ => None,
        };

        let stats = IterationStats {
            iteration,
            total_iterations: config.iterations,
            log_likelihood,
            train_accuracy,
            val_accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };

        if config.log_every > 0 && iteration % config.log_every == 0 {
            info!(
                iteration,
                log_likelihood,
                train_accuracy,
                val_accuracy = ?stats.val_accuracy,
                "training iteration"
            );
        }

        // ── Emit progress ─────────────────────────────────────────────────
        let receiver_gone = match config.progress_tx {
            Some(ref tx) => tx.send(stats.clone()).is_err(),
            None => false,
        };
        history.push(stats);
        if receiver_gone {
            debug!(iteration, "progress receiver dropped, stopping");
            break;
        }
    }

    Ok(history)
}
