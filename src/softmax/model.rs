use rand::Rng;
use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::data::document::Prediction;
use crate::data::feature_matrix::FeatureMatrix;
use crate::error::{ClassifierError, Result};
use crate::math::matrix::Matrix;
use crate::softmax::stabilize::{softmax_columns, Stabilizer};

/// Upper bound of the uniform draw used to initialize weights.
pub const INIT_SCALE: f64 = 0.1;

/// Lifecycle of a [`SoftmaxRegression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    /// Weights not drawn yet; nothing can be computed.
    Uninitialized,
    /// Weights drawn or injected, no iteration run.
    Initialized,
    /// Inside a training run.
    Training,
    /// A training run finished its iteration budget.
    Stopped,
}

/// Multinomial logistic regression over `K` classes and `V` terms.
///
/// The weight matrix is `K × (V+1)`; column 0 multiplies the bias feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxRegression {
    n_classes: usize,
    n_terms: usize,
    weights: Matrix,
    state: ModelState,
    iteration: usize,
    pub stabilizer: Stabilizer,
}

impl SoftmaxRegression {
    pub fn new(n_classes: usize, n_terms: usize) -> Result<SoftmaxRegression> {
        if n_classes == 0 {
            return Err(ClassifierError::invalid_hyperparameter("model needs at least one class"));
        }
        Ok(SoftmaxRegression {
            n_classes,
            n_terms,
            weights: Matrix::zeros(n_classes, n_terms + 1),
            state: ModelState::Uninitialized,
            iteration: 0,
            stabilizer: Stabilizer::default(),
        })
    }

    /// Builds an already-initialized model from explicit weights, skipping
    /// the random draw.
    pub fn with_weights(weights: Matrix) -> Result<SoftmaxRegression> {
        if weights.rows == 0 || weights.cols == 0 {
            return Err(ClassifierError::shape_mismatch("weights must have at least one row and column"));
        }
        Ok(SoftmaxRegression {
            n_classes: weights.rows,
            n_terms: weights.cols - 1,
            weights,
            state: ModelState::Initialized,
            iteration: 0,
            stabilizer: Stabilizer::default(),
        })
    }

    pub fn with_stabilizer(mut self, stabilizer: Stabilizer) -> SoftmaxRegression {
        self.stabilizer = stabilizer;
        self
    }

    /// Draws every weight uniformly from `[0, INIT_SCALE)`. Allowed once.
    pub fn initialize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        if self.state != ModelState::Uninitialized {
            return Err(ClassifierError::invalid_state("weights are already initialized"));
        }
        self.weights = Matrix::random_uniform(self.n_classes, self.n_terms + 1, INIT_SCALE, rng);
        self.state = ModelState::Initialized;
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut Matrix {
        &mut self.weights
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Number of completed training iterations over the model's lifetime.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub(crate) fn begin_training(&mut self) -> Result<()> {
        match self.state {
            ModelState::Initialized | ModelState::Stopped => {
                self.state = ModelState::Training;
                Ok(())
            }
            ModelState::Uninitialized => Err(ClassifierError::invalid_state("cannot train before weights are initialized")),
            ModelState::Training => Err(ClassifierError::invalid_state("a training run is already in progress")),
        }
    }

    pub(crate) fn record_iteration(&mut self) {
        self.iteration += 1;
    }

    pub(crate) fn finish_training(&mut self) {
        self.state = ModelState::Stopped;
    }

    fn ensure_ready(&self, features: &FeatureMatrix) -> Result<()> {
        if self.state == ModelState::Uninitialized {
            return Err(ClassifierError::invalid_state("weights are not initialized"));
        }
        if features.n_terms() != self.n_terms {
            return Err(ClassifierError::shape_mismatch(format!(
                "model has {} terms, partition has {}", self.n_terms, features.n_terms()
            )));
        }
        Ok(())
    }

    /// `K × N` class probabilities for every document of `features`.
    pub fn probabilities(&self, features: &FeatureMatrix) -> Result<Matrix> {
        self.ensure_ready(features)?;
        let scores = features.scores(&self.weights)?;
        let out = softmax_columns(scores, self.stabilizer);
        if out.clamped > 0 || out.rescaled > 0 {
            warn!(clamped = out.clamped, rescaled = out.rescaled, "clamped non-finite exponentials");
        }
        Ok(out.probabilities)
    }

    /// 1-based predicted class of every document.
    pub fn predict_classes(&self, features: &FeatureMatrix) -> Result<Vec<usize>> {
        let probabilities = self.probabilities(features)?;
        Ok(predicted_classes(&probabilities))
    }

    /// `(documentId, predictedClass)` pairs in document order.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<Prediction>> {
        let classes = self.predict_classes(features)?;
        Ok(features.document_ids().iter()
            .zip(classes)
            .map(|(&document_id, class)| Prediction { document_id, class })
            .collect())
    }

    /// Serializes the model to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a model previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<SoftmaxRegression> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Argmax of every probability column, as a 1-based class.
pub fn predicted_classes(probabilities: &Matrix) -> Vec<usize> {
    (0..probabilities.cols)
        .map(|n| probabilities.argmax_column(n) + 1)
        .collect()
}
