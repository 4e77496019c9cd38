use serde::{Serialize, Deserialize};

use crate::bayes::smoothing::Smoothing;
use crate::data::document::UnknownTermPolicy;
use crate::error::{ClassifierError, Result};
use crate::optim::gradient_ascent::WeightRescale;
use crate::scale::scale_mode::ScaleMode;
use crate::softmax::stabilize::Stabilizer;

/// Fixed dimensions of the dataset.
///
/// Defaults describe the 20-newsgroups bag-of-words files: 20 classes,
/// 61,188 terms, 10,000 training rows followed by 2,000 validation rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetShape {
    pub n_classes: usize,
    pub n_terms: usize,
    pub train_docs: usize,
    pub validation_docs: usize,
}

impl Default for DatasetShape {
    fn default() -> Self {
        DatasetShape {
            n_classes: 20,
            n_terms: 61_188,
            train_docs: 10_000,
            validation_docs: 2_000,
        }
    }
}

/// Hyperparameters of the softmax regression run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftmaxConfig {
    /// L2 penalty.
    pub lambda: f64,
    /// Learning rate.
    pub eta: f64,
    pub iterations: usize,
    /// Seed for the weight initialization; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Scaling pipeline, applied in order.
    pub scaling: Vec<ScaleMode>,
    pub stabilizer: Stabilizer,
    pub weight_rescale: WeightRescale,
    pub log_every: usize,
}

impl Default for SoftmaxConfig {
    fn default() -> Self {
        SoftmaxConfig {
            lambda: 0.001,
            eta: 0.01,
            iterations: 10_000,
            seed: None,
            scaling: vec![ScaleMode::TfIdf, ScaleMode::ColumnNormalize],
            stabilizer: Stabilizer::SubtractColumnMax,
            weight_rescale: WeightRescale::None,
            log_every: 1,
        }
    }
}

/// Hyperparameters of the Naive Bayes run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesConfig {
    pub beta: Smoothing,
    /// How many mutual-information terms to report.
    pub top_terms: usize,
    pub unknown_terms: UnknownTermPolicy,
}

impl Default for BayesConfig {
    fn default() -> Self {
        BayesConfig {
            beta: Smoothing::InverseVocabulary,
            top_terms: 100,
            unknown_terms: UnknownTermPolicy::Reject,
        }
    }
}

/// Complete run configuration, loadable from a JSON file. Missing fields
/// take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub dataset: DatasetShape,
    pub softmax: SoftmaxConfig,
    pub bayes: BayesConfig,
}

impl RunConfig {
    /// Checks every hyperparameter and dimension.
    pub fn validate(&self) -> Result<()> {
        let d = &self.dataset;
        if d.n_classes == 0 || d.n_terms == 0 || d.train_docs == 0 {
            return Err(ClassifierError::invalid_hyperparameter(
                "n_classes, n_terms and train_docs must be positive",
            ));
        }
        let s = &self.softmax;
        if !s.lambda.is_finite() || s.lambda < 0.0 {
            return Err(ClassifierError::invalid_hyperparameter(format!("lambda must be >= 0, got {}", s.lambda)));
        }
        if !s.eta.is_finite() || s.eta < 0.0 {
            return Err(ClassifierError::invalid_hyperparameter(format!("eta must be >= 0, got {}", s.eta)));
        }
        if s.iterations == 0 {
            return Err(ClassifierError::invalid_hyperparameter("iterations must be positive"));
        }
        if let Stabilizer::FixedShift { shift } = s.stabilizer {
            if !shift.is_finite() {
                return Err(ClassifierError::invalid_hyperparameter("stabilizer shift must be finite"));
            }
        }
        self.bayes.beta.beta(d.n_terms)?;
        Ok(())
    }

    /// Serializes the configuration to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a configuration from a JSON file.
    pub fn load_json(path: &str) -> Result<RunConfig> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_newsgroups() {
        let config = RunConfig::default();
        assert_eq!(config.dataset.n_classes, 20);
        assert_eq!(config.dataset.n_terms, 61_188);
        assert_eq!(config.softmax.scaling, vec![ScaleMode::TfIdf, ScaleMode::ColumnNormalize]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "softmax": { "lambda": 0.5, "scaling": ["min_max"] }, "bayes": { "beta": { "explicit": 1.0 } } }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.softmax.lambda, 0.5);
        assert_eq!(config.softmax.eta, 0.01);
        assert_eq!(config.softmax.scaling, vec![ScaleMode::MinMax]);
        assert_eq!(config.bayes.beta, Smoothing::Explicit(1.0));
        assert_eq!(config.dataset, DatasetShape::default());
    }

    #[test]
    fn stabilizer_variants_read_from_json() {
        let json = r#"{ "softmax": { "stabilizer": "scale_column" } }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.softmax.stabilizer, Stabilizer::ScaleColumn);

        let json = r#"{ "softmax": { "stabilizer": { "fixed_shift": { "shift": 2.5 } } } }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.softmax.stabilizer, Stabilizer::FixedShift { shift: 2.5 });
    }

    #[test]
    fn validate_rejects_bad_hyperparameters() {
        let mut config = RunConfig::default();
        config.softmax.lambda = -1.0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.softmax.iterations = 0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::default();
        config.bayes.beta = Smoothing::Explicit(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let path = path.to_str().unwrap();
        let mut config = RunConfig::default();
        config.softmax.seed = Some(3);
        config.save_json(path).unwrap();
        assert_eq!(RunConfig::load_json(path).unwrap(), config);
    }
}
