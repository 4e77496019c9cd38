use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::bayes::class_stats::ClassStats;
use crate::bayes::mutual_info::TermRanking;
use crate::bayes::smoothing::Smoothing;
use crate::data::document::{Document, Prediction, UnknownTermPolicy};
use crate::error::{ClassifierError, Result};
use crate::math::matrix::{argmax, Matrix};

/// Accumulates per-class counts from labeled documents.
///
/// Counting and estimation are separate phases: [`estimate`] consumes the
/// estimator, so no document can be added once probabilities exist.
///
/// [`estimate`]: NaiveBayesEstimator::estimate
#[derive(Debug, Clone)]
pub struct NaiveBayesEstimator {
    vocabulary_size: usize,
    smoothing: Smoothing,
    policy: UnknownTermPolicy,
    classes: Vec<ClassStats>,
}

impl NaiveBayesEstimator {
    pub fn new(n_classes: usize, vocabulary_size: usize, smoothing: Smoothing) -> Result<NaiveBayesEstimator> {
        if n_classes == 0 || vocabulary_size == 0 {
            return Err(ClassifierError::invalid_hyperparameter("need at least one class and one term"));
        }
        smoothing.beta(vocabulary_size)?;
        Ok(NaiveBayesEstimator {
            vocabulary_size,
            smoothing,
            policy: UnknownTermPolicy::default(),
            classes: vec![ClassStats::new(vocabulary_size); n_classes],
        })
    }

    pub fn with_unknown_terms(mut self, policy: UnknownTermPolicy) -> NaiveBayesEstimator {
        self.policy = policy;
        self
    }

    /// Adds one labeled training document.
    pub fn observe(&mut self, document: &Document) -> Result<()> {
        let n_classes = self.classes.len();
        let label = document.label.ok_or(ClassifierError::MissingLabels)?;
        if label == 0 || label > n_classes {
            return Err(ClassifierError::InvalidLabel { label, n_classes });
        }
        let terms = document.known_terms(self.vocabulary_size, self.policy)?;
        self.classes[label - 1].add_document(&terms);
        Ok(())
    }

    pub fn observe_all<'a, I>(&mut self, documents: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        for doc in documents {
            self.observe(doc)?;
        }
        Ok(())
    }

    pub fn documents_seen(&self) -> u64 {
        self.classes.iter().map(|c| c.documents).sum()
    }

    /// Computes priors, smoothed conditionals and the term ranking in one
    /// pass over the accumulated counts.
    pub fn estimate(self) -> Result<NaiveBayesModel> {
        let total_docs = self.documents_seen();
        if total_docs == 0 {
            return Err(ClassifierError::EmptyInput("no training documents were observed".into()));
        }
        let beta = self.smoothing.beta(self.vocabulary_size)?;
        let v = self.vocabulary_size as f64;

        let priors: Vec<f64> = self.classes.iter()
            .map(|c| c.documents as f64 / total_docs as f64)
            .collect();

        let mut conditionals = Matrix::zeros(self.classes.len(), self.vocabulary_size);
        for (row, class) in conditionals.data.iter_mut().zip(self.classes.iter()) {
            let denominator = class.total_words as f64 + beta * v;
            for (p, &count) in row.iter_mut().zip(class.term_counts.iter()) {
                *p = (count as f64 + beta) / denominator;
            }
        }
        debug!(classes = self.classes.len(), terms = self.vocabulary_size, beta, "estimated conditionals");

        let ranking = TermRanking::compute(&self.classes, &priors, beta);
        info!(documents = total_docs, "naive bayes model estimated");

        Ok(NaiveBayesModel {
            vocabulary_size: self.vocabulary_size,
            beta,
            policy: self.policy,
            classes: self.classes,
            priors,
            conditionals,
            ranking,
        })
    }
}

/// Estimated multinomial Naive Bayes model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    vocabulary_size: usize,
    beta: f64,
    policy: UnknownTermPolicy,
    classes: Vec<ClassStats>,
    priors: Vec<f64>,
    /// `K × V`; entry `[class-1][term-1]` is `P(term | class)`.
    conditionals: Matrix,
    ranking: TermRanking,
}

impl NaiveBayesModel {
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// The resolved smoothing constant.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn class_stats(&self, class: usize) -> Option<&ClassStats> {
        class.checked_sub(1).and_then(|k| self.classes.get(k))
    }

    /// `P(class)` for a 1-based class; `None` outside `1..=K`.
    pub fn prior(&self, class: usize) -> Option<f64> {
        class.checked_sub(1).and_then(|k| self.priors.get(k)).copied()
    }

    /// `P(term | class)` for 1-based indices; `None` when either is out of
    /// range.
    pub fn conditional(&self, term: usize, class: usize) -> Option<f64> {
        let k = class.checked_sub(1)?;
        let t = term.checked_sub(1)?;
        self.conditionals.data.get(k).and_then(|row| row.get(t)).copied()
    }

    /// Mutual-information ranking computed at estimation time.
    pub fn ranking(&self) -> &TermRanking {
        &self.ranking
    }

    /// Log-space score of every class:
    /// `ln P(class) + Σ count(term) · ln P(term | class)`.
    pub fn log_scores(&self, document: &Document) -> Result<Vec<f64>> {
        let terms = document.known_terms(self.vocabulary_size, self.policy)?;
        Ok(self.priors.iter()
            .zip(self.conditionals.data.iter())
            .map(|(&prior, row)| {
                prior.ln() + terms.iter()
                    .map(|&(term, count)| count as f64 * row[term - 1].ln())
                    .sum::<f64>()
            })
            .collect())
    }

    /// 1-based class with the highest score; ties go to the lowest class.
    pub fn classify(&self, document: &Document) -> Result<usize> {
        Ok(argmax(self.log_scores(document)?) + 1)
    }

    /// `(documentId, predictedClass)` pairs in input order.
    pub fn predict(&self, documents: &[Document]) -> Result<Vec<Prediction>> {
        documents.iter()
            .map(|doc| Ok(Prediction { document_id: doc.id, class: self.classify(doc)? }))
            .collect()
    }

    /// Serializes the model to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a model previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<NaiveBayesModel> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
