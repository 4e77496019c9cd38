//! Error type shared by every module of the crate.
//!
//! Loading and validation failures are fatal and surface as a
//! [`ClassifierError`]. Numeric overflow inside the softmax step is not an
//! error: it is clamped where it happens and never reaches this type.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    /// A record does not match the `id, counts..., label` schema.
    #[error("malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    /// A document references a term index outside the vocabulary.
    #[error("unknown term index {term} (vocabulary has {vocabulary_size} terms)")]
    UnknownTerm { term: usize, vocabulary_size: usize },

    #[error("class label {label} is outside 1..={n_classes}")]
    InvalidLabel { label: usize, n_classes: usize },

    #[error("partition has no class labels")]
    MissingLabels,

    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    /// An operation was called in a state that does not allow it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("scaling error: {0}")]
    Scaling(String),

    #[error("empty input: {0}")]
    EmptyInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClassifierError {
    pub fn malformed_row<S: Into<String>>(row: usize, reason: S) -> Self {
        ClassifierError::MalformedRow { row, reason: reason.into() }
    }

    pub fn invalid_hyperparameter<S: Into<String>>(msg: S) -> Self {
        ClassifierError::InvalidHyperparameter(msg.into())
    }

    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        ClassifierError::InvalidState(msg.into())
    }

    pub fn shape_mismatch<S: Into<String>>(msg: S) -> Self {
        ClassifierError::ShapeMismatch(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
