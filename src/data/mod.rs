pub mod document;
pub mod row;
pub mod feature_matrix;
pub mod dataset;

pub use document::{Document, Prediction, UnknownTermPolicy};
pub use row::{parse_row, LabelField, RowSchema};
pub use feature_matrix::FeatureMatrix;
pub use dataset::{read_documents, split_partitions, write_predictions, LabeledSplit, Vocabulary};
