use serde::{Serialize, Deserialize};

/// Column-wise transform applied to a feature matrix before optimization.
///
/// - `TfIdf`           — each term count divided by the document's total term
///   count, times `ln((N+1)/(df+1))`.
/// - `ColumnNormalize` — each column divided by its sum over all documents.
/// - `Standardize`     — subtract the column mean, divide by the population
///   standard deviation.
/// - `MinMax`          — rescale each column linearly onto `[0, 1]`.
///
/// The bias column is never transformed. Transforms do not commute; the
/// caller picks the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    TfIdf,
    ColumnNormalize,
    Standardize,
    MinMax,
}
