pub mod smoothing;
pub mod class_stats;
pub mod estimator;
pub mod mutual_info;

pub use smoothing::Smoothing;
pub use class_stats::ClassStats;
pub use estimator::{NaiveBayesEstimator, NaiveBayesModel};
pub use mutual_info::TermRanking;
