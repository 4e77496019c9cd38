pub mod error;
pub mod logging;
pub mod config;
pub mod math;
pub mod data;
pub mod scale;
pub mod softmax;
pub mod loss;
pub mod optim;
pub mod train;
pub mod eval;
pub mod bayes;
pub mod cli;

// Convenience re-exports
pub use error::{ClassifierError, Result};
pub use config::RunConfig;
pub use math::matrix::Matrix;
pub use data::feature_matrix::FeatureMatrix;
pub use scale::{ScaleMode, Scaler};
pub use softmax::model::SoftmaxRegression;
pub use optim::gradient_ascent::GradientAscent;
pub use train::loop_fn::train_loop;
pub use bayes::estimator::{NaiveBayesEstimator, NaiveBayesModel};
pub use eval::confusion::ConfusionMatrix;
