pub mod metrics;
pub mod confusion;

pub use metrics::accuracy;
pub use confusion::ConfusionMatrix;
