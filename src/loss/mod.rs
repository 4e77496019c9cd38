pub mod log_likelihood;

pub use log_likelihood::{indicator_matrix, LogLikelihood};
