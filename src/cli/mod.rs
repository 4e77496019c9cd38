//! Command line interface.

pub mod args;
pub mod commands;

pub use args::{BayesArgs, ClassifyArgs, Command, DataArgs, SoftmaxArgs};
pub use commands::execute_command;
