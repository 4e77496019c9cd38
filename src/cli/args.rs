//! Command line arguments, parsed with clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::bayes::smoothing::Smoothing;
use crate::logging::LogLevel;
use crate::optim::gradient_ascent::WeightRescale;
use crate::scale::scale_mode::ScaleMode;

/// Newsgroup document classifier: softmax regression and multinomial Naive Bayes
#[derive(Parser, Debug, Clone)]
#[command(name = "newsgroup-classify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ClassifyArgs {
    /// JSON run configuration; command line flags override its values
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train softmax regression by gradient ascent and predict the test rows
    Softmax(SoftmaxArgs),

    /// Estimate multinomial Naive Bayes, rank terms and predict the test rows
    Bayes(BayesArgs),
}

/// Input and output files shared by both classifiers.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// Labeled rows: training partition followed by the validation partition
    #[arg(long)]
    pub train: PathBuf,

    /// Unlabeled rows to predict
    #[arg(long)]
    pub test: PathBuf,

    /// Where to write the `id,class` predictions
    #[arg(short, long, default_value = "predictions.csv")]
    pub output: PathBuf,

    /// Write the fitted model as JSON
    #[arg(long)]
    pub save_model: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SoftmaxArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// L2 penalty
    #[arg(long)]
    pub lambda: Option<f64>,

    /// Learning rate
    #[arg(long)]
    pub eta: Option<f64>,

    /// Number of gradient steps
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Seed for the weight initialization
    #[arg(long)]
    pub seed: Option<u64>,

    /// Scaling steps in order, comma separated
    #[arg(long, value_enum, value_delimiter = ',')]
    pub scaling: Option<Vec<ScaleMode>>,

    /// Subtract this constant from every score instead of the column maximum
    #[arg(long, allow_negative_numbers = true)]
    pub shift: Option<f64>,

    /// Divide each document's scores by their spread before exponentiating
    #[arg(long, conflicts_with = "shift")]
    pub scale_scores: bool,

    /// Rescale applied to the weights after each step
    #[arg(long, value_enum)]
    pub weight_rescale: Option<WeightRescale>,
}

#[derive(Args, Debug, Clone)]
pub struct BayesArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Term names, one per line, used when reporting the ranking
    #[arg(long)]
    pub vocabulary: Option<PathBuf>,

    /// Smoothing constant: `default` (1/V) or a positive number
    #[arg(long)]
    pub beta: Option<Smoothing>,

    /// How many ranked terms to report
    #[arg(long)]
    pub top_terms: Option<usize>,

    /// Ignore out-of-vocabulary terms instead of failing
    #[arg(long)]
    pub skip_unknown: bool,
}
