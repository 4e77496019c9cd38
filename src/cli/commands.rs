//! Command implementations.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::bayes::estimator::NaiveBayesEstimator;
use crate::cli::args::{BayesArgs, ClassifyArgs, Command, SoftmaxArgs};
use crate::config::RunConfig;
use crate::data::dataset::{read_documents, split_partitions, write_predictions, Vocabulary};
use crate::data::document::{Document, UnknownTermPolicy};
use crate::data::feature_matrix::FeatureMatrix;
use crate::data::row::RowSchema;
use crate::error::Result;
use crate::eval::confusion::ConfusionMatrix;
use crate::optim::gradient_ascent::GradientAscent;
use crate::scale::scaler::Scaler;
use crate::softmax::model::SoftmaxRegression;
use crate::softmax::stabilize::Stabilizer;
use crate::train::loop_fn::train_loop;
use crate::train::train_config::TrainConfig;

/// Execute a CLI command.
pub fn execute_command(args: ClassifyArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => RunConfig::load_json(&path.to_string_lossy())?,
        None => RunConfig::default(),
    };
    match &args.command {
        Command::Softmax(softmax_args) => run_softmax(softmax_args, config),
        Command::Bayes(bayes_args) => run_bayes(bayes_args, config),
    }
}

/// Folds command line overrides into the softmax section of `config`.
fn apply_softmax_overrides(args: &SoftmaxArgs, config: &mut RunConfig) {
    let s = &mut config.softmax;
    if let Some(lambda) = args.lambda {
        s.lambda = lambda;
    }
    if let Some(eta) = args.eta {
        s.eta = eta;
    }
    if let Some(iterations) = args.iterations {
        s.iterations = iterations;
    }
    if args.seed.is_some() {
        s.seed = args.seed;
    }
    if let Some(scaling) = &args.scaling {
        s.scaling = scaling.clone();
    }
    if let Some(shift) = args.shift {
        s.stabilizer = Stabilizer::FixedShift { shift };
    }
    if args.scale_scores {
        s.stabilizer = Stabilizer::ScaleColumn;
    }
    if let Some(rescale) = args.weight_rescale {
        s.weight_rescale = rescale;
    }
}

fn apply_bayes_overrides(args: &BayesArgs, config: &mut RunConfig) {
    let b = &mut config.bayes;
    if let Some(beta) = args.beta {
        b.beta = beta;
    }
    if let Some(top) = args.top_terms {
        b.top_terms = top;
    }
    if args.skip_unknown {
        b.unknown_terms = UnknownTermPolicy::Skip;
    }
}

/// Reads the labeled file and cuts it into training and validation rows,
/// then reads the unlabeled test rows.
fn load_partitions(train: &Path, test: &Path, config: &RunConfig) -> Result<(Vec<Document>, Vec<Document>, Vec<Document>)> {
    let shape = &config.dataset;
    let labeled = read_documents(train, &RowSchema::labeled(shape.n_terms, shape.n_classes))?;
    let split = split_partitions(labeled, shape)?;
    let test_docs = read_documents(test, &RowSchema::unlabeled(shape.n_terms, shape.n_classes))?;
    info!(
        train = split.train.len(),
        validation = split.validation.len(),
        test = test_docs.len(),
        "loaded partitions"
    );
    Ok((split.train, split.validation, test_docs))
}

fn run_softmax(args: &SoftmaxArgs, mut config: RunConfig) -> Result<()> {
    apply_softmax_overrides(args, &mut config);
    config.validate()?;
    let shape = config.dataset.clone();
    let s = config.softmax.clone();

    let (train_docs, val_docs, test_docs) = load_partitions(&args.data.train, &args.data.test, &config)?;
    let policy = UnknownTermPolicy::Reject;

    // ── Features ──────────────────────────────────────────────────────────
    let train_raw = FeatureMatrix::from_documents(&train_docs, shape.n_terms, policy)?;
    let (train, scaler) = Scaler::fit_transform(train_raw, &s.scaling)?;
    let validation = scaler.transform(FeatureMatrix::from_documents(&val_docs, shape.n_terms, policy)?)?;
    let test = scaler.transform(FeatureMatrix::from_documents(&test_docs, shape.n_terms, policy)?)?;

    // ── Model ─────────────────────────────────────────────────────────────
    let mut rng = match s.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut model = SoftmaxRegression::new(shape.n_classes, shape.n_terms)?.with_stabilizer(s.stabilizer);
    model.initialize(&mut rng)?;

    let optimizer = GradientAscent::new(s.eta, s.lambda)?;
    let train_config = TrainConfig {
        iterations: s.iterations,
        weight_rescale: s.weight_rescale,
        log_every: s.log_every,
        progress_tx: None,
    };

    let t_start = Instant::now();
    let history = train_loop(&mut model, &train, Some(&validation), &optimizer, &train_config)?;
    if let Some(last) = history.last() {
        info!(
            iterations = last.iteration,
            log_likelihood = last.log_likelihood,
            train_accuracy = last.train_accuracy,
            val_accuracy = ?last.val_accuracy,
            elapsed_s = t_start.elapsed().as_secs_f64(),
            "training finished"
        );
    }

    // ── Report ────────────────────────────────────────────────────────────
    let val_predicted = model.predict_classes(&validation)?;
    let confusion = ConfusionMatrix::from_predictions(&val_predicted, &validation.labels()?, shape.n_classes)?;
    println!("Validation accuracy: {:.4}", confusion.accuracy());
    println!("{confusion}");

    let predictions = model.predict(&test)?;
    write_predictions(&args.data.output, &predictions)?;
    info!(path = %args.data.output.display(), rows = predictions.len(), "wrote predictions");

    if let Some(path) = &args.data.save_model {
        model.save_json(&path.to_string_lossy())?;
        info!(path = %path.display(), "saved model");
    }
    Ok(())
}

fn run_bayes(args: &BayesArgs, mut config: RunConfig) -> Result<()> {
    apply_bayes_overrides(args, &mut config);
    config.validate()?;
    let shape = config.dataset.clone();
    let b = config.bayes.clone();

    let (train_docs, val_docs, test_docs) = load_partitions(&args.data.train, &args.data.test, &config)?;

    let mut estimator = NaiveBayesEstimator::new(shape.n_classes, shape.n_terms, b.beta)?
        .with_unknown_terms(b.unknown_terms);
    estimator.observe_all(&train_docs)?;
    let model = estimator.estimate()?;

    // ── Ranking ───────────────────────────────────────────────────────────
    let vocabulary = match &args.vocabulary {
        Some(path) => {
            let vocabulary = Vocabulary::load(path)?;
            if vocabulary.len() != shape.n_terms {
                warn!(expected = shape.n_terms, found = vocabulary.len(), "vocabulary size differs from term count");
            }
            vocabulary
        }
        None => Vocabulary::default(),
    };
    println!("Top {} terms by mutual information:", b.top_terms.min(model.ranking().len()));
    for (rank, &term) in model.ranking().top(b.top_terms).iter().enumerate() {
        let score = model.ranking().score(term).unwrap_or(f64::NAN);
        match vocabulary.term(term) {
            Some(name) => println!("{:>4}. {name} ({term}) {score:.6}", rank + 1),
            None => println!("{:>4}. {term} {score:.6}", rank + 1),
        }
    }

    // ── Validation ────────────────────────────────────────────────────────
    let mut confusion = ConfusionMatrix::new(shape.n_classes);
    for doc in &val_docs {
        if let Some(label) = doc.label {
            confusion.record(label, model.classify(doc)?)?;
        }
    }
    println!("Validation accuracy: {:.4}", confusion.accuracy());
    println!("{confusion}");

    let predictions = model.predict(&test_docs)?;
    write_predictions(&args.data.output, &predictions)?;
    info!(path = %args.data.output.display(), rows = predictions.len(), "wrote predictions");

    if let Some(path) = &args.data.save_model {
        model.save_json(&path.to_string_lossy())?;
        info!(path = %path.display(), "saved model");
    }
    Ok(())
}
