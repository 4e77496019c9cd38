use rand::rngs::StdRng;
use rand::SeedableRng;

use newsgroup_classify::data::{Document, RowSchema, UnknownTermPolicy};
use newsgroup_classify::ClassifierError;
use newsgroup_classify::math::Matrix;
use newsgroup_classify::scale::{ScaleMode, Scaler};
use newsgroup_classify::softmax::{predicted_classes, softmax_columns, ModelState, Stabilizer};
use newsgroup_classify::train::TrainConfig;
use newsgroup_classify::{train_loop, FeatureMatrix, GradientAscent, SoftmaxRegression};

fn two_disjoint_documents() -> FeatureMatrix {
    FeatureMatrix::load(vec!["1,3,0,1", "2,0,3,2"], &RowSchema::labeled(2, 3)).unwrap()
}

#[test]
fn learns_each_training_document_with_high_confidence() {
    let train = two_disjoint_documents();
    let mut rng = StdRng::seed_from_u64(42);
    let mut model = SoftmaxRegression::new(3, 2).unwrap();
    model.initialize(&mut rng).unwrap();

    let optimizer = GradientAscent::new(0.1, 0.001).unwrap();
    let mut config = TrainConfig::new(2000);
    config.log_every = 0;
    let history = train_loop(&mut model, &train, None, &optimizer, &config).unwrap();

    assert_eq!(history.len(), 2000);
    assert_eq!(model.state(), ModelState::Stopped);
    let probs = model.probabilities(&train).unwrap();
    assert!(probs.get(0, 0) > 0.9, "P(1 | doc 1) = {}", probs.get(0, 0));
    assert!(probs.get(1, 1) > 0.9, "P(2 | doc 2) = {}", probs.get(1, 1));
    assert_eq!(model.predict_classes(&train).unwrap(), vec![1, 2]);
}

#[test]
fn zero_step_leaves_weights_unchanged() {
    let train = two_disjoint_documents();
    let mut rng = StdRng::seed_from_u64(1);
    let mut model = SoftmaxRegression::new(3, 2).unwrap();
    model.initialize(&mut rng).unwrap();
    let before = model.weights().clone();

    let optimizer = GradientAscent::new(0.0, 0.0).unwrap();
    train_loop(&mut model, &train, None, &optimizer, &TrainConfig::new(3)).unwrap();

    assert_eq!(model.weights(), &before);
    assert_eq!(model.iteration(), 3);
}

#[test]
fn probability_columns_sum_to_one() {
    let train = FeatureMatrix::load(
        vec!["1,5,0,2,1", "2,0,7,1,2", "3,1,1,1,3", "4,9,0,0,1"],
        &RowSchema::labeled(3, 3),
    ).unwrap();
    let (train, _) = Scaler::fit_transform(train, &[ScaleMode::TfIdf, ScaleMode::Standardize]).unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let mut model = SoftmaxRegression::new(3, 3).unwrap();
    model.initialize(&mut rng).unwrap();

    let probs = model.probabilities(&train).unwrap();
    for n in 0..probs.cols {
        assert!((probs.column_sum(n) - 1.0).abs() < 1e-9);
        assert!(probs.column(n).iter().all(|p| (0.0..=1.0).contains(p)));
    }
}

#[test]
fn prediction_is_invariant_under_monotonic_score_transforms() {
    let scores = Matrix::from_data(vec![
        vec![0.3, -2.0, 5.0, 1.0],
        vec![1.7, -1.0, 4.0, 1.0],
        vec![0.9, -3.0, 4.5, 0.2],
    ]);
    let shifted = scores.map(|x| 3.0 * x + 10.0);
    let raw = softmax_columns(scores.clone(), Stabilizer::default()).probabilities;
    let moved = softmax_columns(shifted, Stabilizer::default()).probabilities;

    let direct: Vec<usize> = (0..scores.cols).map(|n| scores.argmax_column(n) + 1).collect();
    assert_eq!(predicted_classes(&raw), direct);
    assert_eq!(predicted_classes(&moved), direct);
    // ties resolve to the lowest class
    assert_eq!(direct[3], 1);
}

#[test]
fn prediction_is_invariant_under_monotonic_probability_transforms() {
    let scores = Matrix::from_data(vec![
        vec![0.3, -2.0, 5.0, 1.0, 40.0],
        vec![1.7, -1.0, 4.0, 1.0, -40.0],
        vec![0.9, -3.0, 4.5, 0.2, 0.0],
    ]);
    let probabilities = softmax_columns(scores, Stabilizer::default()).probabilities;
    let expected = predicted_classes(&probabilities);
    assert_eq!(expected, vec![2, 2, 1, 1, 1]);

    let cubed = probabilities.map(|p| p.powi(3));
    let logged = probabilities.map(|p| p.ln());
    let squashed = probabilities.map(|p| p / (1.0 + p));
    assert_eq!(predicted_classes(&cubed), expected);
    assert_eq!(predicted_classes(&logged), expected);
    assert_eq!(predicted_classes(&squashed), expected);
}

#[test]
fn overflowing_fixed_shift_keeps_a_distribution() {
    let model = SoftmaxRegression::with_weights(Matrix::from_data(vec![
        vec![0.0, 709.5],
        vec![0.0, 709.5],
        vec![0.0, 709.0],
    ])).unwrap().with_stabilizer(Stabilizer::FixedShift { shift: 0.0 });
    let features = FeatureMatrix::load(vec!["1,1,1"], &RowSchema::labeled(1, 3)).unwrap();

    let probs = model.probabilities(&features).unwrap();
    assert!((probs.column_sum(0) - 1.0).abs() < 1e-9);
    assert!(probs.column(0).iter().all(|p| p.is_finite() && *p > 0.0));
    assert!((probs.get(0, 0) - probs.get(1, 0)).abs() < 1e-12);
    assert!(probs.get(2, 0) < probs.get(0, 0));
    assert_eq!(model.predict_classes(&features).unwrap(), vec![1]);
}

#[test]
fn unknown_terms_follow_the_policy_in_the_softmax_path() {
    let docs = vec![
        Document::new(1, Some(1)).with_term(1, 2).with_term(5, 3),
        Document::new(2, Some(2)).with_term(2, 1),
    ];
    let err = FeatureMatrix::from_documents(&docs, 2, UnknownTermPolicy::Reject).unwrap_err();
    assert!(matches!(err, ClassifierError::UnknownTerm { term: 5, vocabulary_size: 2 }));

    let features = FeatureMatrix::from_documents(&docs, 2, UnknownTermPolicy::Skip).unwrap();
    assert_eq!(features.n_features(), 3);
    assert_eq!(features.value(0, 1), 2.0);
    assert_eq!(features.value(0, 2), 0.0);
    assert_eq!(features.value(1, 2), 1.0);

    let model = SoftmaxRegression::with_weights(Matrix::zeros(2, 3)).unwrap();
    assert_eq!(model.predict_classes(&features).unwrap().len(), 2);
}

#[test]
fn empty_document_survives_scaling_and_scoring() {
    // document 1 has no terms; term 2 never occurs
    let train = FeatureMatrix::load(
        vec!["1,0,0,0,1", "2,2,0,1,2", "3,1,0,4,1"],
        &RowSchema::labeled(3, 2),
    ).unwrap();
    let (train, _) = Scaler::fit_transform(train, &[ScaleMode::TfIdf, ScaleMode::ColumnNormalize]).unwrap();
    for r in 0..train.n_documents() {
        for c in 0..train.n_features() {
            assert!(train.value(r, c).is_finite());
        }
    }
    assert_eq!(train.value(0, 1), 0.0);
    assert_eq!(train.value(1, 2), 0.0);

    let model = SoftmaxRegression::with_weights(Matrix::from_data(vec![
        vec![0.0, 1.0, 1.0, 1.0],
        vec![0.0, 1.0, 1.0, 1.0],
    ])).unwrap();
    let classes = model.predict_classes(&train).unwrap();
    assert_eq!(classes.len(), 3);
}

#[test]
fn underflowing_exponentials_leave_a_zero_column() {
    let scores = Matrix::from_data(vec![vec![0.0, 1.0], vec![0.5, 2.0]]);
    let out = softmax_columns(scores, Stabilizer::FixedShift { shift: 1.0e6 });
    assert_eq!(out.zero_columns, 2);
    assert!(out.probabilities.data.iter().flatten().all(|p| *p == 0.0));
    assert_eq!(predicted_classes(&out.probabilities), vec![1, 1]);
}
