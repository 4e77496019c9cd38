use newsgroup_classify::bayes::Smoothing;
use newsgroup_classify::data::{read_documents, Document, RowSchema};
use newsgroup_classify::NaiveBayesEstimator;

fn corpus() -> Vec<Document> {
    vec![
        Document::new(1, Some(1)).with_term(1, 2).with_term(2, 1),
        Document::new(2, Some(1)).with_term(1, 1).with_term(3, 2),
        Document::new(3, Some(2)).with_term(2, 3).with_term(3, 1),
        Document::new(4, Some(2)).with_term(3, 4),
        Document::new(5, Some(2)).with_term(2, 1),
    ]
}

#[test]
fn smoothing_keeps_unseen_terms_possible() {
    let mut estimator = NaiveBayesEstimator::new(2, 3, Smoothing::Explicit(1.0)).unwrap();
    estimator.observe_all(&corpus()).unwrap();
    let model = estimator.estimate().unwrap();

    // term 1 only occurs in class 1
    let in_class = model.conditional(1, 1).unwrap();
    let elsewhere = model.conditional(1, 2).unwrap();
    assert!(elsewhere > 0.0);
    assert!(elsewhere < in_class);
}

#[test]
fn priors_sum_to_one_and_conditionals_are_distributions() {
    let mut estimator = NaiveBayesEstimator::new(2, 3, Smoothing::InverseVocabulary).unwrap();
    estimator.observe_all(&corpus()).unwrap();
    let model = estimator.estimate().unwrap();

    let prior_sum: f64 = (1..=2).map(|k| model.prior(k).unwrap()).sum();
    assert!((prior_sum - 1.0).abs() < 1e-12);
    for class in 1..=2 {
        let total: f64 = (1..=3).map(|t| model.conditional(t, class).unwrap()).sum();
        assert!((total - 1.0).abs() < 1e-12);
        for term in 1..=3 {
            let p = model.conditional(term, class).unwrap();
            assert!(p > 0.0 && p <= 1.0);
        }
    }
}

#[test]
fn ranking_puts_the_class_specific_term_first() {
    let mut estimator = NaiveBayesEstimator::new(2, 3, Smoothing::Explicit(0.01)).unwrap();
    estimator.observe_all(&corpus()).unwrap();
    let model = estimator.estimate().unwrap();

    let ranking = model.ranking();
    assert_eq!(ranking.len(), 3);
    assert_eq!(ranking.top(1), &[1]);
    let scores: Vec<f64> = ranking.top(3).iter().map(|&t| ranking.score(t).unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn trains_from_a_row_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("training.csv");
    std::fs::write(&path, "1,3,0,1\n2,0,2,2\n3,4,1,1\n").unwrap();

    let docs = read_documents(&path, &RowSchema::labeled(2, 2)).unwrap();
    let mut estimator = NaiveBayesEstimator::new(2, 2, Smoothing::Explicit(1.0)).unwrap();
    estimator.observe_all(&docs).unwrap();
    let model = estimator.estimate().unwrap();

    let predictions = model.predict(&docs).unwrap();
    let classes: Vec<usize> = predictions.iter().map(|p| p.class).collect();
    assert_eq!(classes, vec![1, 2, 1]);
}
