//! Mutual-information ranking of vocabulary terms.
//!
//! For each term and class the four joint cells (term present/absent ×
//! class/not class) contribute `P(x,y) · log2((P(x,y) + β) / (P(x)·P(y) + β))`.
//! The per-class sums are weighted by the class prior and added up, giving
//! one score per term. Terms are then ordered by descending score.

use std::cmp::Ordering;

use serde::{Serialize, Deserialize};

use crate::bayes::class_stats::ClassStats;

/// Immutable snapshot of per-term scores and their ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermRanking {
    /// Score of term `t` at index `t - 1`.
    scores: Vec<f64>,
    /// 1-based term indices, best first. Equal scores keep index order.
    order: Vec<usize>,
}

impl TermRanking {
    /// Scores every term from per-class document-occurrence counts.
    ///
    /// `priors[j]` is the prior of class `j + 1`; `beta` keeps every
    /// logarithm finite.
    pub fn compute(stats: &[ClassStats], priors: &[f64], beta: f64) -> TermRanking {
        let vocabulary_size = stats.first().map_or(0, |s| s.term_documents.len());
        let total_docs: u64 = stats.iter().map(|s| s.documents).sum();
        let n = total_docs.max(1) as f64;

        let scores: Vec<f64> = (0..vocabulary_size)
            .map(|t| {
                let present: u64 = stats.iter().map(|s| s.term_documents[t]).sum();
                let p_present = present as f64 / n;
                let p_absent = 1.0 - p_present;

                stats.iter().zip(priors.iter())
                    .map(|(class, &prior)| {
                        let in_class = class.term_documents[t];
                        let n11 = in_class as f64;
                        let n01 = (class.documents - in_class) as f64;
                        let n10 = (present - in_class) as f64;
                        let n00 = (total_docs - class.documents) as f64 - n10;

                        let cell = |joint: f64, px: f64, py: f64| {
                            let p_xy = joint / n;
                            p_xy * ((p_xy + beta) / (px * py + beta)).log2()
                        };
                        let mi = cell(n00, p_absent, 1.0 - prior)
                            + cell(n01, p_absent, prior)
                            + cell(n10, p_present, 1.0 - prior)
                            + cell(n11, p_present, prior);
                        prior * mi
                    })
                    .sum()
            })
            .collect();

        let mut order: Vec<usize> = (1..=vocabulary_size).collect();
        // Stable sort: ties stay in term-index order.
        order.sort_by(|&a, &b| scores[b - 1].partial_cmp(&scores[a - 1]).unwrap_or(Ordering::Equal));

        TermRanking { scores, order }
    }

    /// Score of a 1-based term index.
    pub fn score(&self, term: usize) -> Option<f64> {
        term.checked_sub(1).and_then(|i| self.scores.get(i)).copied()
    }

    /// The `n` best terms, best first.
    pub fn top(&self, n: usize) -> &[usize] {
        &self.order[..n.min(self.order.len())]
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
