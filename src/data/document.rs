use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::error::{ClassifierError, Result};

/// What to do with a term index that falls outside the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTermPolicy {
    /// Fail with `ClassifierError::UnknownTerm`.
    #[default]
    Reject,
    /// Drop the term and keep the rest of the document.
    Skip,
}

/// One bag-of-words document.
///
/// Term indices are 1-based: term `t` is vocabulary line `t` and feature
/// column `t` (column 0 is the bias).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    /// Term index -> positive count. Zero counts are never stored.
    pub terms: BTreeMap<usize, u32>,
    /// True class in `1..=K`; `None` for unlabeled partitions.
    pub label: Option<usize>,
}

impl Document {
    pub fn new(id: u64, label: Option<usize>) -> Document {
        Document { id, terms: BTreeMap::new(), label }
    }

    /// Builder-style helper; adds `count` occurrences of `term`.
    pub fn with_term(mut self, term: usize, count: u32) -> Document {
        self.add_term(term, count);
        self
    }

    pub fn add_term(&mut self, term: usize, count: u32) {
        if count > 0 {
            *self.terms.entry(term).or_insert(0) += count;
        }
    }

    /// Sum of all term counts.
    pub fn total_terms(&self) -> u64 {
        self.terms.values().map(|&c| c as u64).sum()
    }

    /// Terms that fall inside a vocabulary of `vocabulary_size` terms.
    ///
    /// Out-of-range indices are rejected or skipped according to `policy`;
    /// they are never passed through.
    pub fn known_terms(
        &self,
        vocabulary_size: usize,
        policy: UnknownTermPolicy,
    ) -> Result<Vec<(usize, u32)>> {
        let mut known = Vec::with_capacity(self.terms.len());
        for (&term, &count) in &self.terms {
            if term == 0 || term > vocabulary_size {
                match policy {
                    UnknownTermPolicy::Reject => {
                        return Err(ClassifierError::UnknownTerm { term, vocabulary_size });
                    }
                    UnknownTermPolicy::Skip => {
                        warn!(document = self.id, term, "skipping term outside vocabulary");
                        continue;
                    }
                }
            }
            known.push((term, count));
        }
        Ok(known)
    }
}

/// A predicted class for one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub document_id: u64,
    pub class: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_counts_are_not_stored() {
        let doc = Document::new(1, Some(2)).with_term(3, 0).with_term(4, 2).with_term(4, 1);
        assert_eq!(doc.terms.len(), 1);
        assert_eq!(doc.terms[&4], 3);
        assert_eq!(doc.total_terms(), 3);
    }

    #[test]
    fn unknown_terms_follow_policy() {
        let doc = Document::new(5, None).with_term(1, 1).with_term(9, 2);
        let err = doc.known_terms(4, UnknownTermPolicy::Reject).unwrap_err();
        assert!(matches!(err, ClassifierError::UnknownTerm { term: 9, vocabulary_size: 4 }));

        let kept = doc.known_terms(4, UnknownTermPolicy::Skip).unwrap();
        assert_eq!(kept, vec![(1, 1)]);
    }

    #[test]
    fn term_zero_is_unknown() {
        let doc = Document::new(1, None).with_term(0, 1);
        assert!(doc.known_terms(4, UnknownTermPolicy::Reject).is_err());
    }
}
