use serde::{Serialize, Deserialize};

/// Raw counts gathered for one class during accumulation.
///
/// Term vectors are indexed by `term - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    /// Training documents labeled with this class.
    pub documents: u64,
    /// Sum of every term count over those documents.
    pub total_words: u64,
    /// Per-term total count.
    pub term_counts: Vec<u64>,
    /// Per-term number of documents where the term occurs at least once.
    pub term_documents: Vec<u64>,
}

impl ClassStats {
    pub fn new(vocabulary_size: usize) -> ClassStats {
        ClassStats {
            documents: 0,
            total_words: 0,
            term_counts: vec![0; vocabulary_size],
            term_documents: vec![0; vocabulary_size],
        }
    }

    /// Adds one document given its in-vocabulary `(term, count)` pairs.
    pub fn add_document(&mut self, terms: &[(usize, u32)]) {
        self.documents += 1;
        for &(term, count) in terms {
            if count == 0 {
                continue;
            }
            self.term_counts[term - 1] += count as u64;
            self.term_documents[term - 1] += 1;
            self.total_words += count as u64;
        }
    }

    /// Whether `term` occurred in at least one document of the class.
    pub fn has_term(&self, term: usize) -> bool {
        term.checked_sub(1)
            .and_then(|t| self.term_documents.get(t))
            .is_some_and(|&docs| docs > 0)
    }
}
