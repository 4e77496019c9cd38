/// Parsing of comma-delimited document rows.
///
/// Row layout: `documentId, term_1_count, ..., term_V_count, classLabel`.
/// Every count is a non-negative integer; only positive counts are kept.
/// Unlabeled partitions may leave out the trailing label field or carry a
/// placeholder there, which is then ignored.

use crate::data::document::Document;
use crate::error::{ClassifierError, Result};

/// How the trailing label field is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelField {
    /// The row must end with a label in `1..=n_classes`.
    Required,
    /// The label may be missing or a placeholder; it is not read.
    Ignored,
}

/// Fixed shape every row is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSchema {
    pub n_terms: usize,
    pub n_classes: usize,
    pub label: LabelField,
}

impl RowSchema {
    pub fn labeled(n_terms: usize, n_classes: usize) -> RowSchema {
        RowSchema { n_terms, n_classes, label: LabelField::Required }
    }

    pub fn unlabeled(n_terms: usize, n_classes: usize) -> RowSchema {
        RowSchema { n_terms, n_classes, label: LabelField::Ignored }
    }

    /// Field count of a complete row: id, V counts, label.
    pub fn full_width(&self) -> usize {
        self.n_terms + 2
    }
}

/// Parses one row. `row_num` is 1-based and only used in error messages.
pub fn parse_row(line: &str, schema: &RowSchema, row_num: usize) -> Result<Document> {
    let cells: Vec<&str> = line.trim().split(',').collect();
    let full = schema.full_width();

    let width_ok = match schema.label {
        LabelField::Required => cells.len() == full,
        LabelField::Ignored => cells.len() == full || cells.len() == full - 1,
    };
    if !width_ok {
        return Err(ClassifierError::malformed_row(row_num, format!(
            "expected {} fields, got {}", full, cells.len()
        )));
    }

    let id: u64 = cells[0].trim().parse().map_err(|_| {
        ClassifierError::malformed_row(row_num, format!(
            "document id '{}' is not a non-negative integer", cells[0]
        ))
    })?;

    let label = match schema.label {
        LabelField::Required => Some(parse_label(cells[full - 1], schema.n_classes, row_num)?),
        LabelField::Ignored => None,
    };

    let mut doc = Document::new(id, label);
    for (term, cell) in cells[1..=schema.n_terms].iter().enumerate() {
        let count: u32 = cell.trim().parse().map_err(|_| {
            ClassifierError::malformed_row(row_num, format!(
                "count '{}' for term {} is not a non-negative integer", cell, term + 1
            ))
        })?;
        doc.add_term(term + 1, count);
    }

    Ok(doc)
}

fn parse_label(cell: &str, n_classes: usize, row_num: usize) -> Result<usize> {
    let label: usize = cell.trim().parse().map_err(|_| {
        ClassifierError::malformed_row(row_num, format!("class label '{}' is not an integer", cell))
    })?;
    if label == 0 || label > n_classes {
        return Err(ClassifierError::malformed_row(row_num, format!(
            "class label {} is outside 1..={}", label, n_classes
        )));
    }
    Ok(label)
}
