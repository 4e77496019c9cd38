use tracing::debug;

use crate::data::document::{Document, UnknownTermPolicy};
use crate::data::row::{parse_row, RowSchema};
use crate::error::{ClassifierError, Result};
use crate::math::matrix::Matrix;
use crate::math::sparse::{csr_from_rows, SparseColumns};
use sprs::CsMat;

/// Document x feature matrix for one partition.
///
/// Column 0 is the bias and holds exactly 1 for every row; column `t` holds
/// term `t`. Values are kept sparse. Column-wise affine transforms are
/// stored as a per-column offset so the effective value of a cell is
/// `stored + offset[col]`; the bias column never gets an offset.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_terms: usize,
    values: CsMat<f64>,
    offsets: Vec<f64>,
    document_ids: Vec<u64>,
    labels: Vec<Option<usize>>,
}

impl FeatureMatrix {
    /// Builds the matrix from parsed documents, in order.
    pub fn from_documents(
        documents: &[Document],
        n_terms: usize,
        policy: UnknownTermPolicy,
    ) -> Result<FeatureMatrix> {
        let mut rows = Vec::with_capacity(documents.len());
        let mut document_ids = Vec::with_capacity(documents.len());
        let mut labels = Vec::with_capacity(documents.len());

        for doc in documents {
            let mut row = Vec::with_capacity(doc.terms.len() + 1);
            row.push((0, 1.0));
            for (term, count) in doc.known_terms(n_terms, policy)? {
                row.push((term, count as f64));
            }
            rows.push(row);
            document_ids.push(doc.id);
            labels.push(doc.label);
        }

        let values = csr_from_rows(&rows, n_terms + 1)?;
        debug!(documents = values.rows(), stored = values.nnz(), "built feature matrix");

        Ok(FeatureMatrix {
            n_terms,
            values,
            offsets: vec![0.0; n_terms + 1],
            document_ids,
            labels,
        })
    }

    /// Parses every row against `schema` and builds the matrix. The first
    /// malformed row aborts the load.
    pub fn load<I, S>(rows: I, schema: &RowSchema) -> Result<FeatureMatrix>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let documents = rows.into_iter()
            .enumerate()
            .map(|(i, line)| parse_row(line.as_ref(), schema, i + 1))
            .collect::<Result<Vec<_>>>()?;
        // Rows carry exactly V positional counts, so every term is known.
        FeatureMatrix::from_documents(&documents, schema.n_terms, UnknownTermPolicy::Reject)
    }

    pub fn n_documents(&self) -> usize {
        self.values.rows()
    }

    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    /// Number of columns including the bias.
    pub fn n_features(&self) -> usize {
        self.n_terms + 1
    }

    pub fn document_ids(&self) -> &[u64] {
        &self.document_ids
    }

    /// True labels of every row; fails if any row is unlabeled.
    pub fn labels(&self) -> Result<Vec<usize>> {
        self.labels.iter()
            .map(|label| label.ok_or(ClassifierError::MissingLabels))
            .collect()
    }

    /// Effective value of one cell.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values.get(row, col).copied().unwrap_or(0.0) + self.offsets[col]
    }

    pub fn has_offsets(&self) -> bool {
        self.offsets.iter().any(|&o| o != 0.0)
    }

    pub(crate) fn stored(&self) -> &CsMat<f64> {
        &self.values
    }

    pub(crate) fn stored_mut(&mut self) -> &mut CsMat<f64> {
        &mut self.values
    }

    pub(crate) fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Applies `x -> scale[c] * x + shift[c]` to every column `c > 0`.
    pub(crate) fn apply_affine(&mut self, scale: &[f64], shift: &[f64]) {
        self.values.map_stored(|_, c, v| if c == 0 { v } else { v * scale[c] });
        for c in 1..self.offsets.len() {
            self.offsets[c] = self.offsets[c] * scale[c] + shift[c];
        }
    }

    /// Raw class scores `weights · Xᵗ` with shape `K × N`.
    pub fn scores(&self, weights: &Matrix) -> Result<Matrix> {
        if weights.cols != self.n_features() {
            return Err(ClassifierError::shape_mismatch(format!(
                "weights have {} columns, features have {}", weights.cols, self.n_features()
            )));
        }
        let mut scores = self.values.mul_transposed_by(weights);
        if self.has_offsets() {
            for (k, row) in scores.data.iter_mut().enumerate() {
                let shift: f64 = weights.data[k].iter()
                    .zip(self.offsets.iter())
                    .map(|(w, o)| w * o)
                    .sum();
                row.iter_mut().for_each(|s| *s += shift);
            }
        }
        Ok(scores)
    }

    /// `residual · X` with shape `K × (V+1)`, where `residual` is `K × N`.
    pub fn left_product(&self, residual: &Matrix) -> Result<Matrix> {
        if residual.cols != self.n_documents() {
            return Err(ClassifierError::shape_mismatch(format!(
                "residual has {} columns, partition has {} documents",
                residual.cols, self.n_documents()
            )));
        }
        let mut product = self.values.left_mul_by(residual);
        if self.has_offsets() {
            for (k, row) in product.data.iter_mut().enumerate() {
                let total: f64 = residual.data[k].iter().sum();
                for (out, o) in row.iter_mut().zip(self.offsets.iter()) {
                    *out += total * o;
                }
            }
        }
        Ok(product)
    }
}
