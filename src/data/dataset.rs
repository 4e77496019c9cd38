use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::config::DatasetShape;
use crate::data::document::{Document, Prediction};
use crate::data::row::{parse_row, RowSchema};
use crate::error::{ClassifierError, Result};

/// Reads every non-empty line of a row file into documents.
pub fn read_documents<P: AsRef<Path>>(path: P, schema: &RowSchema) -> Result<Vec<Document>> {
    let path = path.as_ref();
    info!(path = %path.display(), "reading documents");
    let reader = BufReader::new(File::open(path)?);

    let mut documents = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc = parse_row(&line, schema, i + 1)?;
        if doc.id % 1000 == 0 {
            debug!(document = doc.id, "read document");
        }
        documents.push(doc);
    }
    Ok(documents)
}

/// Training and validation documents taken from the head of one file.
#[derive(Debug, Clone)]
pub struct LabeledSplit {
    pub train: Vec<Document>,
    pub validation: Vec<Document>,
}

/// Splits labeled rows in file order: the first `train_docs` rows train,
/// the next `validation_docs` rows validate. Extra rows are ignored.
pub fn split_partitions(mut documents: Vec<Document>, shape: &DatasetShape) -> Result<LabeledSplit> {
    let needed = shape.train_docs + shape.validation_docs;
    if documents.len() < needed {
        return Err(ClassifierError::shape_mismatch(format!(
            "expected at least {} labeled rows ({} train + {} validation), found {}",
            needed, shape.train_docs, shape.validation_docs, documents.len()
        )));
    }
    documents.truncate(needed);
    let validation = documents.split_off(shape.train_docs);
    Ok(LabeledSplit { train: documents, validation })
}

/// Term names indexed by 1-based term number.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn from_terms(terms: Vec<String>) -> Vocabulary {
        Vocabulary { terms }
    }

    /// Loads one term per line; line `t` names term `t`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vocabulary> {
        let reader = BufReader::new(File::open(path)?);
        let terms = reader.lines()
            .map(|line| line.map(|l| l.trim_end().to_string()))
            .collect::<std::io::Result<Vec<_>>>()?;
        Ok(Vocabulary { terms })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        index.checked_sub(1)
            .and_then(|i| self.terms.get(i))
            .map(|s| s.as_str())
    }
}

/// Writes predictions as `id,class` CSV, one line per document in order.
pub fn write_predictions<P: AsRef<Path>>(path: P, predictions: &[Prediction]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "id,class")?;
    for p in predictions {
        writeln!(writer, "{},{}", p.document_id, p.class)?;
    }
    writer.flush()?;
    Ok(())
}
