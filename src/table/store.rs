use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactKind, EvalError};

use super::record::{ScoreRecord, COLUMNS};

/// Ordered score rows, one per prompt, appended and never edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    records: Vec<ScoreRecord>,
}

#[derive(Serialize, Deserialize)]
struct TableFile {
    columns: Vec<String>,
    records: Vec<ScoreRecord>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(rows: usize) -> Self {
        Self {
            records: Vec::with_capacity(rows),
        }
    }

    pub fn push(&mut self, record: ScoreRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows whose judge reply could not be scored.
    pub fn sentinel_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_sentinel()).count()
    }

    /// Writes the table to `path`, replacing any previous file in one step.
    pub fn persist(&self, path: &Path) -> Result<(), EvalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = TableFile {
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            records: self.records.clone(),
        };
        let payload = serde_json::to_vec_pretty(&file)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, path)?;
        log::info!("saved {} rows to {}", self.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let data = fs::read(path)
            .map_err(|err| EvalError::from_read(ArtifactKind::ResultTable, path, err))?;
        let file: TableFile = serde_json::from_slice(&data)?;
        let known = |c: &String| COLUMNS.contains(&c.as_str());
        if !file.columns.iter().all(known) {
            return Err(EvalError::ResponseFormatError {
                message: format!("unexpected columns in {}", path.display()),
                raw_response: file.columns.join(", "),
            });
        }
        log::info!("loaded {} rows from {}", file.records.len(), path.display());
        Ok(Self {
            records: file.records,
        })
    }
}

impl FromIterator<ScoreRecord> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ScoreRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
