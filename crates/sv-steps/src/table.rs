use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sv_runtime::ScopeHandle;

use crate::error::StepError;

/// Cell grid handed to a step: a header row plus data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTable {
    #[serde(default)]
    pub header: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl StepTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    pub fn from_cells<S: AsRef<str>>(header: &[S], rows: &[Vec<S>]) -> Self {
        Self {
            header: header.iter().map(|cell| cell.as_ref().to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.as_ref().to_string()).collect())
                .collect(),
        }
    }

    /// Header cells as a list. The table must not have data rows.
    pub fn to_sequence(&self, scope: &ScopeHandle) -> Result<Vec<String>, StepError> {
        if !self.rows.is_empty() {
            return Err(StepError::InvalidTable {
                message: format!(
                    "a list table has a single row, found {} extra",
                    self.rows.len()
                ),
            });
        }
        let cells = self
            .header
            .iter()
            .map(|cell| scope.resolve_or_literal(cell))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cells)
    }

    /// Header cells as keys, the single data row as values.
    pub fn to_mapping(&self, scope: &ScopeHandle) -> Result<IndexMap<String, String>, StepError> {
        let [values] = self.rows.as_slice() else {
            return Err(StepError::InvalidTable {
                message: format!(
                    "a dictionary table has one row of values, found {}",
                    self.rows.len()
                ),
            });
        };
        if values.len() != self.header.len() {
            return Err(StepError::InvalidTable {
                message: format!(
                    "{} keys but {} values",
                    self.header.len(),
                    values.len()
                ),
            });
        }
        let mut entries = IndexMap::with_capacity(values.len());
        for (key, value) in self.header.iter().zip(values) {
            let key = scope.resolve_or_literal(key)?;
            if entries.contains_key(&key) {
                return Err(StepError::InvalidTable {
                    message: format!("duplicate key \"{}\"", key),
                });
            }
            entries.insert(key, scope.resolve_or_literal(value)?);
        }
        Ok(entries)
    }
}
