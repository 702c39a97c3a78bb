use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ranking::TopKResults;
use crate::storage::write_json_atomic;

use super::error::MappingError;
use super::names::NameTable;

/// One resolved match in the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub name: String,
    pub similarity_score: f32,
}

/// Resolves ranked reference indices to display names.
#[derive(Debug, Clone, Copy)]
pub struct ResultMapper<'a> {
    names: &'a NameTable,
}

impl<'a> ResultMapper<'a> {
    pub fn new(names: &'a NameTable) -> Self {
        Self { names }
    }

    /// Fails with the first out-of-range index, in role order.
    pub fn check_bounds(&self, results: &TopKResults) -> Result<(), MappingError> {
        let table_len = self.names.len();
        for (role, row) in results.rows().enumerate() {
            if let Some(hit) = row.iter().find(|h| h.index >= table_len) {
                return Err(MappingError::IndexOutOfBounds {
                    role,
                    index: hit.index,
                    table_len,
                });
            }
        }
        Ok(())
    }

    /// Maps every role's hits to `{name, similarity_score}` records,
    /// preserving role order and hit order.
    ///
    /// Any out-of-range index fails the whole mapping; nothing partial is returned.
    pub fn map(&self, results: &TopKResults) -> Result<Vec<Vec<MatchRecord>>, MappingError> {
        self.check_bounds(results)?;

        let mapped = results
            .rows()
            .enumerate()
            .map(|(role, row)| {
                row.iter()
                    .map(|hit| -> Result<MatchRecord, MappingError> {
                        let name = self.names.get(hit.index).ok_or_else(|| {
                            MappingError::IndexOutOfBounds {
                                role,
                                index: hit.index,
                                table_len: self.names.len(),
                            }
                        })?;
                        Ok(MatchRecord {
                            name: name.to_string(),
                            similarity_score: hit.score,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(mapped)
    }

    /// Maps `results` and writes them as JSON to `output`, creating directories.
    pub fn map_to_file(
        &self,
        results: &TopKResults,
        output: &Path,
    ) -> Result<Vec<Vec<MatchRecord>>, MappingError> {
        let mapped = self.map(results)?;
        write_json_atomic(output, &mapped)?;

        info!(
            path = %output.display(),
            roles = mapped.len(),
            "Saved mapped results"
        );
        for (i, row) in mapped.iter().take(2).enumerate() {
            for record in row {
                debug!(
                    role = i,
                    name = %record.name,
                    score = record.similarity_score,
                    "Sample match"
                );
            }
        }
        Ok(mapped)
    }
}
