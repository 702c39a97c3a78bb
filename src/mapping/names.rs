use std::fs;
use std::path::Path;

use tracing::info;

use super::error::MappingError;

/// Display names in reference order; position `i` names reference index `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: Vec<String>,
}

impl NameTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Loads a JSON array of strings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MappingError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MappingError::NamesNotFound {
                path: path.to_path_buf(),
            });
        }

        let text = fs::read_to_string(path).map_err(|source| MappingError::NamesUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let names: Vec<String> =
            serde_json::from_str(&text).map_err(|source| MappingError::NamesInvalid {
                path: path.to_path_buf(),
                source,
            })?;

        info!(path = %path.display(), names = names.len(), "Loaded name table");
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }
}

impl From<Vec<String>> for NameTable {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}
