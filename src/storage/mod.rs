//! Durable outputs: top-k archives and JSON reports.
//!
//! Every write goes to a temporary sibling first and is renamed into place.
//! A partially written output never appears under its final name.

pub mod error;
pub mod json;
pub mod results;

#[cfg(test)]
mod tests;

pub use error::{StorageError, StorageResult};
pub use json::{ensure_parent_dir, write_json_atomic};
pub use results::{read_top_k, write_top_k};
