//! Error taxonomy shared by the ingest and classification crates.
//!
//! Every variant is fail-fast: the component that detects it aborts the
//! current operation and hands the error straight back to the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KasboekError>;

#[derive(Debug, Error)]
pub enum KasboekError {
    #[error("cannot read {}: {}", .path.display(), .source)]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("missing columns in {bank} data: {}", .missing.join(", "))]
    SchemaMismatch { bank: String, missing: Vec<String> },

    #[error("{count} transaction date(s) could not be parsed with format {format} (first: {first:?})")]
    DateParseFailure {
        count: usize,
        first: String,
        format: String,
    },

    #[error("{count} entries in 'amount' could not be converted to numeric")]
    AmountParseFailure { count: usize },

    #[error("category already exists: {0}")]
    CategoryExists(String),

    #[error("invalid category name: {0:?}")]
    InvalidCategoryName(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("rule store: {0}")]
    RuleStore(String),
}

impl KasboekError {
    pub fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        KasboekError::FileAccess {
            path: path.into(),
            source,
        }
    }
}
