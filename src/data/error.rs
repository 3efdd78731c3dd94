use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to read the house table or the boundary document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed CSV in '{}': {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed JSON in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed Parquet in '{}': {reason}", path.display())]
    Parquet { path: PathBuf, reason: String },
    #[error("failed to fetch '{url}': {reason}")]
    Network { url: String, reason: String },
    #[error("unsupported file extension for '{}'", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("'{}' has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("'{}' is not a table of records: {reason}", path.display())]
    InvalidTable { path: PathBuf, reason: String },
    #[error("invalid boundary document '{source_name}': {reason}")]
    InvalidGeometry { source_name: String, reason: String },
}

/// Failure while restricting a table for a report.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("unknown column '{0}'")]
    UnknownColumn(String),
}
