//! Error types for tabular I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing tabular files.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to open or create a file.
    #[error("failed to access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited data.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// File parsed but contained no header row.
    #[error("file has no header row: {path}")]
    EmptyTable { path: PathBuf },

    /// Failure while writing output rows.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("upload.csv"),
        };
        assert_eq!(err.to_string(), "input file not found: upload.csv");
    }
}
