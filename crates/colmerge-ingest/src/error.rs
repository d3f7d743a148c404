//! Error types for directive parsing and table loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a directive file.
#[derive(Debug, Error)]
pub enum DirectiveError {
    /// Directive file not found.
    #[error("directive file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read the directive file.
    #[error("failed to read directive file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A recognized directive with the wrong shape.
    #[error("line {line}: malformed {directive} directive: {reason}")]
    Malformed {
        line: usize,
        directive: &'static str,
        reason: String,
    },

    /// `ADD-COL` or `DEL-ROW` naming a file no `FILE` directive declared.
    #[error("line {line}: {directive} references undeclared file '{file}'")]
    UnknownFile {
        line: usize,
        directive: &'static str,
        file: String,
    },
}

/// Errors that can occur while loading an input table.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Parsing Errors ===
    /// Failed to parse a CSV record.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// No rows left to promote to a header.
    #[error("CSV file is empty after row deletion: {path}")]
    EmptyCsv { path: PathBuf },

    /// Data row wider than the header row.
    #[error("row {row} of {path} has {found} fields, header has {expected}")]
    RaggedRow {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },

    // === Identifier Errors ===
    /// Declared identifier column missing from the header.
    #[error("identifier column '{column}' not found in file '{file}'")]
    IdColumnNotFound { file: String, column: String },

    /// Positional identifier past the last column.
    #[error("identifier column index {index} out of range for file '{file}' ({width} columns)")]
    IdColumnOutOfRange {
        file: String,
        index: usize,
        width: usize,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/path/to/file.csv"),
        };
        assert_eq!(err.to_string(), "CSV file not found: /path/to/file.csv");

        let err = DirectiveError::UnknownFile {
            line: 4,
            directive: "ADD-COL",
            file: "C".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "line 4: ADD-COL references undeclared file 'C'"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
