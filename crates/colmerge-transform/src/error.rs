use thiserror::Error;

/// Errors raised while projecting and joining loaded tables.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("line {line}: file '{file}' was not loaded")]
    UnknownFile { file: String, line: usize },

    #[error("line {line}: file '{file}' has no identifier column to join on")]
    MissingIdentifier { file: String, line: usize },

    #[error("line {line}: column '{column}' not found in file '{file}'")]
    ColumnNotFound {
        file: String,
        column: String,
        line: usize,
    },

    #[error("line {line}: column index {index} out of range for file '{file}' ({width} columns)")]
    ColumnIndexOutOfRange {
        file: String,
        index: usize,
        width: usize,
        line: usize,
    },

    #[error("line {line}: output column '{target}' of file '{file}' is produced more than once")]
    DuplicateTarget {
        file: String,
        target: String,
        line: usize,
    },

    #[error("line {line}: suffixing column '{column}' of file '{file}' clashes with an existing column")]
    SuffixCollision {
        file: String,
        column: String,
        line: usize,
    },

    #[error("no ADD-COL directives, nothing to merge")]
    NothingToMerge,

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for MergeError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
