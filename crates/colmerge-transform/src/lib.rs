//! Merge engine: per-file projections joined on the identifier column.

pub mod error;
pub mod merge;

pub use error::{MergeError, Result};
pub use merge::{FileContribution, MergedTable, Projection, merge_tables, project};
