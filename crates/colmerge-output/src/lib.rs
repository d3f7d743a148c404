//! Output generation for merged tables.
//!
//! The merged table is written as delimited text: one header row, one line
//! per row, missing values as empty fields and no index column.

mod csv;

pub use csv::{WriteOptions, ensure_parent_dir, write_csv, write_csv_to};
