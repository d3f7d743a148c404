//! Directive parsing and input loading.
//!
//! This crate turns a directive file into a [`colmerge_model::Plan`] and loads
//! the CSV files it declares into Polars DataFrames.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use colmerge_ingest::{load_tables, read_directives};
//!
//! let plan = read_directives(Path::new("config.cfg"))?;
//! let tables = load_tables(&plan)?;
//! ```

mod directive;
mod error;
mod table;

// === Error Types ===
pub use error::{DirectiveError, IngestError, Result};

// === Directive Parsing ===
pub use directive::{parse_directives, read_directives};

// === Table Loading ===
pub use table::{LoadedTable, load_table, load_tables, read_raw_rows};
