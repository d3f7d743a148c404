//! The parsed merge plan.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::column::{ColumnDirective, ColumnRef};

/// A `FILE` directive: one input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpec {
    pub name: String,
    pub path: PathBuf,
    /// Join key column. `None` when the directive did not declare one.
    pub id_column: Option<ColumnRef>,
    /// 1-based line of the directive.
    pub line: usize,
}

/// An `ADD-COL` directive: ordered columns to take from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddColumns {
    pub file: String,
    pub directives: Vec<ColumnDirective>,
    pub line: usize,
}

/// A `DEL-ROW` directive: raw row indices to drop before header promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRows {
    pub file: String,
    pub rows: Vec<usize>,
    pub line: usize,
}

/// Everything a directive file asks for.
///
/// All maps are keyed by file name and keep declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub files: IndexMap<String, FileSpec>,
    pub add_columns: IndexMap<String, AddColumns>,
    pub delete_rows: IndexMap<String, DeleteRows>,
    pub output_path: Option<PathBuf>,
}

impl Plan {
    pub fn file(&self, name: &str) -> Option<&FileSpec> {
        self.files.get(name)
    }

    /// Row indices to delete for `name`, empty when no `DEL-ROW` was given.
    pub fn rows_to_delete(&self, name: &str) -> &[usize] {
        self.delete_rows
            .get(name)
            .map(|entry| entry.rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Files that contribute columns, in `ADD-COL` declaration order.
    pub fn contributing_files(&self) -> impl Iterator<Item = &str> {
        self.add_columns.keys().map(String::as_str)
    }
}
