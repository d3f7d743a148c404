//! Input table loading with raw-row deletion and header promotion.

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::{Path, PathBuf};

use colmerge_model::{ColumnRef, FileSpec, Plan};
use csv::ReaderBuilder;
use indexmap::IndexMap;
use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// One input file after deletion and header promotion.
///
/// Every column holds text; the identifier, when declared, is resolved to
/// its header name.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub name: String,
    pub path: PathBuf,
    pub frame: DataFrame,
    pub id_column: Option<String>,
    /// Records read from the file, header row included.
    pub raw_rows: usize,
    /// Records removed by `DEL-ROW`.
    pub deleted_rows: usize,
}

impl LoadedTable {
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Number of data rows (header excluded).
    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// Reads every record of a CSV file without treating any row as a header.
///
/// Blank lines are skipped and a leading UTF-8 BOM is dropped.
pub fn read_raw_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if rows.is_empty()
            && let Some(first) = row.first_mut()
            && let Some(stripped) = first.strip_prefix('\u{feff}')
        {
            *first = stripped.to_string();
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Loads one file, deletes raw rows, then promotes the first remaining row
/// to the header.
///
/// `delete_rows` indexes the records as read, before the header is chosen,
/// so deleting row 0 makes the next surviving row the header. Indices past
/// the end are ignored.
pub fn load_table(spec: &FileSpec, delete_rows: &[usize]) -> Result<LoadedTable> {
    let raw = read_raw_rows(&spec.path)?;
    let raw_rows = raw.len();

    let targets: BTreeSet<usize> = delete_rows.iter().copied().collect();
    let ignored: Vec<usize> = targets.range(raw_rows..).copied().collect();
    if !ignored.is_empty() {
        debug!(
            file = %spec.name,
            ?ignored,
            raw_rows,
            "row indices past the end ignored"
        );
    }

    let mut kept = raw
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| !targets.contains(idx));
    let deleted_rows = targets.len() - ignored.len();

    let Some((_, header_row)) = kept.next() else {
        return Err(IngestError::EmptyCsv {
            path: spec.path.clone(),
        });
    };
    let headers = unique_headers(&header_row);
    let width = headers.len();

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); width];
    for (raw_index, mut row) in kept {
        if row.len() > width {
            return Err(IngestError::RaggedRow {
                path: spec.path.clone(),
                row: raw_index,
                expected: width,
                found: row.len(),
            });
        }
        row.resize(width, String::new());
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(value);
        }
    }

    let frame = DataFrame::new(
        headers
            .iter()
            .zip(columns)
            .map(|(name, values)| Series::new(name.as_str().into(), values).into_column())
            .collect::<Vec<Column>>(),
    )?;

    let id_column = spec
        .id_column
        .as_ref()
        .map(|reference| resolve_id_column(spec, reference, &headers))
        .transpose()?;

    debug!(
        file = %spec.name,
        path = %spec.path.display(),
        rows = frame.height(),
        columns = frame.width(),
        deleted_rows,
        id_column = id_column.as_deref().unwrap_or("-"),
        "table loaded"
    );

    Ok(LoadedTable {
        name: spec.name.clone(),
        path: spec.path.clone(),
        frame,
        id_column,
        raw_rows,
        deleted_rows,
    })
}

/// Loads every declared file in declaration order.
pub fn load_tables(plan: &Plan) -> Result<IndexMap<String, LoadedTable>> {
    let mut tables = IndexMap::with_capacity(plan.files.len());
    for (name, spec) in &plan.files {
        let table = load_table(spec, plan.rows_to_delete(name))?;
        tables.insert(name.clone(), table);
    }
    info!(file_count = tables.len(), "input tables loaded");
    Ok(tables)
}

fn resolve_id_column(spec: &FileSpec, reference: &ColumnRef, headers: &[String]) -> Result<String> {
    if let Some(name) = reference.resolve(headers) {
        return Ok(name.to_string());
    }
    Err(match reference {
        ColumnRef::Index(index) => IngestError::IdColumnOutOfRange {
            file: spec.name.clone(),
            index: *index,
            width: headers.len(),
        },
        ColumnRef::Name(column) => IngestError::IdColumnNotFound {
            file: spec.name.clone(),
            column: column.clone(),
        },
    })
}

/// Trims header cells and makes every name unique.
///
/// Empty cells become `Unnamed: <position>`; repeats get `.1`, `.2`, ...
fn unique_headers(row: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(row.len());
    let mut headers = Vec::with_capacity(row.len());
    for (idx, raw) in row.iter().enumerate() {
        let trimmed = raw.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            trimmed.to_string()
        };
        let mut candidate = base.clone();
        let mut suffix = 1usize;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_unique_headers_trims() {
        assert_eq!(unique_headers(&row(&[" id ", "name"])), vec!["id", "name"]);
    }

    #[test]
    fn test_unique_headers_dedupes() {
        assert_eq!(
            unique_headers(&row(&["a", "a", "b", "a"])),
            vec!["a", "a.1", "b", "a.2"]
        );
    }

    #[test]
    fn test_unique_headers_names_empty_cells() {
        assert_eq!(
            unique_headers(&row(&["id", "", "  "])),
            vec!["id", "Unnamed: 1", "Unnamed: 2"]
        );
    }
}
