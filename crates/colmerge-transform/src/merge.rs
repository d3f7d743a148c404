//! Per-file projection and progressive full outer join.
//!
//! Files are processed in `ADD-COL` declaration order. The first projection
//! seeds the merged table; each later one is full-outer-joined on the
//! identifier, with the key columns coalesced under the first file's
//! identifier name. Rows are sorted by key after every join.

use std::collections::HashSet;
use std::time::Instant;

use colmerge_ingest::LoadedTable;
use colmerge_model::{AddColumns, ColumnRef, Plan};
use indexmap::IndexMap;
use polars::prelude::{
    DataFrame, DataType, IntoLazy, JoinArgs, JoinCoalesce, JoinType, SortMultipleOptions, col,
};
use tracing::{debug, info, info_span, warn};

use crate::error::{MergeError, Result};

/// Suffixes for non-key columns present on both sides of a join.
pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

/// Identifier plus the requested columns of one file, already renamed.
#[derive(Debug, Clone)]
pub struct Projection {
    pub file: String,
    pub frame: DataFrame,
    pub id_column: String,
    /// Output names of the selected columns, identifier excluded.
    pub columns: Vec<String>,
}

/// What one file put into the merged table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContribution {
    pub file: String,
    pub rows: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MergedTable {
    pub frame: DataFrame,
    /// Key column name, taken from the first contributing file.
    pub id_column: String,
    pub contributions: Vec<FileContribution>,
}

impl MergedTable {
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }
}

/// Selects the identifier and the `ADD-COL` columns of one table.
///
/// The identifier is cast to text and always comes first. An `ADD-COL` item
/// naming the identifier with an alias renames the key. A source column
/// selected twice keeps its first mapping; later directives for it are
/// skipped. Two different source columns landing on the same output name
/// are rejected.
pub fn project(table: &LoadedTable, add: &AddColumns) -> Result<Projection> {
    let Some(id_column) = table.id_column.as_deref() else {
        return Err(MergeError::MissingIdentifier {
            file: table.name.clone(),
            line: add.line,
        });
    };
    let names = table.column_names();

    let mut id_target = id_column;
    let mut id_aliased = false;
    let mut selected: HashSet<&str> = HashSet::from([id_column]);
    let mut targets: HashSet<&str> = HashSet::from([id_column]);
    let mut picks: Vec<(&str, &str)> = Vec::with_capacity(add.directives.len());

    for directive in &add.directives {
        let source = directive.source.resolve(&names).ok_or_else(|| match &directive.source {
            ColumnRef::Index(index) => MergeError::ColumnIndexOutOfRange {
                file: table.name.clone(),
                index: *index,
                width: names.len(),
                line: add.line,
            },
            ColumnRef::Name(column) => MergeError::ColumnNotFound {
                file: table.name.clone(),
                column: column.clone(),
                line: add.line,
            },
        })?;
        if source == id_column {
            match directive.alias.as_deref() {
                Some(alias) if !id_aliased => {
                    targets.remove(id_target);
                    if !targets.insert(alias) {
                        return Err(duplicate_target(table, alias, add.line));
                    }
                    id_target = alias;
                    id_aliased = true;
                }
                Some(_) => warn!(
                    file = %table.name,
                    column = source,
                    line = add.line,
                    "identifier already renamed, keeping its first alias"
                ),
                None => debug!(file = %table.name, column = source, "identifier listed in ADD-COL"),
            }
            continue;
        }
        if !selected.insert(source) {
            warn!(
                file = %table.name,
                column = source,
                line = add.line,
                "column already selected, keeping its first mapping"
            );
            continue;
        }
        let target = directive.target_name(source);
        if !targets.insert(target) {
            return Err(duplicate_target(table, target, add.line));
        }
        picks.push((source, target));
    }

    let mut exprs = Vec::with_capacity(picks.len() + 1);
    exprs.push(col(id_column).cast(DataType::String).alias(id_target));
    exprs.extend(picks.iter().map(|(source, target)| col(*source).alias(*target)));
    let columns: Vec<String> = picks.iter().map(|(_, target)| String::from(*target)).collect();

    let frame = table.frame.clone().lazy().select(exprs).collect()?;
    debug!(
        file = %table.name,
        rows = frame.height(),
        id_column = id_target,
        columns = ?columns,
        "projection built"
    );
    Ok(Projection {
        file: table.name.clone(),
        frame,
        id_column: id_target.to_string(),
        columns,
    })
}

fn duplicate_target(table: &LoadedTable, target: &str, line: usize) -> MergeError {
    MergeError::DuplicateTarget {
        file: table.name.clone(),
        target: target.to_string(),
        line,
    }
}

/// Builds the merged table for every file named by an `ADD-COL` directive.
pub fn merge_tables(plan: &Plan, tables: &IndexMap<String, LoadedTable>) -> Result<MergedTable> {
    let span = info_span!("merge", file_count = plan.add_columns.len());
    let _guard = span.enter();
    let start = Instant::now();

    let mut merged: Option<(DataFrame, String)> = None;
    let mut contributions = Vec::with_capacity(plan.add_columns.len());

    for (name, add) in &plan.add_columns {
        let table = tables.get(name).ok_or_else(|| MergeError::UnknownFile {
            file: name.clone(),
            line: add.line,
        })?;
        let projection = project(table, add)?;
        contributions.push(FileContribution {
            file: projection.file.clone(),
            rows: projection.frame.height(),
            columns: projection.columns.clone(),
        });

        merged = Some(match merged {
            None => {
                let key = projection.id_column.clone();
                (projection.frame, key)
            }
            Some((frame, key)) => {
                let joined = outer_join(frame, &key, projection, add.line)?;
                (joined, key)
            }
        });
    }

    let Some((frame, id_column)) = merged else {
        return Err(MergeError::NothingToMerge);
    };
    info!(
        rows = frame.height(),
        columns = frame.width(),
        duration_ms = start.elapsed().as_millis(),
        "merge complete"
    );
    Ok(MergedTable {
        frame,
        id_column,
        contributions,
    })
}

/// Full outer join of `projection` into `merged` on the identifier.
///
/// Fails when a suffixed name would clash with a column already present on
/// either side.
fn outer_join(
    mut merged: DataFrame,
    key: &str,
    projection: Projection,
    line: usize,
) -> Result<DataFrame> {
    let Projection {
        file,
        frame: mut right,
        id_column: right_key,
        columns,
    } = projection;

    let mut left_names = frame_names(&merged);
    let mut right_names = frame_names(&right);
    right_names.remove(&right_key);
    let collisions: Vec<&String> = columns
        .iter()
        .filter(|column| left_names.contains(*column))
        .collect();

    for column in collisions {
        let left = format!("{column}{LEFT_SUFFIX}");
        let right_name = format!("{column}{RIGHT_SUFFIX}");
        let left_renamed = column != key;
        if (left_renamed && left_names.contains(&left))
            || left_names.contains(&right_name)
            || right_names.contains(&right_name)
        {
            return Err(MergeError::SuffixCollision {
                file,
                column: column.clone(),
                line,
            });
        }
        if left_renamed {
            merged.rename(column, left.as_str().into())?;
            left_names.remove(column);
            left_names.insert(left);
        }
        right.rename(column, right_name.as_str().into())?;
        right_names.remove(column);
        right_names.insert(right_name);
        debug!(file = %file, column = %column, "column name collision, suffixed");
    }
    if let Some(column) = right_names.iter().find(|name| left_names.contains(*name)) {
        return Err(MergeError::SuffixCollision {
            file,
            column: column.clone(),
            line,
        });
    }

    let joined = merged
        .lazy()
        .join(
            right.lazy(),
            [col(key)],
            [col(right_key.as_str())],
            JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
        )
        .sort([key], SortMultipleOptions::default().with_maintain_order(true))
        .collect()?;
    debug!(
        file = %file,
        rows = joined.height(),
        columns = joined.width(),
        "joined"
    );
    Ok(joined)
}

fn frame_names(frame: &DataFrame) -> HashSet<String> {
    frame
        .get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}
