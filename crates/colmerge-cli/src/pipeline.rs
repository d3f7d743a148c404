//! Pipeline stages: parse directives, load inputs, merge, write.
//!
//! Stages run strictly in order and any failure aborts the run before the
//! output file is created.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};

use colmerge_ingest::{LoadedTable, load_tables, read_directives};
use colmerge_model::Plan;
use colmerge_output::{WriteOptions, write_csv};
use colmerge_transform::{MergedTable, merge_tables};

/// Inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Replaces the plan's `OUTPUT-FILE` when set.
    pub output: Option<PathBuf>,
    pub write: WriteOptions,
    /// Stop after merging.
    pub dry_run: bool,
}

/// Per-input counts for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub file: String,
    pub path: PathBuf,
    /// Records read, header included.
    pub raw_rows: usize,
    pub deleted_rows: usize,
    /// Data rows after header promotion.
    pub rows: usize,
    /// Output columns this file contributed. `None` when it has no `ADD-COL`.
    pub columns: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct RunResult {
    pub output_path: PathBuf,
    /// False for dry runs.
    pub written: bool,
    pub merged: MergedTable,
    pub tables: Vec<TableSummary>,
}

/// Reads the directive file.
pub fn load_plan(path: &Path) -> Result<Plan> {
    let span = info_span!("parse", path = %path.display());
    let _guard = span.enter();
    let plan = read_directives(path).with_context(|| format!("parse {}", path.display()))?;
    info!(
        files = plan.files.len(),
        add_col = plan.add_columns.len(),
        del_row = plan.delete_rows.len(),
        "directives parsed"
    );
    Ok(plan)
}

/// Picks the output path: the override first, then `OUTPUT-FILE`.
pub fn resolve_output_path(plan: &Plan, output: Option<&Path>) -> Result<PathBuf> {
    output
        .or_else(|| plan.output_path())
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("no output path: add an OUTPUT-FILE directive or pass --output"))
}

/// Runs load, merge and (unless dry) write for an already parsed plan.
pub fn run_plan(plan: &Plan, options: &RunOptions) -> Result<RunResult> {
    let output_path = resolve_output_path(plan, options.output.as_deref())?;

    let load_start = Instant::now();
    let tables = info_span!("load")
        .in_scope(|| load_tables(plan))
        .context("load input tables")?;
    info!(
        file_count = tables.len(),
        duration_ms = load_start.elapsed().as_millis(),
        "load complete"
    );

    let merged = merge_tables(plan, &tables).context("merge tables")?;

    if options.dry_run {
        info!(path = %output_path.display(), "dry run, output not written");
    } else {
        info_span!("write", path = %output_path.display())
            .in_scope(|| write_csv(&merged, &output_path, options.write))
            .with_context(|| format!("write output {}", output_path.display()))?;
    }

    let tables = tables
        .values()
        .map(|table| summarize_table(table, &merged))
        .collect();
    Ok(RunResult {
        output_path,
        written: !options.dry_run,
        merged,
        tables,
    })
}

/// Parses the directive file at `directives` and runs it.
pub fn run(directives: &Path, options: &RunOptions) -> Result<RunResult> {
    let plan = load_plan(directives)?;
    run_plan(&plan, options)
}

fn summarize_table(table: &LoadedTable, merged: &MergedTable) -> TableSummary {
    let columns = merged
        .contributions
        .iter()
        .find(|contribution| contribution.file == table.name)
        .map(|contribution| contribution.columns.clone());
    TableSummary {
        file: table.name.clone(),
        path: table.path.clone(),
        raw_rows: table.raw_rows,
        deleted_rows: table.deleted_rows,
        rows: table.height(),
        columns,
    }
}
