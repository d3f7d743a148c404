use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use colmerge_transform::MergedTable;
use polars::prelude::{CsvWriter, SerWriter};
use tempfile::NamedTempFile;
use tracing::info;

/// Options for delimited output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Field separator byte.
    pub delimiter: u8,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Ensure a parent directory exists for a file path.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}

/// Serializes the merged table into `writer`.
pub fn write_csv_to<W: Write>(merged: &MergedTable, writer: W, options: WriteOptions) -> Result<()> {
    let mut frame = merged.frame.clone();
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(options.delimiter)
        .finish(&mut frame)
        .context("serialize merged table")?;
    Ok(())
}

/// Writes the merged table to `path`.
///
/// Missing parent directories are created rather than reported as an
/// unwritable path. Rows go to a temporary file next to `path` that is
/// renamed into place once fully written, so a failed write leaves no
/// output file behind.
pub fn write_csv(merged: &MergedTable, path: &Path, options: WriteOptions) -> Result<()> {
    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temporary file in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        write_csv_to(merged, &mut writer, options)
            .with_context(|| format!("write {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("flush {}", path.display()))?;
    }
    staged
        .persist(path)
        .with_context(|| format!("create {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = merged.height(),
        columns = merged.width(),
        "output written"
    );
    Ok(())
}
