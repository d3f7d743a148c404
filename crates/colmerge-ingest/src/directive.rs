//! Directive file parsing.
//!
//! A directive file is line oriented. Recognized lines:
//!
//! ```text
//! FILE <name> <path> [id column]
//! OUTPUT-FILE = <path>
//! ADD-COL <name> <col>[ AS <alias>], <col>[ AS <alias>], ...
//! DEL-ROW <name> <row>, <row>, ...
//! ```
//!
//! Every other line is ignored. Column tokens made only of digits are
//! positions, anything else is a header name.

use std::fs;
use std::path::{Path, PathBuf};

use colmerge_model::{AddColumns, ColumnDirective, ColumnRef, DeleteRows, FileSpec, Plan};
use tracing::{debug, warn};

use crate::error::DirectiveError;

const FILE: &str = "FILE";
const OUTPUT_FILE: &str = "OUTPUT-FILE";
const ADD_COL: &str = "ADD-COL";
const DEL_ROW: &str = "DEL-ROW";
const ALIAS_SEPARATOR: &str = " AS ";

type Result<T> = std::result::Result<T, DirectiveError>;

/// Reads and parses a directive file.
pub fn read_directives(path: &Path) -> Result<Plan> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DirectiveError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            DirectiveError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;
    parse_directives(&text)
}

/// Parses directive text into a [`Plan`].
///
/// Repeated `FILE`, `ADD-COL` and `DEL-ROW` directives for one name replace
/// the earlier entry. `ADD-COL` and `DEL-ROW` must name a declared file, but
/// the declaration may come later in the text.
pub fn parse_directives(text: &str) -> Result<Plan> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut plan = Plan::default();

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix(OUTPUT_FILE)
            && (rest.is_empty() || rest.starts_with(|c: char| c == '=' || c.is_whitespace()))
        {
            let path = parse_output(rest, line)?;
            if let Some(previous) = plan.output_path.replace(path) {
                debug!(line, previous = %previous.display(), "output path replaced");
            }
            continue;
        }

        let (keyword, rest) = split_first_token(trimmed);
        match keyword {
            FILE => {
                let spec = parse_file(rest, line)?;
                if let Some(previous) = plan.files.insert(spec.name.clone(), spec) {
                    warn!(
                        file = %previous.name,
                        line,
                        previous_line = previous.line,
                        "FILE directive redeclared, keeping the later one"
                    );
                }
            }
            ADD_COL => {
                let entry = parse_add_columns(rest, line)?;
                debug!(
                    file = %entry.file,
                    line,
                    columns = entry.directives.len(),
                    "parsed ADD-COL"
                );
                if let Some(previous) = plan.add_columns.insert(entry.file.clone(), entry) {
                    warn!(
                        file = %previous.file,
                        line,
                        previous_line = previous.line,
                        "ADD-COL repeated, replacing the earlier column list"
                    );
                }
            }
            DEL_ROW => {
                let entry = parse_delete_rows(rest, line)?;
                if let Some(previous) = plan.delete_rows.insert(entry.file.clone(), entry) {
                    warn!(
                        file = %previous.file,
                        line,
                        previous_line = previous.line,
                        "DEL-ROW repeated, replacing the earlier row list"
                    );
                }
            }
            _ => debug!(line, "ignoring unrecognized directive"),
        }
    }

    check_references(&plan)?;
    Ok(plan)
}

fn split_first_token(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (text, ""),
    }
}

fn malformed(line: usize, directive: &'static str, reason: impl Into<String>) -> DirectiveError {
    DirectiveError::Malformed {
        line,
        directive,
        reason: reason.into(),
    }
}

fn parse_output(rest: &str, line: usize) -> Result<PathBuf> {
    let Some(value) = rest.trim_start().strip_prefix('=') else {
        return Err(malformed(line, OUTPUT_FILE, "expected `OUTPUT-FILE = <path>`"));
    };
    let value = value.trim();
    if value.is_empty() {
        return Err(malformed(line, OUTPUT_FILE, "missing output path"));
    }
    Ok(PathBuf::from(value))
}

fn parse_file(rest: &str, line: usize) -> Result<FileSpec> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let (name, path, id_column) = match tokens.as_slice() {
        [name, path] => (*name, *path, None),
        [name, path, id] => (*name, *path, Some(ColumnRef::parse(id))),
        _ => {
            return Err(malformed(
                line,
                FILE,
                format!(
                    "expected `FILE <name> <path> [id column]`, found {} argument(s)",
                    tokens.len()
                ),
            ));
        }
    };
    Ok(FileSpec {
        name: name.to_string(),
        path: PathBuf::from(path),
        id_column,
        line,
    })
}

/// Splits `<name> <a>, <b>, ...` into the name and trimmed list items.
fn split_list<'a>(
    rest: &'a str,
    line: usize,
    directive: &'static str,
) -> Result<(&'a str, Vec<&'a str>)> {
    let (name, list) = split_first_token(rest);
    if name.is_empty() || list.is_empty() {
        return Err(malformed(
            line,
            directive,
            format!("expected `{directive} <name> <item>, <item>, ...`"),
        ));
    }
    let items: Vec<&str> = list.split(',').map(str::trim).collect();
    if items.iter().any(|item| item.is_empty()) {
        return Err(malformed(line, directive, "empty item in list"));
    }
    Ok((name, items))
}

fn parse_add_columns(rest: &str, line: usize) -> Result<AddColumns> {
    let (name, items) = split_list(rest, line, ADD_COL)?;
    let mut directives = Vec::with_capacity(items.len());
    for item in items {
        let directive = match item.split_once(ALIAS_SEPARATOR) {
            Some((source, alias)) => {
                let (source, alias) = (source.trim(), alias.trim());
                if source.is_empty() || alias.is_empty() {
                    return Err(malformed(
                        line,
                        ADD_COL,
                        format!("incomplete alias in '{item}'"),
                    ));
                }
                ColumnDirective::new(ColumnRef::parse(source), Some(alias.to_string()))
            }
            None if item.ends_with(" AS") || item.starts_with("AS ") => {
                return Err(malformed(
                    line,
                    ADD_COL,
                    format!("incomplete alias in '{item}'"),
                ));
            }
            None => ColumnDirective::new(ColumnRef::parse(item), None),
        };
        directives.push(directive);
    }
    Ok(AddColumns {
        file: name.to_string(),
        directives,
        line,
    })
}

fn parse_delete_rows(rest: &str, line: usize) -> Result<DeleteRows> {
    let (name, items) = split_list(rest, line, DEL_ROW)?;
    let rows = items
        .into_iter()
        .map(|item| {
            item.parse::<usize>().map_err(|_| {
                malformed(
                    line,
                    DEL_ROW,
                    format!("row index '{item}' is not a non-negative integer"),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(DeleteRows {
        file: name.to_string(),
        rows,
        line,
    })
}

fn check_references(plan: &Plan) -> Result<()> {
    for entry in plan.add_columns.values() {
        if !plan.files.contains_key(&entry.file) {
            return Err(DirectiveError::UnknownFile {
                line: entry.line,
                directive: ADD_COL,
                file: entry.file.clone(),
            });
        }
    }
    for entry in plan.delete_rows.values() {
        if !plan.files.contains_key(&entry.file) {
            return Err(DirectiveError::UnknownFile {
                line: entry.line,
                directive: DEL_ROW,
                file: entry.file.clone(),
            });
        }
    }
    Ok(())
}
