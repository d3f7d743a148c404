//! Column references used by `FILE` and `ADD-COL` directives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A column addressed either by header name or by 0-based position.
///
/// A token made only of ASCII digits is a position; anything else is a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    /// Classify a directive token.
    ///
    /// Digit-only tokens too large for `usize` stay names; they can only match
    /// a header spelled the same way.
    pub fn parse(token: &str) -> Self {
        if !token.is_empty()
            && token.bytes().all(|b| b.is_ascii_digit())
            && let Ok(index) = token.parse::<usize>()
        {
            return Self::Index(index);
        }
        Self::Name(token.to_string())
    }

    /// Resolve against an ordered list of column names.
    pub fn resolve<'a, S: AsRef<str>>(&self, columns: &'a [S]) -> Option<&'a str> {
        match self {
            Self::Index(index) => columns.get(*index).map(AsRef::as_ref),
            Self::Name(name) => columns
                .iter()
                .map(AsRef::as_ref)
                .find(|column| *column == name),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// One `col [AS alias]` item of an `ADD-COL` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDirective {
    pub source: ColumnRef,
    /// Output name. Without an alias the resolved column keeps its header name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ColumnDirective {
    pub fn new(source: ColumnRef, alias: Option<String>) -> Self {
        Self { source, alias }
    }

    /// Output name for this directive once its source resolved to `resolved`.
    pub fn target_name<'a>(&'a self, resolved: &'a str) -> &'a str {
        self.alias.as_deref().unwrap_or(resolved)
    }
}
