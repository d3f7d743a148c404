//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "colmerge",
    version,
    about = "Select, rename and outer-join columns from several CSV files",
    long_about = "Select, rename and outer-join columns from several CSV files.\n\n\
                  The directive file declares the inputs (FILE), the columns to take \
                  from each (ADD-COL), rows to drop (DEL-ROW) and where to write the \
                  merged table (OUTPUT-FILE)."
)]
pub struct Cli {
    /// Path to the directive file.
    #[arg(value_name = "DIRECTIVES", default_value = "config.cfg")]
    pub directives: PathBuf,

    /// Output path (overrides OUTPUT-FILE).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output field separator (single ASCII character, or "tab").
    #[arg(
        short = 'd',
        long = "delimiter",
        value_name = "CHAR",
        default_value = ",",
        value_parser = parse_delimiter
    )]
    pub delimiter: u8,

    /// Parse, load and merge, then print the summary without writing output.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Print the parsed plan as JSON and exit.
    #[arg(long = "print-plan")]
    pub print_plan: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) if ch.is_ascii() => Ok(ch as u8),
                _ => Err(format!(
                    "delimiter must be a single ASCII character, got '{value}'"
                )),
            }
        }
    }
}
