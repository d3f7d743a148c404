//! CLI library components for colmerge.

pub mod logging;
pub mod pipeline;
