//! CLI command implementations

pub mod list;
pub mod report;
pub mod run;
