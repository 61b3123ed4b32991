//! SauceQA CLI
//!
//! Builds and launches `sauceqa-suite` runs, lists the scenario catalog and
//! writes the project summary report.

pub mod commands;
pub mod output;
