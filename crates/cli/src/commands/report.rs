//! `--generate-report`

use anyhow::{Context, Result};
use sauceqa_common::report::generate_summary_report;
use sauceqa_common::Config;
use std::path::PathBuf;

use crate::output::{print_info, print_success};

pub fn execute(config: &Config) -> Result<PathBuf> {
    let path = generate_summary_report(config).context("failed to generate summary report")?;
    print_success(&format!("Summary report generated: {}", path.display()));
    print_info(&format!("Dashboard: {}", config.dashboard.url()));
    Ok(path)
}
