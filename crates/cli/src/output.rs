//! Output formatting for the CLI

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use sauceqa_common::{Config, TestScope};

use crate::commands::run::RunPlan;

const RULE: &str = "============================================================";

/// Header printed before every command
pub fn print_banner() {
    println!("{}", RULE.blue());
    println!("{}", "  SauceQA Automation Framework".bold());
    println!("  Login & Authentication Testing for Swag Labs");
    println!("  v{}", sauceqa_common::VERSION);
    println!("{}", RULE.blue());
    println!();
}

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Effective configuration
pub fn print_config(config: &Config) {
    let paths = config.paths();
    let mut table = table();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec!["Base URL".to_string(), config.base_url.clone()]);
    table.add_row(vec!["Browser".to_string(), config.browser.to_string()]);
    table.add_row(vec!["Headless".to_string(), config.headless.to_string()]);
    table.add_row(vec!["Implicit wait".to_string(), format!("{}s", config.implicit_wait_secs)]);
    table.add_row(vec!["Explicit wait".to_string(), format!("{}s", config.explicit_wait_secs)]);
    table.add_row(vec!["WebDriver".to_string(), config.webdriver_url()]);
    table.add_row(vec!["Reports".to_string(), paths.reports_dir.display().to_string()]);
    table.add_row(vec!["Logs".to_string(), paths.logs_dir.display().to_string()]);
    println!("{table}");
}

/// What the run is about to execute
pub fn print_params(scope: TestScope, plan: &RunPlan) {
    let mut table = table();
    table.set_header(vec!["Parameter", "Value"]);
    table.add_row(vec!["Test type".to_string(), format!("{} ({})", scope, scope.description())]);
    table.add_row(vec!["Parallel".to_string(), plan.parallel.to_string()]);
    for (key, value) in &plan.envs {
        table.add_row(vec![key.clone(), value.clone()]);
    }
    table.add_row(vec!["HTML report".to_string(), plan.html.display().to_string()]);
    table.add_row(vec!["JSON results".to_string(), plan.json.display().to_string()]);
    table.add_row(vec!["Command".to_string(), plan.command_line()]);
    println!("{table}");
}

pub fn print_success(message: &str) {
    println!("{} {}", "✅".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "❌".red(), message);
}

pub fn print_warning(message: &str) {
    println!("⚠️  {}", message.yellow());
}

pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}
