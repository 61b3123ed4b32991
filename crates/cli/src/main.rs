//! SauceQA CLI - Main Entry Point
//!
//! `sauceqa --test-type login` launches the matching suite run and exits with
//! the suite's status.

use clap::Parser;
use sauceqa_common::{initialize, Browser, Config, TestScope};
use std::path::PathBuf;

use sauceqa_cli::commands::run::{self, RunOptions, RunPlan, EXIT_INTERRUPTED};
use sauceqa_cli::commands::{list, report};
use sauceqa_cli::output;

/// SauceQA - UI test automation for the Swag Labs demo shop
#[derive(Parser)]
#[command(name = "sauceqa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Which tests to run
    #[arg(short = 't', long, value_enum, default_value_t = TestScope::All)]
    test_type: TestScope,

    /// Run cases in parallel
    #[arg(long)]
    parallel: bool,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    /// Browser to use
    #[arg(long, value_enum)]
    browser: Option<Browser>,

    /// List the selected tests without running them
    #[arg(long)]
    list_tests: bool,

    /// Write the project summary report and exit
    #[arg(long)]
    generate_report: bool,

    /// Configuration file (TOML)
    #[arg(short, long, env = "SAUCEQA_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let code = match run_cli(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            2
        }
    };
    std::process::exit(code);
}

async fn run_cli(cli: Cli) -> anyhow::Result<i32> {
    let config = Config::load(cli.config.as_deref())?;
    initialize(&config.paths())?;

    output::print_banner();

    if cli.generate_report {
        report::execute(&config)?;
        return Ok(0);
    }

    if cli.list_tests {
        let (credentials, test_config) = config.load_test_data();
        list::execute(cli.test_type, &credentials, &test_config);
        return Ok(0);
    }

    output::print_config(&config);

    let options = RunOptions {
        parallel: cli.parallel,
        headless: cli.headless,
        browser: cli.browser,
        config_path: cli.config.clone(),
        verbose: cli.verbose,
    };
    let plan = RunPlan::build(run::suite_binary(), cli.test_type, &options, &config);
    output::print_params(cli.test_type, &plan);
    println!();

    let code = run::execute(&plan).await?;
    println!();
    match code {
        0 => output::print_success("All tests passed!"),
        EXIT_INTERRUPTED => output::print_warning("Test execution interrupted by user"),
        5 => output::print_warning("No tests were collected"),
        _ => output::print_error(&format!("Some tests failed (exit code {})", code)),
    }
    if plan.html.exists() {
        output::print_info(&format!("HTML report: {}", plan.html.display()));
    }
    Ok(code)
}
