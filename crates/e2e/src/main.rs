//! Suite entry point
//!
//! Collects the scenario catalog, filters it, runs it and writes the reports.
//! Exit status: 0 all passed, 1 failures, 2 setup error, 5 nothing collected.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sauceqa_common::report::timestamped_path;
use sauceqa_common::{init_logging, initialize, Config, Credentials, TestConfig};
use tracing::{error, info};

use sauceqa_e2e::driver::webdriver::SessionOptions;
use sauceqa_e2e::harness::{default_workers, EXIT_NO_TESTS, EXIT_OK, EXIT_SETUP_ERROR};
use sauceqa_e2e::scenarios::{catalog, Selection};
use sauceqa_e2e::{exit_code, FakeSessions, Harness, HarnessOptions, SessionFactory, WebDriverSessions};

const DEFAULT_REPORT_PREFIX: &str = "sauceqa_report";

#[derive(Parser, Debug)]
#[command(name = "sauceqa-suite")]
#[command(about = "Login scenario suite for the Sauce Labs demo store")]
struct Args {
    /// Run only these suites (framework, login, password_reset, demo)
    #[arg(short, long)]
    suite: Vec<String>,

    /// Run only cases carrying one of these markers
    #[arg(short, long)]
    marker: Vec<String>,

    /// HTML report path (default: reports/sauceqa_report_<ts>.html)
    #[arg(long)]
    html: Option<PathBuf>,

    /// JSON results path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Run cases concurrently
    #[arg(long)]
    parallel: bool,

    /// Concurrent cases with --parallel
    #[arg(long)]
    workers: Option<usize>,

    /// Extra attempts for failing cases (default: retry_failed_tests from the test config)
    #[arg(long)]
    retries: Option<u32>,

    /// Print the selected cases and exit
    #[arg(long)]
    list: bool,

    /// Run against the in-memory demo site instead of a browser
    #[arg(long)]
    offline: bool,

    /// Debug output on the console
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_SETUP_ERROR);
        }
    };
    let paths = config.paths();
    if let Err(e) = initialize(&paths) {
        eprintln!("Error: {}", e);
        std::process::exit(EXIT_SETUP_ERROR);
    }
    let _log_guard = match init_logging(&paths, args.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_SETUP_ERROR);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(EXIT_SETUP_ERROR);
        }
    };

    let code = match rt.block_on(async_main(args, config)) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            EXIT_SETUP_ERROR
        }
    };
    drop(rt);
    drop(_log_guard);
    std::process::exit(code);
}

async fn async_main(args: Args, config: Config) -> anyhow::Result<i32> {
    let (credentials, test_config) = config.load_test_data();

    if args.offline {
        let factory = FakeSessions::new(&config);
        run_with(factory, &args, config, credentials, test_config).await
    } else {
        let factory = WebDriverSessions::new(SessionOptions::from_config(&config));
        run_with(factory, &args, config, credentials, test_config).await
    }
}

async fn run_with<F: SessionFactory>(
    factory: F,
    args: &Args,
    config: Config,
    credentials: Credentials,
    test_config: TestConfig,
) -> anyhow::Result<i32> {
    let selection = Selection {
        suites: args.suite.clone(),
        markers: args.marker.clone(),
    };
    let scenarios = selection.apply(catalog::<F::Driver>(&credentials, &test_config));

    if args.list {
        for scenario in &scenarios {
            println!("{:<55} {}", scenario.id(), scenario.description);
        }
        println!("\n{} test(s) collected", scenarios.len());
        return Ok(EXIT_OK);
    }

    if scenarios.is_empty() {
        error!("No tests collected for suites {:?} markers {:?}", args.suite, args.marker);
        return Ok(EXIT_NO_TESTS);
    }

    let html = args.html.clone().unwrap_or_else(|| {
        timestamped_path(&config.paths().reports_dir, DEFAULT_REPORT_PREFIX, "html")
    });
    let options = HarnessOptions {
        parallel: args.parallel,
        workers: args.workers.unwrap_or_else(default_workers),
        screenshot_on_failure: test_config.screenshot_on_failure,
        retries: args.retries.unwrap_or(test_config.retry_failed_tests),
    };

    info!(
        "Environment: {} | browser {} | headless {} | retries {}",
        test_config.test_environment, config.browser, config.headless, options.retries
    );
    let harness = Harness::new(factory, config, credentials, test_config, options);
    let result = harness.run(scenarios).await;

    result
        .write_html(&html)
        .with_context(|| format!("writing HTML report {}", html.display()))?;
    if let Some(json) = &args.json {
        result
            .write_json(json)
            .with_context(|| format!("writing JSON results {}", json.display()))?;
    }

    Ok(exit_code(&result))
}
