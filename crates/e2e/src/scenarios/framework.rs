//! Framework self-checks
//!
//! These cases run without a browser session: they confirm the configuration,
//! logging, fixture layout and report directories a browser run relies on.

use sauceqa_common::{get_logger, initialize, DataReader};

use super::{catalog, LocalContext, Scenario, MARKERS, SUITES};
use crate::driver::BrowserDriver;
use crate::error::{verify, E2eResult};

pub const SUITE: &str = "framework";
const CASE_MARKERS: &[&str] = &["framework", "smoke"];

const WRITE_CHECK_FILE: &str = "write_check.txt";

pub fn scenarios<D: BrowserDriver>() -> Vec<Scenario<D>> {
    vec![
        Scenario::local(
            SUITE,
            CASE_MARKERS,
            "test_configuration_loading",
            "Configuration has a site, a browser and an existing base directory",
            configuration_loading,
        ),
        Scenario::local(
            SUITE,
            CASE_MARKERS,
            "test_logger_functionality",
            "Named loggers accept every level",
            logger_functionality,
        ),
        Scenario::local(
            SUITE,
            CASE_MARKERS,
            "test_project_structure",
            "Fixture directory and files are in place",
            project_structure,
        ),
        Scenario::local(
            SUITE,
            CASE_MARKERS,
            "test_components_wired",
            "Fixtures load and every suite has cases",
            components_wired::<D>,
        ),
        Scenario::local(
            SUITE,
            CASE_MARKERS,
            "test_report_directory_creation",
            "Report and log directories exist and are writable",
            report_directory_creation,
        ),
    ]
}

async fn configuration_loading(ctx: LocalContext) -> E2eResult<()> {
    let config = &ctx.config;
    verify(
        config.base_url.starts_with("http://") || config.base_url.starts_with("https://"),
        format!("Base URL is not http(s): {}", config.base_url),
    )?;
    verify(
        config.login_url().starts_with(&config.base_url),
        format!("Login URL {} is not under {}", config.login_url(), config.base_url),
    )?;
    verify(config.explicit_wait_secs > 0, "Explicit wait must be positive")?;
    verify(
        config.base_dir.is_dir(),
        format!("Base directory should exist: {}", config.base_dir.display()),
    )?;
    ctx.logger.log_info(format!(
        "Config loaded: browser={}, url={}",
        config.browser, config.base_url
    ));
    Ok(())
}

async fn logger_functionality(ctx: LocalContext) -> E2eResult<()> {
    let logger = get_logger("TestLogger");
    logger.log_info("Test info message");
    logger.log_debug("Test debug message");
    logger.log_warning("Test warning message");
    logger.log_error("Test error message");
    verify(logger.name() == "TestLogger", "Logger lost its name")?;
    ctx.logger.log_info("Logger functionality verified");
    Ok(())
}

async fn project_structure(ctx: LocalContext) -> E2eResult<()> {
    let paths = ctx.config.paths();
    verify(
        paths.test_data_dir.is_dir(),
        format!("Required directory missing: {}", paths.test_data_dir.display()),
    )?;
    for file in [paths.credentials_file(), paths.test_config_file()] {
        verify(file.is_file(), format!("Required file missing: {}", file.display()))?;
    }
    ctx.logger.log_info("Project structure validated");
    Ok(())
}

async fn components_wired<D: BrowserDriver>(ctx: LocalContext) -> E2eResult<()> {
    let reader = DataReader::from_config(&ctx.config);
    let valid = reader.get_valid_credentials()?;
    verify(!valid.username.is_empty(), "Valid credentials have no username")?;
    reader.get_test_config()?;

    let scenarios = catalog::<D>(&ctx.credentials, &ctx.test_config);
    for suite in SUITES {
        verify(
            scenarios.iter().any(|s| s.suite == *suite),
            format!("Suite {} has no cases", suite),
        )?;
    }
    for scenario in &scenarios {
        for marker in scenario.markers {
            verify(
                MARKERS.contains(marker),
                format!("{} uses unregistered marker {}", scenario.id(), marker),
            )?;
        }
    }
    ctx.logger.log_info(format!("{} cases wired", scenarios.len()));
    Ok(())
}

async fn report_directory_creation(ctx: LocalContext) -> E2eResult<()> {
    let paths = ctx.config.paths();
    initialize(&paths)?;
    verify(
        paths.reports_dir.is_dir(),
        format!("Reports directory should exist: {}", paths.reports_dir.display()),
    )?;
    verify(
        paths.logs_dir.is_dir(),
        format!("Logs directory should exist: {}", paths.logs_dir.display()),
    )?;

    let check = paths.reports_dir.join(WRITE_CHECK_FILE);
    tokio::fs::write(&check, "Test write operation").await?;
    let written = check.is_file();
    tokio::fs::remove_file(&check).await?;
    verify(written, "Could not write to the reports directory")?;

    ctx.logger.log_info(format!(
        "Report directories: {}, {}",
        paths.reports_dir.display(),
        paths.logs_dir.display()
    ));
    Ok(())
}
