//! Scenario harness
//!
//! Every case gets its own browser session from a [`SessionFactory`]. The
//! session is quit when the case ends, whether it passed, failed or panicked.

use async_trait::async_trait;
use chrono::Local;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use sauceqa_common::{get_logger, Config, Credentials, TestConfig, TestLogger};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::driver::webdriver::SessionOptions;
use crate::driver::{BrowserDriver, FakeBrowser, WebDriverClient};
use crate::error::{E2eError, E2eResult};
use crate::interactor::ElementInteractor;
use crate::pages::BasePage;
use crate::results::{Outcome, TestResult, TestSuiteResult};
use crate::scenarios::{Body, CaseFuture, LocalContext, Scenario, ScenarioContext};

/// Exit code: every case passed
pub const EXIT_OK: i32 = 0;
/// Exit code: at least one case failed
pub const EXIT_FAILURES: i32 = 1;
/// Exit code: the run could not be set up
pub const EXIT_SETUP_ERROR: i32 = 2;
/// Exit code: the selection matched nothing
pub const EXIT_NO_TESTS: i32 = 5;

/// Opens browser sessions
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Driver: BrowserDriver;

    async fn open_session(&self) -> E2eResult<Self::Driver>;

    /// Browser name shown in reports
    fn browser_name(&self) -> String;
}

/// Sessions on a real WebDriver server
pub struct WebDriverSessions {
    options: SessionOptions,
}

impl WebDriverSessions {
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl SessionFactory for WebDriverSessions {
    type Driver = WebDriverClient;

    async fn open_session(&self) -> E2eResult<WebDriverClient> {
        WebDriverClient::connect(&self.options).await
    }

    fn browser_name(&self) -> String {
        self.options.browser.to_string()
    }
}

/// In-memory sessions serving the demo site
pub struct FakeSessions {
    base_url: String,
    reset_url: String,
}

impl FakeSessions {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            reset_url: config.demo_reset_url.clone(),
        }
    }
}

#[async_trait]
impl SessionFactory for FakeSessions {
    type Driver = FakeBrowser;

    async fn open_session(&self) -> E2eResult<FakeBrowser> {
        Ok(FakeBrowser::sauce_demo(&self.base_url, &self.reset_url))
    }

    fn browser_name(&self) -> String {
        "offline".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Run cases concurrently
    pub parallel: bool,
    /// Concurrent cases when `parallel` is set
    pub workers: usize,
    pub screenshot_on_failure: bool,
    /// Extra attempts for a failing case
    pub retries: u32,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            workers: default_workers(),
            screenshot_on_failure: true,
            retries: 0,
        }
    }
}

/// One worker per available core
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

pub struct Harness<F> {
    factory: Arc<F>,
    config: Arc<Config>,
    credentials: Arc<Credentials>,
    test_config: Arc<TestConfig>,
    options: HarnessOptions,
}

impl<F: SessionFactory> Harness<F> {
    pub fn new(
        factory: F,
        config: Config,
        credentials: Credentials,
        test_config: TestConfig,
        options: HarnessOptions,
    ) -> Self {
        Self {
            factory: Arc::new(factory),
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            test_config: Arc::new(test_config),
            options,
        }
    }

    /// Run `scenarios` and collect their results in catalog order
    pub async fn run(&self, scenarios: Vec<Scenario<F::Driver>>) -> TestSuiteResult {
        let started_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let start = Instant::now();
        info!("Running {} test(s)...", scenarios.len());

        let mut results: Vec<(usize, TestResult)> = if self.options.parallel {
            let workers = self.options.workers.max(1);
            info!("Parallel execution with {} workers", workers);
            stream::iter(scenarios.into_iter().enumerate())
                .map(|(index, scenario)| async move { (index, self.run_case(&scenario).await) })
                .buffer_unordered(workers)
                .collect()
                .await
        } else {
            let mut results = Vec::with_capacity(scenarios.len());
            for (index, scenario) in scenarios.into_iter().enumerate() {
                results.push((index, self.run_case(&scenario).await));
            }
            results
        };
        results.sort_by_key(|(index, _)| *index);

        let suite = TestSuiteResult::new(
            started_at,
            self.factory.browser_name(),
            start.elapsed().as_millis() as u64,
            results.into_iter().map(|(_, result)| result).collect(),
        );
        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );
        suite
    }

    /// Run one case, retrying failures up to `options.retries` times.
    ///
    /// Every attempt gets a fresh session. A session that cannot be started
    /// fails the case without retrying.
    pub async fn run_case(&self, scenario: &Scenario<F::Driver>) -> TestResult {
        let logger = get_logger(&scenario.name);
        logger.log_info(format!("Starting test: {}", scenario.id()));
        let start = Instant::now();
        let max_attempts = self.options.retries.saturating_add(1);

        let mut attempt = 1;
        loop {
            let last = attempt >= max_attempts;
            let result = self.attempt(scenario, &logger, last).await;
            match result.failure {
                Some(reason) if result.retryable && !last => {
                    logger.log_warning(format!(
                        "Attempt {}/{} failed, retrying: {}",
                        attempt, max_attempts, reason
                    ));
                    attempt += 1;
                }
                failure => {
                    return self.finish(scenario, &logger, start, attempt, failure, result.screenshot)
                }
            }
        }
    }

    async fn attempt(
        &self,
        scenario: &Scenario<F::Driver>,
        logger: &TestLogger,
        last: bool,
    ) -> Attempt {
        let body = match scenario.body() {
            Body::Local(body) => {
                let ctx = LocalContext {
                    config: self.config.clone(),
                    credentials: self.credentials.clone(),
                    test_config: self.test_config.clone(),
                    logger: logger.clone(),
                };
                return Attempt {
                    failure: contain(body(ctx)).await,
                    screenshot: None,
                    retryable: true,
                };
            }
            Body::Browser(body) => body,
        };

        let driver = match self.factory.open_session().await {
            Ok(driver) => driver,
            Err(e) => {
                logger.log_error(format!("Failed to initialize browser: {}", e));
                let error = match e {
                    E2eError::SessionStart(_) => e,
                    other => E2eError::SessionStart(other.to_string()),
                };
                return Attempt {
                    failure: Some(error.to_string()),
                    screenshot: None,
                    retryable: false,
                };
            }
        };

        let ctx = ScenarioContext {
            driver: driver.clone(),
            config: self.config.clone(),
            credentials: self.credentials.clone(),
            test_config: self.test_config.clone(),
            logger: logger.clone(),
        };
        let failure = contain(body(ctx)).await;

        let screenshot = match &failure {
            Some(_) if last && self.options.screenshot_on_failure => {
                self.failure_screenshot(&driver, scenario, logger).await
            }
            _ => None,
        };

        if let Err(e) = driver.quit().await {
            logger.log_warning(format!("Failed to close browser: {}", e));
        }

        Attempt {
            failure,
            screenshot,
            retryable: true,
        }
    }

    async fn failure_screenshot(
        &self,
        driver: &F::Driver,
        scenario: &Scenario<F::Driver>,
        logger: &TestLogger,
    ) -> Option<PathBuf> {
        let page = BasePage::new(driver.clone(), logger.name(), &self.config);
        match page.take_screenshot(&format!("failure_{}", file_safe(&scenario.name))).await {
            Ok(path) => Some(path),
            Err(e) => {
                logger.log_warning(format!("Could not capture failure screenshot: {}", e));
                None
            }
        }
    }

    fn finish(
        &self,
        scenario: &Scenario<F::Driver>,
        logger: &TestLogger,
        start: Instant,
        attempts: u32,
        failure: Option<String>,
        screenshot: Option<PathBuf>,
    ) -> TestResult {
        let outcome = if failure.is_some() {
            Outcome::Failed
        } else {
            Outcome::Passed
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match &failure {
            None => info!("✓ {} ({} ms)", scenario.id(), duration_ms),
            Some(reason) => error!("✗ {} - {}", scenario.id(), reason),
        }
        logger.log_test_end(outcome.as_str());
        logger.log_info(format!("Completed test: {}", scenario.id()));

        TestResult {
            name: scenario.name.clone(),
            suite: scenario.suite.to_string(),
            markers: scenario.markers.iter().map(|m| m.to_string()).collect(),
            outcome,
            duration_ms,
            attempts,
            error: failure,
            screenshot,
        }
    }
}

/// Outcome of a single attempt at a case
struct Attempt {
    failure: Option<String>,
    screenshot: Option<PathBuf>,
    retryable: bool,
}

/// Await a case body, turning errors and panics into a failure message
async fn contain(body: CaseFuture) -> Option<String> {
    match AssertUnwindSafe(body).catch_unwind().await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(panic) => Some(E2eError::Panicked(panic_message(panic.as_ref())).to_string()),
    }
}

/// Exit code for a finished run
pub fn exit_code(result: &TestSuiteResult) -> i32 {
    if result.total == 0 {
        EXIT_NO_TESTS
    } else if result.success() {
        EXIT_OK
    } else {
        EXIT_FAILURES
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
