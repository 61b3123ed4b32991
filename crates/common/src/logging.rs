//! Logging for test runs
//!
//! [`init_logging`] installs one subscriber per process with two sinks:
//! - **console** (stderr), info and above, respects `RUST_LOG`;
//! - **file**, debug and above, `reports/logs/test_execution_<ts>.log`.
//!
//! Named [`TestLogger`] handles share that run-wide file. Creating a handle
//! never opens a new file.

use std::fmt::Display;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::Paths;
use crate::error::{Error, Result};
use crate::report::run_timestamp;

const LOG_FILE_PREFIX: &str = "test_execution";
const SEPARATOR: &str = "==================================================";

/// Keeps the file writer alive; dropping it flushes pending records.
pub struct LogGuard {
    path: PathBuf,
    _worker: WorkerGuard,
}

impl LogGuard {
    /// The run's log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Install the global subscriber. Call once, early in `main()`.
pub fn init_logging(paths: &Paths, verbose: bool) -> Result<LogGuard> {
    std::fs::create_dir_all(&paths.logs_dir)?;

    let file_name = format!("{}_{}.log", LOG_FILE_PREFIX, run_timestamp());
    let appender = tracing_appender::rolling::never(&paths.logs_dir, &file_name);
    let (writer, worker) = tracing_appender::non_blocking(appender);

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .with_filter(EnvFilter::new("debug,hyper=info,hyper_util=info,h2=info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| Error::LoggingInitialized)?;

    Ok(LogGuard {
        path: paths.logs_dir.join(file_name),
        _worker: worker,
    })
}

/// Named logging handle; every message is prefixed with `[name]`.
#[derive(Debug, Clone)]
pub struct TestLogger {
    name: Arc<str>,
}

/// Handle bound to `name`
pub fn get_logger(name: impl AsRef<str>) -> TestLogger {
    TestLogger::new(name)
}

impl TestLogger {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log_info(&self, message: impl Display) {
        info!("[{}] {}", self.name, message);
    }

    pub fn log_warning(&self, message: impl Display) {
        warn!("[{}] {}", self.name, message);
    }

    pub fn log_error(&self, message: impl Display) {
        error!("[{}] {}", self.name, message);
    }

    pub fn log_debug(&self, message: impl Display) {
        debug!("[{}] {}", self.name, message);
    }

    pub fn log_test_start(&self) {
        info!("[{}] {}", self.name, SEPARATOR);
        info!("[{}] Starting Test: {}", self.name, self.name);
        info!("[{}] {}", self.name, SEPARATOR);
    }

    pub fn log_test_end(&self, status: impl Display) {
        info!("[{}] {}", self.name, SEPARATOR);
        info!("[{}] Test {} {}", self.name, self.name, status);
        info!("[{}] {}", self.name, SEPARATOR);
    }
}

/// In-memory sink for asserting on log output.
///
/// ```ignore
/// let capture = LogCapture::new();
/// let _guard = capture.set_default();
/// get_logger("LoginPage").log_info("hello");
/// assert!(capture.contents().contains("[LoginPage] hello"));
/// ```
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route this thread's events (debug and above) into the capture.
    pub fn set_default(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
