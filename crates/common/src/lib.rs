//! SauceQA Common Library
//!
//! Configuration, test data fixtures, logging and report artifacts shared by
//! the suite runner, the CLI and the dashboard.

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod report;
pub mod scope;

// Re-export commonly used types
pub use config::{initialize, Browser, Config, DashboardSettings, Paths};
pub use data::{
    Credentials, DataReader, InvalidCredential, LoginCredentials, ResetEmailCase, ResetOutcome,
    TestConfig,
};
pub use error::{Error, Result};
pub use logging::{get_logger, init_logging, LogCapture, LogGuard, TestLogger};
pub use report::{list_reports, ReportInfo};
pub use scope::{SuiteTarget, TestScope};

/// SauceQA version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
