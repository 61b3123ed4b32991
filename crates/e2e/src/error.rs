//! Error types for page objects and the scenario harness

use std::time::Duration;
use thiserror::Error;

use crate::locator::Locator;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Element not found: {locator} (waited {}s)", waited.as_secs_f64())]
    ElementNotFound { locator: Locator, waited: Duration },

    #[error("Element not interactable: {locator} (waited {}s)", waited.as_secs_f64())]
    ElementNotInteractable { locator: Locator, waited: Duration },

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("Browser initialization failed: {0}")]
    SessionStart(String),

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Scenario panicked: {0}")]
    Panicked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Data(#[from] sauceqa_common::Error),
}

impl E2eError {
    /// Errors a polling wait retries through
    pub fn is_transient(&self) -> bool {
        matches!(self, E2eError::StaleElement(_))
    }
}

impl From<fantoccini::error::CmdError> for E2eError {
    fn from(e: fantoccini::error::CmdError) -> Self {
        let message = e.to_string();
        if message.contains("stale element") {
            E2eError::StaleElement(message)
        } else {
            E2eError::WebDriver(message)
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Fail the scenario with `message` unless `condition` holds
pub fn verify(condition: bool, message: impl Into<String>) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(message.into()))
    }
}
