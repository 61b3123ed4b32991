//! Polling waits
//!
//! Conditions are probed every [`POLL_INTERVAL`] until they hold or the
//! timeout elapses. Time comes from `tokio::time`, so tests can run against a
//! paused clock.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::trace;

use crate::driver::BrowserDriver;
use crate::error::E2eResult;
use crate::locator::Locator;

pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// What a located element must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// In the DOM
    Present,
    /// In the DOM and displayed
    Visible,
    /// Displayed and enabled
    Clickable,
}

/// Probe until `probe` yields a value or `timeout` elapses.
///
/// `Ok(None)` means the timeout was reached. Transient errors are retried;
/// any other error ends the wait.
pub async fn poll_until<T, F, Fut>(timeout: Duration, mut probe: F) -> E2eResult<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        match probe().await {
            Ok(Some(value)) => return Ok(Some(value)),
            Ok(None) => {}
            Err(e) if e.is_transient() => trace!("Retrying after transient error: {}", e),
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

/// First element matching `locator` that satisfies `condition`
pub async fn wait_for_element<D: BrowserDriver>(
    driver: &D,
    locator: &Locator,
    condition: Condition,
    timeout: Duration,
) -> E2eResult<Option<D::Element>> {
    poll_until(timeout, || async move {
        for element in driver.find_all(locator).await? {
            if satisfies(driver, &element, condition).await? {
                return Ok(Some(element));
            }
        }
        Ok(None)
    })
    .await
}

/// Every element matching `locator`, once at least one is present
pub async fn wait_for_elements<D: BrowserDriver>(
    driver: &D,
    locator: &Locator,
    timeout: Duration,
) -> E2eResult<Option<Vec<D::Element>>> {
    poll_until(timeout, || async move {
        let elements = driver.find_all(locator).await?;
        Ok((!elements.is_empty()).then_some(elements))
    })
    .await
}

/// Wait for the current URL to contain `fragment`; returns the last URL seen
pub async fn wait_for_url_containing<D: BrowserDriver>(
    driver: &D,
    fragment: &str,
    timeout: Duration,
) -> E2eResult<(bool, String)> {
    let deadline = Instant::now() + timeout;
    loop {
        let url = driver.current_url().await?;
        if url.contains(fragment) {
            return Ok((true, url));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok((false, url));
        }
        sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

async fn satisfies<D: BrowserDriver>(
    driver: &D,
    element: &D::Element,
    condition: Condition,
) -> E2eResult<bool> {
    Ok(match condition {
        Condition::Present => true,
        Condition::Visible => driver.is_displayed(element).await?,
        Condition::Clickable => {
            driver.is_displayed(element).await? && driver.is_enabled(element).await?
        }
    })
}
