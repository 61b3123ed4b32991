//! Element interaction capability shared by every page object

use async_trait::async_trait;
use sauceqa_common::report::timestamped_path;
use sauceqa_common::TestLogger;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::driver::BrowserDriver;
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;
use crate::wait::{wait_for_element, wait_for_elements, Condition};

/// Element handle type of an interactor's driver
pub type ElementOf<I> = <<I as ElementInteractor>::Driver as BrowserDriver>::Element;

/// Lookup, click and type helpers with explicit waits and error logging.
///
/// Implementors only expose their driver, logger and screenshot directory.
/// Timeouts are logged through the page's logger and then returned as
/// [`E2eError::ElementNotFound`] or [`E2eError::ElementNotInteractable`].
/// Driver errors are logged and returned unchanged.
#[async_trait]
pub trait ElementInteractor: Send + Sync {
    type Driver: BrowserDriver;

    fn driver(&self) -> &Self::Driver;

    fn logger(&self) -> &TestLogger;

    fn screenshot_dir(&self) -> &Path;

    /// Wait for `locator` to be present in the DOM
    async fn find_element(&self, locator: &Locator, timeout: Duration) -> E2eResult<ElementOf<Self>> {
        self.logger().log_debug(format!("Finding element: {}", locator));
        let found = wait_for_element(self.driver(), locator, Condition::Present, timeout)
            .await
            .map_err(|e| {
                self.logger().log_error(format!("Error finding element {}: {}", locator, e));
                e
            })?;
        match found {
            Some(element) => Ok(element),
            None => {
                self.logger().log_error(format!("Element not found: {}", locator));
                Err(E2eError::ElementNotFound {
                    locator: locator.clone(),
                    waited: timeout,
                })
            }
        }
    }

    /// Wait for at least one match, then return all of them
    async fn find_elements(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> E2eResult<Vec<ElementOf<Self>>> {
        self.logger().log_debug(format!("Finding elements: {}", locator));
        let found = wait_for_elements(self.driver(), locator, timeout)
            .await
            .map_err(|e| {
                self.logger().log_error(format!("Error finding elements {}: {}", locator, e));
                e
            })?;
        match found {
            Some(elements) => Ok(elements),
            None => {
                self.logger().log_error(format!("Elements not found: {}", locator));
                Err(E2eError::ElementNotFound {
                    locator: locator.clone(),
                    waited: timeout,
                })
            }
        }
    }

    /// Wait for the element to be clickable, then click it
    async fn click_element(&self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        let waited = wait_for_element(self.driver(), locator, Condition::Clickable, timeout).await;
        let clicked = match waited {
            Ok(Some(element)) => self.driver().click(&element).await.map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };
        match clicked {
            Ok(Some(())) => {
                self.logger().log_debug(format!("Clicked element: {}", locator));
                Ok(())
            }
            Err(e) => {
                self.logger().log_error(format!("Error clicking element {}: {}", locator, e));
                Err(e)
            }
            Ok(None) => {
                self.logger().log_error(format!("Element not clickable: {}", locator));
                Err(E2eError::ElementNotInteractable {
                    locator: locator.clone(),
                    waited: timeout,
                })
            }
        }
    }

    /// Replace the field's content with `text`
    async fn enter_text(&self, locator: &Locator, text: &str, timeout: Duration) -> E2eResult<()> {
        let element = self.find_element(locator, timeout).await?;
        let typed = match self.driver().clear(&element).await {
            Ok(()) => self.driver().send_keys(&element, text).await,
            Err(e) => Err(e),
        };

        match typed {
            Ok(()) => {
                self.logger()
                    .log_debug(format!("Entered text '{}' in element: {}", text, locator));
                Ok(())
            }
            Err(e) => {
                self.logger().log_error(format!("Failed to enter text: {}", e));
                Err(e)
            }
        }
    }

    async fn get_text(&self, locator: &Locator, timeout: Duration) -> E2eResult<String> {
        let element = self.find_element(locator, timeout).await?;
        match self.driver().text(&element).await {
            Ok(text) => {
                self.logger()
                    .log_debug(format!("Got text '{}' from element: {}", text, locator));
                Ok(text)
            }
            Err(e) => {
                self.logger().log_error(format!("Failed to get text: {}", e));
                Err(e)
            }
        }
    }

    async fn get_attribute(
        &self,
        locator: &Locator,
        name: &str,
        timeout: Duration,
    ) -> E2eResult<Option<String>> {
        let element = self.find_element(locator, timeout).await?;
        self.driver().attribute(&element, name).await
    }

    /// True once the element is displayed; false on timeout or driver error
    async fn is_element_visible(&self, locator: &Locator, timeout: Duration) -> bool {
        match wait_for_element(self.driver(), locator, Condition::Visible, timeout).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                self.logger()
                    .log_debug(format!("Visibility check for {} failed: {}", locator, e));
                false
            }
        }
    }

    /// Save `screenshot_<name>_<ts>.png` into the screenshot directory
    async fn take_screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        let bytes = self.driver().screenshot().await?;
        let dir = self.screenshot_dir().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;

        let path = timestamped_path(&dir, &format!("screenshot_{}", name), "png");
        tokio::fs::write(&path, bytes).await?;
        self.logger().log_info(format!(
            "Screenshot saved: {}",
            path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
        ));
        Ok(path)
    }
}
