//! Browser driver seam
//!
//! Page objects only talk to a [`BrowserDriver`]. Two implementations ship:
//! [`WebDriverClient`] drives a real browser through a W3C WebDriver server,
//! [`FakeBrowser`] serves an in-memory copy of the demo site.

use async_trait::async_trait;

use crate::error::E2eResult;
use crate::locator::Locator;

pub mod fake;
pub mod webdriver;

pub use fake::{FakeBrowser, FakeElement};
pub use webdriver::WebDriverClient;

/// One live browser session.
///
/// Clones share the session; [`BrowserDriver::quit`] ends it for all of them.
#[async_trait]
pub trait BrowserDriver: Clone + Send + Sync + 'static {
    /// Handle to an element on the current page
    type Element: Clone + Send + Sync + 'static;

    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn current_url(&self) -> E2eResult<String>;

    async fn title(&self) -> E2eResult<String>;

    /// Every element currently matching `locator`; empty when none do
    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<Self::Element>>;

    async fn is_displayed(&self, element: &Self::Element) -> E2eResult<bool>;

    async fn is_enabled(&self, element: &Self::Element) -> E2eResult<bool>;

    async fn click(&self, element: &Self::Element) -> E2eResult<()>;

    async fn clear(&self, element: &Self::Element) -> E2eResult<()>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> E2eResult<()>;

    async fn text(&self, element: &Self::Element) -> E2eResult<String>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> E2eResult<Option<String>>;

    async fn property(&self, element: &Self::Element, name: &str) -> E2eResult<Option<String>>;

    /// PNG bytes of the viewport
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    async fn quit(&self) -> E2eResult<()>;
}
