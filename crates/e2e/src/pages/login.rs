//! SauceDemo login page

use sauceqa_common::{Config, TestLogger};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::BasePage;
use crate::driver::BrowserDriver;
use crate::error::E2eResult;
use crate::interactor::ElementInteractor;
use crate::locator::Locator;
use crate::wait::wait_for_url_containing;

/// How long an error banner may take to show up
pub const ERROR_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a successful login may take to redirect
pub const LOGIN_REDIRECT_TIMEOUT: Duration = Duration::from_secs(2);

/// URL fragment of the page a successful login lands on
pub const SUCCESS_MARKER: &str = "inventory";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginLocators {
    pub username_input: Locator,
    pub password_input: Locator,
    pub login_button: Locator,
    pub error_message: Locator,
    pub login_container: Locator,
}

impl Default for LoginLocators {
    fn default() -> Self {
        Self {
            username_input: Locator::id("user-name"),
            password_input: Locator::id("password"),
            login_button: Locator::id("login-button"),
            error_message: Locator::css("h3[data-test='error']"),
            login_container: Locator::id("login_button_container"),
        }
    }
}

/// The SauceDemo login screen
pub struct LoginPage<D> {
    base: BasePage<D>,
    pub locators: LoginLocators,
}

impl<D: BrowserDriver> LoginPage<D> {
    /// Navigate to the login URL and open the test log section
    pub async fn open(driver: D, config: &Config) -> E2eResult<Self> {
        let base = BasePage::new(driver, "LoginPage", config);
        let url = config.login_url();
        base.driver().goto(&url).await?;
        base.logger().log_info(format!("Navigated to: {}", url));
        base.logger().log_test_start();

        Ok(Self {
            base,
            locators: LoginLocators::default(),
        })
    }

    /// Fill both fields and submit
    pub async fn login(&self, username: &str, password: &str) -> E2eResult<()> {
        self.logger()
            .log_info(format!("Attempting login with username: {}", username));

        let wait = self.base.explicit_wait();
        self.enter_text(&self.locators.username_input, username, wait).await?;
        self.enter_text(&self.locators.password_input, password, wait).await?;
        self.click_element(&self.locators.login_button, wait).await?;

        self.logger().log_info("Login button clicked");
        Ok(())
    }

    /// Error banner text, or `None` if no banner shows up in time
    pub async fn get_error_message(&self) -> E2eResult<Option<String>> {
        if self
            .is_element_visible(&self.locators.error_message, ERROR_MESSAGE_TIMEOUT)
            .await
        {
            let text = self
                .get_text(&self.locators.error_message, self.base.explicit_wait())
                .await?;
            Ok(Some(text))
        } else {
            Ok(None)
        }
    }

    /// Whether the session reached the inventory page
    pub async fn is_login_successful(&self) -> E2eResult<bool> {
        let (success, url) =
            wait_for_url_containing(self.driver(), SUCCESS_MARKER, LOGIN_REDIRECT_TIMEOUT).await?;
        self.logger().log_debug(format!("URL after login: {}", url));
        Ok(success)
    }

    pub async fn is_login_page_loaded(&self) -> bool {
        self.is_element_visible(&self.locators.login_container, self.base.implicit_wait())
            .await
    }

    pub async fn take_login_screenshot(&self) -> E2eResult<PathBuf> {
        self.take_screenshot("login_page").await
    }

    pub fn base(&self) -> &BasePage<D> {
        &self.base
    }
}

impl<D: BrowserDriver> ElementInteractor for LoginPage<D> {
    type Driver = D;

    fn driver(&self) -> &D {
        self.base.driver()
    }

    fn logger(&self) -> &TestLogger {
        self.base.logger()
    }

    fn screenshot_dir(&self) -> &Path {
        self.base.screenshot_dir()
    }
}
