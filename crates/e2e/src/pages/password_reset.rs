//! Password reset page on the secondary demo site

use sauceqa_common::{Config, TestLogger};
use std::path::Path;

use super::BasePage;
use crate::driver::BrowserDriver;
use crate::error::E2eResult;
use crate::interactor::ElementInteractor;
use crate::locator::Locator;

/// Locators of the reset stand-in page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetLocators {
    pub email_input: Locator,
    pub reset_button: Locator,
    pub back_to_login_link: Locator,
}

impl Default for PasswordResetLocators {
    fn default() -> Self {
        Self {
            email_input: Locator::id("uid"),
            reset_button: Locator::name("btnSubmit"),
            back_to_login_link: Locator::link_text("Sign In"),
        }
    }
}

/// SauceDemo has no reset flow; this page drives the sign-in form of a
/// second public demo site instead.
pub struct PasswordResetPage<D> {
    base: BasePage<D>,
    url: String,
    pub locators: PasswordResetLocators,
}

impl<D: BrowserDriver> PasswordResetPage<D> {
    pub async fn open(driver: D, config: &Config) -> E2eResult<Self> {
        let page = Self {
            base: BasePage::new(driver, "PasswordResetPage", config),
            url: config.demo_reset_url.clone(),
            locators: PasswordResetLocators::default(),
        };
        page.driver().goto(&page.url).await?;
        page.logger().log_test_start();
        Ok(page)
    }

    pub async fn navigate_to_reset_page(&self) -> E2eResult<()> {
        self.driver().goto(&self.url).await?;
        self.logger()
            .log_info(format!("Navigated to demo reset page: {}", self.url));
        Ok(())
    }

    /// Type `email` and submit the form
    pub async fn request_reset(&self, email: &str) -> E2eResult<()> {
        let wait = self.base.explicit_wait();
        self.enter_text(&self.locators.email_input, email, wait).await?;
        self.click_element(&self.locators.reset_button, wait).await?;
        self.logger()
            .log_info(format!("Password reset requested for: {:?}", email));
        Ok(())
    }

    pub async fn back_to_login(&self) -> E2eResult<()> {
        self.click_element(&self.locators.back_to_login_link, self.base.explicit_wait())
            .await
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn base(&self) -> &BasePage<D> {
        &self.base
    }
}

impl<D: BrowserDriver> ElementInteractor for PasswordResetPage<D> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::FakeBrowser;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_opens_fixed_url_and_submits() {
        let config = Config::default();
        let browser = FakeBrowser::sauce_demo(&config.base_url, &config.demo_reset_url);

        let page = PasswordResetPage::open(browser.clone(), &config).await.unwrap();
        assert_eq!(browser.url(), "https://demo.testfire.net/login.jsp");
        for locator in [
            &page.locators.email_input,
            &page.locators.reset_button,
            &page.locators.back_to_login_link,
        ] {
            assert!(page.is_element_visible(locator, Duration::from_secs(5)).await);
        }

        page.request_reset("test@example.com").await.unwrap();
        assert_ne!(browser.url(), page.url());

        page.back_to_login().await.unwrap();
        assert_eq!(browser.url(), page.url());

        page.navigate_to_reset_page().await.unwrap();
        assert_eq!(browser.history().len(), 4);
    }
}
