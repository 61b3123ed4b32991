//! Password reset against the demo stand-in page

use sauceqa_common::{Credentials, ResetEmailCase};
use std::time::Duration;

use super::{param_id, Scenario, ScenarioContext};
use crate::driver::BrowserDriver;
use crate::error::{verify, E2eResult};
use crate::interactor::ElementInteractor;
use crate::pages::PasswordResetPage;

pub const SUITE: &str = "password_reset";
const MARKERS: &[&str] = &["password_reset"];

const ELEMENT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn scenarios<D: BrowserDriver>(credentials: &Credentials) -> Vec<Scenario<D>> {
    let mut scenarios = vec![Scenario::new(
        SUITE,
        MARKERS,
        "test_password_reset_page_elements",
        "Email input, reset button and back link are visible",
        page_elements::<D>,
    )];

    for (index, case) in credentials.reset_emails.iter().enumerate() {
        let case = case.clone();
        scenarios.push(Scenario::new(
            SUITE,
            MARKERS,
            format!("test_password_reset_requests{}", param_id(index, &case.email)),
            format!("Reset request for {:?} is submitted", case.email),
            move |ctx| reset_request(ctx, case.clone()),
        ));
    }

    scenarios.push(Scenario::new(
        SUITE,
        MARKERS,
        "test_back_to_login_navigation",
        "Back link leads to a sign-in page",
        back_to_login::<D>,
    ));
    scenarios
}

async fn page_elements<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = PasswordResetPage::open(ctx.driver.clone(), &ctx.config).await?;

    for (label, locator) in [
        ("Email input", &page.locators.email_input),
        ("Reset button", &page.locators.reset_button),
        ("Back to login link", &page.locators.back_to_login_link),
    ] {
        let visible = page.is_element_visible(locator, ELEMENT_TIMEOUT).await;
        ctx.logger.log_info(format!("{}: visible={}", label, visible));
        verify(visible, format!("{} should be visible", label))?;
    }
    Ok(())
}

async fn reset_request<D: BrowserDriver>(ctx: ScenarioContext<D>, case: ResetEmailCase) -> E2eResult<()> {
    let page = PasswordResetPage::open(ctx.driver.clone(), &ctx.config).await?;
    ctx.logger.log_info(format!(
        "Requesting reset for {:?}, expecting {:?}",
        case.email, case.expected_result
    ));
    page.request_reset(&case.email).await?;

    let url = ctx.driver.current_url().await?;
    verify(
        url != "about:blank" && url != page.url(),
        format!("Reset form should have been submitted, still at {}", url),
    )
}

async fn back_to_login<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = PasswordResetPage::open(ctx.driver.clone(), &ctx.config).await?;
    page.back_to_login().await?;

    let url = ctx.driver.current_url().await?;
    ctx.logger.log_info(format!("Current URL: {}", url));
    verify(url != "about:blank", "Should navigate to login page")
}
