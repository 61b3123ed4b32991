//! Login functionality

use sauceqa_common::{Credentials, InvalidCredential, TestConfig};

use super::{param_id, Scenario, ScenarioContext};
use crate::driver::BrowserDriver;
use crate::error::{verify, E2eResult};
use crate::interactor::ElementInteractor;
use crate::pages::{BasePage, LoginLocators, LoginPage};

pub const SUITE: &str = "login";
const MARKERS: &[&str] = &["login", "smoke"];

pub fn scenarios<D: BrowserDriver>(credentials: &Credentials, test_config: &TestConfig) -> Vec<Scenario<D>> {
    let mut scenarios = vec![
        Scenario::new(
            SUITE,
            MARKERS,
            "test_login_page_elements_visibility",
            "Username, password and login button are visible",
            elements_visibility::<D>,
        ),
        Scenario::new(
            SUITE,
            MARKERS,
            "test_valid_login",
            "Valid credentials redirect away from the login page",
            valid_login::<D>,
        ),
    ];

    for (index, case) in credentials.invalid.iter().enumerate() {
        let case = case.clone();
        scenarios.push(Scenario::new(
            SUITE,
            MARKERS,
            format!("test_invalid_login{}", param_id(index, &case.username)),
            format!("Rejected login shows '{}'", case.expected_error),
            move |ctx| invalid_login(ctx, case.clone()),
        ));
    }

    scenarios.push(Scenario::new(
        SUITE,
        MARKERS,
        "test_password_masking",
        "Password field has type=password",
        password_masking::<D>,
    ));
    scenarios.push(Scenario::new(
        SUITE,
        MARKERS,
        "test_empty_credentials_validation",
        "Submitting an empty form asks for a username",
        empty_credentials::<D>,
    ));

    let attempts = test_config.max_login_attempts;
    scenarios.push(Scenario::new(
        SUITE,
        MARKERS,
        "test_max_login_attempts",
        format!("{} failed attempts keep the user on the login page", attempts),
        move |ctx| max_login_attempts(ctx, attempts),
    ));

    scenarios
}

async fn elements_visibility<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = BasePage::new(ctx.driver.clone(), "LoginTests", &ctx.config);
    page.driver().goto(&ctx.config.login_url()).await?;

    let locators = LoginLocators::default();
    let mut missing = Vec::new();
    for (label, locator) in [
        ("Username input", &locators.username_input),
        ("Password input", &locators.password_input),
        ("Login button", &locators.login_button),
    ] {
        let visible = match page.find_element(locator, page.implicit_wait()).await {
            Ok(element) => page.driver().is_displayed(&element).await?,
            Err(_) => false,
        };
        ctx.logger.log_info(format!("{}: visible={}", label, visible));
        if !visible {
            missing.push(label);
        }
    }

    verify(
        missing.is_empty(),
        format!("All login page elements should be visible, missing: {:?}", missing),
    )
}

async fn valid_login<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = LoginPage::open(ctx.driver.clone(), &ctx.config).await?;
    let valid = &ctx.credentials.valid;
    page.login(&valid.username, &valid.password).await?;

    let success = page.is_login_successful().await?;
    let url = ctx.driver.current_url().await?;
    ctx.logger.log_info(format!("Current URL: {}", url));
    verify(success, format!("Should redirect to the inventory page, got {}", url))
}

async fn invalid_login<D: BrowserDriver>(ctx: ScenarioContext<D>, case: InvalidCredential) -> E2eResult<()> {
    let page = LoginPage::open(ctx.driver.clone(), &ctx.config).await?;
    page.login(&case.username, &case.password).await?;

    let message = page.get_error_message().await?;
    ctx.logger.log_info(format!("Error message: {:?}", message));
    let message = match message {
        Some(message) => message,
        None => return verify(false, "Error message should be displayed"),
    };
    verify(
        message.contains(&case.expected_error),
        format!("Expected '{}', got '{}'", case.expected_error, message),
    )
}

async fn password_masking<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = LoginPage::open(ctx.driver.clone(), &ctx.config).await?;
    let wait = page.base().explicit_wait();
    page.enter_text(&page.locators.password_input, "Test@123", wait).await?;

    let field_type = page
        .get_attribute(&page.locators.password_input, "type", wait)
        .await?
        .unwrap_or_default();
    verify(
        field_type == "password",
        format!("Password field type should be 'password', got '{}'", field_type),
    )
}

async fn empty_credentials<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = LoginPage::open(ctx.driver.clone(), &ctx.config).await?;
    page.login("", "").await?;

    let message = page.get_error_message().await?.unwrap_or_default();
    verify(
        message.contains("Username is required"),
        format!("Should show username required error, got '{}'", message),
    )
}

async fn max_login_attempts<D: BrowserDriver>(ctx: ScenarioContext<D>, attempts: u32) -> E2eResult<()> {
    let page = LoginPage::open(ctx.driver.clone(), &ctx.config).await?;

    for attempt in 1..=attempts {
        page.login("invalid_user", "wrong_password").await?;
        let message = page.get_error_message().await?;
        ctx.logger
            .log_info(format!("Attempt {}/{}: {:?}", attempt, attempts, message));
        verify(message.is_some(), format!("Attempt {} should be rejected", attempt))?;
    }

    verify(
        page.is_login_page_loaded().await,
        "Login form should still be shown after repeated failures",
    )?;
    verify(
        !page.is_login_successful().await?,
        "Repeated failures must not log the user in",
    )
}
