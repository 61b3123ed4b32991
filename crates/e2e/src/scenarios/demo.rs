//! Direct smoke checks against the live demo shop

use std::time::Duration;

use super::{Scenario, ScenarioContext};
use crate::driver::BrowserDriver;
use crate::error::{verify, E2eResult};
use crate::interactor::ElementInteractor;
use crate::pages::login::{LOGIN_REDIRECT_TIMEOUT, SUCCESS_MARKER};
use crate::pages::{BasePage, InventoryPage, LoginLocators};
use crate::wait::wait_for_url_containing;

pub const SUITE: &str = "demo";
const MARKERS: &[&str] = &["smoke", "demo"];

const SETTLE: Duration = Duration::from_secs(1);

pub fn scenarios<D: BrowserDriver>() -> Vec<Scenario<D>> {
    vec![
        Scenario::new(
            SUITE,
            MARKERS,
            "test_navigate_to_login_page",
            "Login page title mentions Swag Labs",
            navigate_to_login_page::<D>,
        ),
        Scenario::new(
            SUITE,
            MARKERS,
            "test_login_form_elements",
            "Login form fields are displayed",
            login_form_elements::<D>,
        ),
        Scenario::new(
            SUITE,
            MARKERS,
            "test_valid_login_demo",
            "standard_user reaches a non-empty inventory",
            valid_login_demo::<D>,
        ),
        Scenario::new(
            SUITE,
            MARKERS,
            "test_invalid_login_demo",
            "Unknown user gets an error banner",
            invalid_login_demo::<D>,
        ),
        Scenario::new(
            SUITE,
            MARKERS,
            "test_empty_login",
            "Empty form asks for a username",
            empty_login::<D>,
        ),
    ]
}

async fn open_login<D: BrowserDriver>(ctx: &ScenarioContext<D>) -> E2eResult<BasePage<D>> {
    let page = BasePage::new(ctx.driver.clone(), "DemoTests", &ctx.config);
    page.driver().goto(&ctx.config.login_url()).await?;
    Ok(page)
}

async fn submit<D: BrowserDriver>(page: &BasePage<D>, username: &str, password: &str) -> E2eResult<()> {
    let locators = LoginLocators::default();
    let wait = page.implicit_wait();
    let driver = page.driver();

    let username_field = page.find_element(&locators.username_input, wait).await?;
    let password_field = page.find_element(&locators.password_input, wait).await?;
    let login_button = page.find_element(&locators.login_button, wait).await?;

    driver.send_keys(&username_field, username).await?;
    driver.send_keys(&password_field, password).await?;
    driver.click(&login_button).await
}

async fn error_text<D: BrowserDriver>(page: &BasePage<D>) -> E2eResult<String> {
    page.get_text(&LoginLocators::default().error_message, SETTLE).await
}

async fn navigate_to_login_page<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = open_login(&ctx).await?;
    let title = ctx.driver.title().await?;
    ctx.logger.log_info(format!("Page Title: {}", title));
    verify(
        title.contains("Swag Labs"),
        format!("Expected 'Swag Labs' in title, got '{}'", title),
    )?;
    page.take_screenshot("login_page").await?;
    Ok(())
}

async fn login_form_elements<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = open_login(&ctx).await?;
    let locators = LoginLocators::default();

    for (label, locator) in [
        ("Username field", &locators.username_input),
        ("Password field", &locators.password_input),
        ("Login button", &locators.login_button),
    ] {
        let element = page.find_element(locator, page.implicit_wait()).await?;
        let displayed = ctx.driver.is_displayed(&element).await?;
        ctx.logger.log_info(format!("{}: {}", label, displayed));
        verify(displayed, format!("{} should be visible", label))?;
    }
    Ok(())
}

async fn valid_login_demo<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = open_login(&ctx).await?;
    submit(&page, "standard_user", "secret_sauce").await?;

    let (redirected, url) =
        wait_for_url_containing(&ctx.driver, SUCCESS_MARKER, LOGIN_REDIRECT_TIMEOUT).await?;
    ctx.logger.log_info(format!("Current URL after login: {}", url));
    verify(redirected, "Should redirect to inventory page after login")?;

    let products = InventoryPage::attach(ctx.driver.clone(), &ctx.config)
        .product_count()
        .await?;
    verify(products > 0, "Should see products after login")?;

    page.take_screenshot("login_success").await?;
    Ok(())
}

async fn invalid_login_demo<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = open_login(&ctx).await?;
    submit(&page, "invalid_user", "wrong_password").await?;

    let text = error_text(&page).await?;
    ctx.logger.log_info(format!("Error message: {}", text));
    verify(
        text.contains("Username and password do not match") || text.contains("Epic sadface"),
        format!("Should show appropriate error, got '{}'", text),
    )
}

async fn empty_login<D: BrowserDriver>(ctx: ScenarioContext<D>) -> E2eResult<()> {
    let page = open_login(&ctx).await?;
    let button = page
        .find_element(&LoginLocators::default().login_button, page.implicit_wait())
        .await?;
    ctx.driver.click(&button).await?;

    let text = error_text(&page).await?;
    ctx.logger.log_info(format!("Error message: {}", text));
    verify(
        text.contains("Username is required"),
        "Should show username required error",
    )
}
