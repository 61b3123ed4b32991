//! WebDriver-backed session (chromedriver / geckodriver)

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder};
use sauceqa_common::{Browser, Config};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::BrowserDriver;
use crate::error::{E2eError, E2eResult};
use crate::locator::{By, Locator};

const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 1080;

/// Options passed to the browser
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub browser: Browser,
    pub headless: bool,
    pub webdriver_url: String,
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            browser: config.browser,
            headless: config.headless,
            webdriver_url: config.webdriver_url(),
        }
    }

    /// W3C capabilities for the new session
    pub fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        match self.browser {
            Browser::Chrome => {
                let mut args = vec![
                    "--no-sandbox".to_string(),
                    "--disable-dev-shm-usage".to_string(),
                    format!("--window-size={},{}", WINDOW_WIDTH, WINDOW_HEIGHT),
                    "--disable-notifications".to_string(),
                    "--disable-gpu".to_string(),
                ];
                if self.headless {
                    args.insert(0, "--headless=new".to_string());
                }
                caps.insert("browserName".to_string(), json!("chrome"));
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
            Browser::Firefox => {
                let args: Vec<&str> = if self.headless { vec!["-headless"] } else { vec![] };
                caps.insert("browserName".to_string(), json!("firefox"));
                caps.insert("moz:firefoxOptions".to_string(), json!({ "args": args }));
            }
        }
        caps
    }
}

/// A browser session on a WebDriver server
#[derive(Clone, Debug)]
pub struct WebDriverClient {
    client: Client,
}

impl WebDriverClient {
    /// Open a new session and size the window
    pub async fn connect(options: &SessionOptions) -> E2eResult<Self> {
        info!(
            "Initializing {} browser (Headless: {}) via {}",
            options.browser, options.headless, options.webdriver_url
        );

        let client = ClientBuilder::native()
            .capabilities(options.capabilities())
            .connect(&options.webdriver_url)
            .await
            .map_err(|e| E2eError::SessionStart(format!("{}: {}", options.webdriver_url, e)))?;

        client.set_window_size(WINDOW_WIDTH, WINDOW_HEIGHT).await?;
        info!("{} browser initialized successfully", options.browser);

        Ok(Self { client })
    }
}

#[async_trait]
impl BrowserDriver for WebDriverClient {
    type Element = Element;

    async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!("GET {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn title(&self) -> E2eResult<String> {
        Ok(self.client.title().await?)
    }

    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<Element>> {
        let css = locator.to_css();
        let search = match (locator.by, css.as_deref()) {
            (_, Some(css)) => fantoccini::Locator::Css(css),
            (By::Id, None) => fantoccini::Locator::Id(&locator.selector),
            (By::XPath, None) => fantoccini::Locator::XPath(&locator.selector),
            (_, None) => fantoccini::Locator::LinkText(&locator.selector),
        };

        match self.client.find_all(search).await {
            Ok(elements) => Ok(elements),
            Err(e) if e.is_no_such_element() => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn is_displayed(&self, element: &Element) -> E2eResult<bool> {
        Ok(element.is_displayed().await?)
    }

    async fn is_enabled(&self, element: &Element) -> E2eResult<bool> {
        Ok(element.is_enabled().await?)
    }

    async fn click(&self, element: &Element) -> E2eResult<()> {
        element.click().await?;
        Ok(())
    }

    async fn clear(&self, element: &Element) -> E2eResult<()> {
        element.clear().await?;
        Ok(())
    }

    async fn send_keys(&self, element: &Element, text: &str) -> E2eResult<()> {
        element.send_keys(text).await?;
        Ok(())
    }

    async fn text(&self, element: &Element) -> E2eResult<String> {
        Ok(element.text().await?)
    }

    async fn attribute(&self, element: &Element, name: &str) -> E2eResult<Option<String>> {
        Ok(element.attr(name).await?)
    }

    async fn property(&self, element: &Element, name: &str) -> E2eResult<Option<String>> {
        Ok(element.prop(name).await?)
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        Ok(self.client.screenshot().await?)
    }

    async fn quit(&self) -> E2eResult<()> {
        info!("Closing browser");
        self.client.clone().close().await?;
        Ok(())
    }
}
