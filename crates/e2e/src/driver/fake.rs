//! In-memory browser
//!
//! [`FakeBrowser`] keeps a tiny DOM per session and answers the same probes a
//! WebDriver server would. [`FakeBrowser::sauce_demo`] serves a copy of the
//! SauceDemo login flow and the password reset stand-in, which is what the
//! `--offline` suite mode and the crate tests run against.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::BrowserDriver;
use crate::error::{E2eError, E2eResult};
use crate::locator::{By, Locator};

type Handler = Arc<dyn Fn(&mut FakeDom) + Send + Sync>;
type Renderer = Arc<dyn Fn(&mut FakeDom, &str) + Send + Sync>;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Element description used to build fake pages
#[derive(Clone, Default)]
pub struct FakeElement {
    pub tag: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub classes: Vec<String>,
    /// Extra CSS or XPath selectors the element answers to
    pub selectors: Vec<String>,
    pub text: String,
    pub value: String,
    pub attributes: HashMap<String, String>,
    pub displayed: bool,
    pub enabled: bool,
    /// Delay between rendering and the element entering the DOM
    pub appears_after: Duration,
    on_click: Option<Handler>,
}

impl FakeElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            displayed: true,
            enabled: true,
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_after = delay;
        self
    }

    pub fn on_click<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut FakeDom) + Send + Sync + 'static,
    {
        self.on_click = Some(Arc::new(handler));
        self
    }

    fn matches(&self, locator: &Locator) -> bool {
        let sel = locator.selector.as_str();
        match locator.by {
            By::Id => self.id.as_deref() == Some(sel),
            By::Name => self.name.as_deref() == Some(sel),
            By::ClassName => self.has_class(sel),
            By::TagName => self.tag.eq_ignore_ascii_case(sel),
            By::LinkText => self.tag == "a" && self.text == sel,
            By::XPath => self.selectors.iter().any(|s| s == sel),
            By::Css => {
                if let Some(id) = sel.strip_prefix('#') {
                    return self.id.as_deref() == Some(id);
                }
                if let Some(class) = sel.strip_prefix('.') {
                    return self.has_class(class);
                }
                self.tag == sel || self.selectors.iter().any(|s| s == sel)
            }
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

struct Node {
    element: FakeElement,
    present_at: Instant,
}

/// Mutable state of one fake session
pub struct FakeDom {
    url: String,
    title: String,
    /// Bumped on every render; older element handles go stale
    generation: u64,
    nodes: Vec<Node>,
    routes: Vec<(String, Renderer)>,
    cookies: HashMap<String, String>,
    history: Vec<String>,
    closed: bool,
}

impl FakeDom {
    fn new() -> Self {
        Self {
            url: "about:blank".to_string(),
            title: String::new(),
            generation: 0,
            nodes: Vec::new(),
            routes: Vec::new(),
            cookies: HashMap::new(),
            history: Vec::new(),
            closed: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Load `url` through the longest matching route; unknown URLs render blank
    pub fn navigate(&mut self, url: &str) {
        self.url = url.to_string();
        self.history.push(url.to_string());

        let renderer = self
            .routes
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, renderer)| renderer.clone());

        match renderer {
            Some(renderer) => renderer(self, url),
            None => self.render("", Vec::new()),
        }
    }

    /// Replace the page content
    pub fn render(&mut self, title: &str, elements: Vec<FakeElement>) {
        let now = Instant::now();
        self.title = title.to_string();
        self.generation += 1;
        self.nodes = elements
            .into_iter()
            .map(|element| Node {
                present_at: now + element.appears_after,
                element,
            })
            .collect();
    }

    /// Add an element, replacing one with the same id
    pub fn upsert(&mut self, element: FakeElement) {
        let node = Node {
            present_at: Instant::now() + element.appears_after,
            element,
        };
        let existing = node
            .element
            .id
            .as_ref()
            .and_then(|id| self.nodes.iter().position(|n| n.element.id.as_ref() == Some(id)));
        match existing {
            Some(index) => self.nodes[index] = node,
            None => self.nodes.push(node),
        }
    }

    /// Current value of the input with `id`
    pub fn value_of(&self, id: &str) -> String {
        self.nodes
            .iter()
            .find(|n| n.element.id.as_deref() == Some(id))
            .map(|n| n.element.value.clone())
            .unwrap_or_default()
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    fn ensure_open(&self) -> E2eResult<()> {
        if self.closed {
            Err(E2eError::WebDriver("invalid session id".to_string()))
        } else {
            Ok(())
        }
    }

    fn node(&self, handle: &FakeHandle) -> E2eResult<&Node> {
        self.ensure_open()?;
        if handle.generation != self.generation {
            return Err(E2eError::StaleElement(
                "element is not attached to the page document".to_string(),
            ));
        }
        self.nodes
            .get(handle.index)
            .ok_or_else(|| E2eError::StaleElement("element no longer exists".to_string()))
    }

    fn node_mut(&mut self, handle: &FakeHandle) -> E2eResult<&mut Node> {
        self.node(handle)?;
        Ok(&mut self.nodes[handle.index])
    }
}

/// Handle to an element of a rendered fake page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeHandle {
    generation: u64,
    index: usize,
}

/// In-memory browser session
#[derive(Clone)]
pub struct FakeBrowser {
    dom: Arc<Mutex<FakeDom>>,
}

impl fmt::Debug for FakeBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dom = self.dom.lock();
        f.debug_struct("FakeBrowser")
            .field("url", &dom.url)
            .field("closed", &dom.closed)
            .finish()
    }
}

impl Default for FakeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBrowser {
    /// Blank session with no routes
    pub fn new() -> Self {
        Self {
            dom: Arc::new(Mutex::new(FakeDom::new())),
        }
    }

    /// Serve pages for URLs starting with `prefix`
    pub fn route<F>(&self, prefix: impl Into<String>, renderer: F) -> &Self
    where
        F: Fn(&mut FakeDom, &str) + Send + Sync + 'static,
    {
        self.dom.lock().routes.push((prefix.into(), Arc::new(renderer)));
        self
    }

    /// Session serving the SauceDemo shop at `base_url` and the reset stand-in
    /// at `reset_url`
    pub fn sauce_demo(base_url: &str, reset_url: &str) -> Self {
        let browser = Self::new();
        let base: Arc<str> = Arc::from(base_url.trim_end_matches('/'));

        let login_base = base.clone();
        browser.route(base.to_string(), move |dom, _| {
            render_login(dom, login_base.clone(), None)
        });

        let inventory_base = base.clone();
        browser.route(format!("{}/inventory.html", base), move |dom, _| {
            if dom.cookie(SESSION_COOKIE).is_some() {
                render_inventory(dom);
            } else {
                render_login(
                    dom,
                    inventory_base.clone(),
                    Some("Epic sadface: You can only access '/inventory.html' when you are logged in."),
                );
            }
        });

        let reset: Arc<str> = Arc::from(reset_url);
        let site_root = reset_url
            .rsplit_once('/')
            .map(|(root, _)| root.to_string())
            .unwrap_or_else(|| reset_url.to_string());
        browser.route(site_root, move |dom, url| {
            render_reset(dom, reset.clone(), url.contains("doLogin"))
        });

        browser
    }

    /// Current page URL
    pub fn url(&self) -> String {
        self.dom.lock().url.clone()
    }

    /// Every URL loaded, in order
    pub fn history(&self) -> Vec<String> {
        self.dom.lock().history.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.dom.lock().closed
    }

    /// Run `f` against the DOM, e.g. to add elements from a test
    pub fn with_dom<R>(&self, f: impl FnOnce(&mut FakeDom) -> R) -> R {
        f(&mut *self.dom.lock())
    }
}

#[async_trait]
impl BrowserDriver for FakeBrowser {
    type Element = FakeHandle;

    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut dom = self.dom.lock();
        dom.ensure_open()?;
        dom.navigate(url);
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        let dom = self.dom.lock();
        dom.ensure_open()?;
        Ok(dom.url.clone())
    }

    async fn title(&self) -> E2eResult<String> {
        let dom = self.dom.lock();
        dom.ensure_open()?;
        Ok(dom.title.clone())
    }

    async fn find_all(&self, locator: &Locator) -> E2eResult<Vec<FakeHandle>> {
        let dom = self.dom.lock();
        dom.ensure_open()?;
        let now = Instant::now();
        Ok(dom
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.present_at <= now && node.element.matches(locator))
            .map(|(index, _)| FakeHandle {
                generation: dom.generation,
                index,
            })
            .collect())
    }

    async fn is_displayed(&self, element: &FakeHandle) -> E2eResult<bool> {
        Ok(self.dom.lock().node(element)?.element.displayed)
    }

    async fn is_enabled(&self, element: &FakeHandle) -> E2eResult<bool> {
        Ok(self.dom.lock().node(element)?.element.enabled)
    }

    async fn click(&self, element: &FakeHandle) -> E2eResult<()> {
        let mut dom = self.dom.lock();
        let node = dom.node(element)?;
        if !node.element.displayed || !node.element.enabled {
            return Err(E2eError::WebDriver("element not interactable".to_string()));
        }
        if let Some(handler) = node.element.on_click.clone() {
            handler(&mut *dom);
        }
        Ok(())
    }

    async fn clear(&self, element: &FakeHandle) -> E2eResult<()> {
        self.dom.lock().node_mut(element)?.element.value.clear();
        Ok(())
    }

    async fn send_keys(&self, element: &FakeHandle, text: &str) -> E2eResult<()> {
        let mut dom = self.dom.lock();
        let node = dom.node_mut(element)?;
        if !node.element.displayed || !node.element.enabled {
            return Err(E2eError::WebDriver("element not interactable".to_string()));
        }
        node.element.value.push_str(text);
        Ok(())
    }

    async fn text(&self, element: &FakeHandle) -> E2eResult<String> {
        let dom = self.dom.lock();
        let node = dom.node(element)?;
        // WebDriver reports rendered text only
        if node.element.displayed {
            Ok(node.element.text.clone())
        } else {
            Ok(String::new())
        }
    }

    async fn attribute(&self, element: &FakeHandle, name: &str) -> E2eResult<Option<String>> {
        let dom = self.dom.lock();
        let el = &dom.node(element)?.element;
        Ok(match name {
            "id" => el.id.clone(),
            "name" => el.name.clone(),
            "class" if !el.classes.is_empty() => Some(el.classes.join(" ")),
            "value" => Some(el.value.clone()),
            _ => el.attributes.get(name).cloned(),
        })
    }

    async fn property(&self, element: &FakeHandle, name: &str) -> E2eResult<Option<String>> {
        let dom = self.dom.lock();
        let el = &dom.node(element)?.element;
        Ok(match name {
            "value" => Some(el.value.clone()),
            "textContent" => Some(el.text.clone()),
            _ => el.attributes.get(name).cloned(),
        })
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let dom = self.dom.lock();
        dom.ensure_open()?;
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(dom.url.as_bytes());
        Ok(bytes)
    }

    async fn quit(&self) -> E2eResult<()> {
        let mut dom = self.dom.lock();
        dom.ensure_open()?;
        dom.closed = true;
        dom.nodes.clear();
        Ok(())
    }
}

const SESSION_COOKIE: &str = "session-username";
const DEMO_PASSWORD: &str = "secret_sauce";
const DEMO_USERS: &[&str] = &[
    "standard_user",
    "locked_out_user",
    "problem_user",
    "performance_glitch_user",
    "error_user",
    "visual_user",
];
const DEMO_PRODUCTS: &[&str] = &[
    "Sauce Labs Backpack",
    "Sauce Labs Bike Light",
    "Sauce Labs Bolt T-Shirt",
    "Sauce Labs Fleece Jacket",
    "Sauce Labs Onesie",
    "Test.allTheThings() T-Shirt (Red)",
];

fn render_login(dom: &mut FakeDom, base: Arc<str>, error: Option<&str>) {
    let submit = FakeElement::new("input")
        .id("login-button")
        .name("login-button")
        .class("submit-button")
        .class("btn_action")
        .attr("type", "submit")
        .value("Login")
        .on_click(move |dom| submit_login(dom, &base));

    let mut elements = vec![
        FakeElement::new("div").id("login_button_container").class("form_column"),
        FakeElement::new("input")
            .id("user-name")
            .name("user-name")
            .class("input_error")
            .attr("type", "text")
            .attr("placeholder", "Username")
            .attr("data-test", "username"),
        FakeElement::new("input")
            .id("password")
            .name("password")
            .class("input_error")
            .attr("type", "password")
            .attr("placeholder", "Password")
            .attr("data-test", "password"),
        submit,
    ];
    if let Some(message) = error {
        elements.push(error_banner(message));
    }
    dom.render("Swag Labs", elements);
}

fn error_banner(message: &str) -> FakeElement {
    FakeElement::new("h3")
        .id("login-error")
        .attr("data-test", "error")
        .selector("h3[data-test='error']")
        .text(message)
}

fn submit_login(dom: &mut FakeDom, base: &str) {
    let username = dom.value_of("user-name");
    let password = dom.value_of("password");

    let error = if username.is_empty() {
        Some("Epic sadface: Username is required")
    } else if password.is_empty() {
        Some("Epic sadface: Password is required")
    } else if !DEMO_USERS.contains(&username.as_str()) || password != DEMO_PASSWORD {
        Some("Epic sadface: Username and password do not match any user in this service")
    } else if username == "locked_out_user" {
        Some("Epic sadface: Sorry, this user has been locked out.")
    } else {
        None
    };

    match error {
        Some(message) => dom.upsert(error_banner(message)),
        None => {
            dom.set_cookie(SESSION_COOKIE, username);
            dom.navigate(&format!("{}/inventory.html", base));
        }
    }
}

fn render_inventory(dom: &mut FakeDom) {
    let mut elements = vec![
        FakeElement::new("span").class("title").text("Products"),
        FakeElement::new("div").class("inventory_list"),
    ];
    elements.extend(DEMO_PRODUCTS.iter().map(|name| {
        FakeElement::new("div")
            .class("inventory_item")
            .selector("[data-test='inventory-item']")
            .text(*name)
    }));
    dom.render("Swag Labs", elements);
}

fn render_reset(dom: &mut FakeDom, reset_url: Arc<str>, submitted: bool) {
    let submit_url = reset_url.replace("login.jsp", "doLogin");
    let back_url = reset_url.clone();

    let mut elements = vec![
        FakeElement::new("input")
            .id("uid")
            .name("uid")
            .attr("type", "text"),
        FakeElement::new("input")
            .id("passw")
            .name("passw")
            .attr("type", "password"),
        FakeElement::new("input")
            .name("btnSubmit")
            .attr("type", "submit")
            .value("Login")
            .on_click(move |dom| dom.navigate(&submit_url)),
        FakeElement::new("a")
            .id("LoginLink")
            .attr("href", "login.jsp")
            .text("Sign In")
            .on_click(move |dom| dom.navigate(&back_url)),
    ];
    if submitted {
        elements.push(
            FakeElement::new("span")
                .id("_ctl0__ctl0_Content_Main_message")
                .text("Login Failed: We're sorry, but this username or password was not found in our system. Please try again."),
        );
    }
    dom.render("Altoro Mutual", elements);
}
