//! SauceQA end-to-end layer
//!
//! Page objects and login scenarios for the Sauce Labs demo store, run
//! against a W3C WebDriver session or the in-memory [`driver::FakeBrowser`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 sauceqa-suite (Harness)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  catalog() -> Vec<Scenario>      Selection { suites, markers}│
//! │  SessionFactory -> BrowserDriver (one session per case)     │
//! │    ├── WebDriverClient (fantoccini)                         │
//! │    └── FakeBrowser (in-memory demo site)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Page objects                                               │
//! │    BasePage ── ElementInteractor (waits, logging, shots)    │
//! │    ├── LoginPage                                            │
//! │    ├── PasswordResetPage                                    │
//! │    └── InventoryPage                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestSuiteResult -> HTML report + JSON results              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod driver;
pub mod error;
pub mod harness;
pub mod interactor;
pub mod locator;
pub mod pages;
pub mod results;
pub mod scenarios;
pub mod wait;

pub use error::{verify, E2eError, E2eResult};
pub use harness::{exit_code, FakeSessions, Harness, HarnessOptions, SessionFactory, WebDriverSessions};
pub use interactor::ElementInteractor;
pub use locator::{By, Locator};
pub use results::{Outcome, TestResult, TestSuiteResult};
pub use scenarios::{catalog, LocalContext, Scenario, ScenarioContext, Selection};
