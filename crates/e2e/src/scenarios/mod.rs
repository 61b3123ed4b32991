//! Scenario catalog
//!
//! A [`Scenario`] is a named async body run against a fresh browser session,
//! or without any browser for the framework checks. Parametrized scenarios are
//! expanded into one case per parameter when the catalog is built, so each
//! instance passes or fails on its own.

use futures::future::BoxFuture;
use futures::FutureExt;
use sauceqa_common::{Config, Credentials, TestConfig, TestLogger};
use std::future::Future;
use std::sync::Arc;

use crate::driver::BrowserDriver;
use crate::error::E2eResult;

pub mod demo;
pub mod framework;
pub mod login;
pub mod password_reset;

/// Everything a scenario body gets
pub struct ScenarioContext<D> {
    pub driver: D,
    pub config: Arc<Config>,
    pub credentials: Arc<Credentials>,
    pub test_config: Arc<TestConfig>,
    pub logger: TestLogger,
}

/// What a browserless scenario gets
pub struct LocalContext {
    pub config: Arc<Config>,
    pub credentials: Arc<Credentials>,
    pub test_config: Arc<TestConfig>,
    pub logger: TestLogger,
}

pub(crate) type CaseFuture = BoxFuture<'static, E2eResult<()>>;

pub(crate) enum Body<D> {
    Browser(Arc<dyn Fn(ScenarioContext<D>) -> CaseFuture + Send + Sync>),
    Local(Arc<dyn Fn(LocalContext) -> CaseFuture + Send + Sync>),
}

impl<D> Clone for Body<D> {
    fn clone(&self) -> Self {
        match self {
            Body::Browser(body) => Body::Browser(body.clone()),
            Body::Local(body) => Body::Local(body.clone()),
        }
    }
}

pub struct Scenario<D> {
    pub name: String,
    pub suite: &'static str,
    pub markers: &'static [&'static str],
    pub description: String,
    body: Body<D>,
}

impl<D> Clone for Scenario<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            suite: self.suite,
            markers: self.markers,
            description: self.description.clone(),
            body: self.body.clone(),
        }
    }
}

impl<D: BrowserDriver> Scenario<D> {
    pub fn new<F, Fut>(
        suite: &'static str,
        markers: &'static [&'static str],
        name: impl Into<String>,
        description: impl Into<String>,
        body: F,
    ) -> Self
    where
        F: Fn(ScenarioContext<D>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = E2eResult<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            suite,
            markers,
            description: description.into(),
            body: Body::Browser(Arc::new(move |ctx| body(ctx).boxed())),
        }
    }

    /// A scenario that runs without opening a browser session
    pub fn local<F, Fut>(
        suite: &'static str,
        markers: &'static [&'static str],
        name: impl Into<String>,
        description: impl Into<String>,
        body: F,
    ) -> Self
    where
        F: Fn(LocalContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = E2eResult<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            suite,
            markers,
            description: description.into(),
            body: Body::Local(Arc::new(move |ctx| body(ctx).boxed())),
        }
    }

    pub fn needs_browser(&self) -> bool {
        matches!(self.body, Body::Browser(_))
    }

    pub(crate) fn body(&self) -> &Body<D> {
        &self.body
    }

    /// `suite::name`
    pub fn id(&self) -> String {
        format!("{}::{}", self.suite, self.name)
    }
}

/// Which cases to run; empty lists select everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub suites: Vec<String>,
    pub markers: Vec<String>,
}

impl Selection {
    pub fn matches<D>(&self, scenario: &Scenario<D>) -> bool {
        let suite_ok = self.suites.is_empty() || self.suites.iter().any(|s| s == scenario.suite);
        let marker_ok = self.markers.is_empty()
            || self
                .markers
                .iter()
                .any(|m| scenario.markers.contains(&m.as_str()));
        suite_ok && marker_ok
    }

    pub fn apply<D>(&self, scenarios: Vec<Scenario<D>>) -> Vec<Scenario<D>> {
        scenarios.into_iter().filter(|s| self.matches(s)).collect()
    }
}

/// Every suite, expanded over the fixture data
pub fn catalog<D: BrowserDriver>(credentials: &Credentials, test_config: &TestConfig) -> Vec<Scenario<D>> {
    let mut scenarios = framework::scenarios();
    scenarios.extend(login::scenarios(credentials, test_config));
    scenarios.extend(password_reset::scenarios(credentials));
    scenarios.extend(demo::scenarios());
    scenarios
}

/// Known suite names
pub const SUITES: &[&str] = &[framework::SUITE, login::SUITE, password_reset::SUITE, demo::SUITE];

/// Known markers
pub const MARKERS: &[&str] = &["framework", "login", "password_reset", "smoke", "demo"];

/// Bracketed parameter id, e.g. `[0-locked_out_user]`
pub(crate) fn param_id(index: usize, value: &str) -> String {
    let value: String = value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || "@._-".contains(c) { c } else { '_' })
        .collect();
    if value.is_empty() {
        format!("[{}-empty]", index)
    } else {
        format!("[{}-{}]", index, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::FakeBrowser;

    fn default_catalog() -> Vec<Scenario<FakeBrowser>> {
        catalog(&Credentials::default_fixture(), &TestConfig::default())
    }

    #[test]
    fn test_catalog_expands_fixture_params() {
        let scenarios = default_catalog();
        let invalid: Vec<_> = scenarios
            .iter()
            .filter(|s| s.name.starts_with("test_invalid_login["))
            .collect();
        assert_eq!(invalid.len(), Credentials::default_fixture().invalid.len());
        assert_eq!(invalid[1].name, "test_invalid_login[1-empty]");

        let mut ids: Vec<String> = scenarios.iter().map(|s| s.id()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before, "case ids must be unique");
    }

    #[test]
    fn test_selection() {
        let scenarios = default_catalog();
        let total = scenarios.len();

        let all = Selection::default().apply(scenarios.clone());
        assert_eq!(all.len(), total);

        let reset = Selection {
            suites: vec!["password_reset".to_string()],
            ..Default::default()
        }
        .apply(scenarios.clone());
        assert!(!reset.is_empty());
        assert!(reset.iter().all(|s| s.suite == "password_reset"));

        let smoke = Selection {
            markers: vec!["smoke".to_string()],
            ..Default::default()
        }
        .apply(scenarios.clone());
        assert!(smoke.iter().all(|s| s.markers.contains(&"smoke")));
        assert!(smoke.iter().any(|s| s.suite == "login"));
        assert!(smoke.iter().any(|s| s.suite == "demo"));
        assert!(smoke.iter().any(|s| s.suite == "framework"));
        assert!(smoke.iter().all(|s| s.suite != "password_reset"));

        let none = Selection {
            suites: vec!["regression".to_string()],
            ..Default::default()
        }
        .apply(scenarios);
        assert!(none.is_empty());
    }

    #[test]
    fn test_markers_are_registered() {
        for scenario in default_catalog() {
            for marker in scenario.markers {
                assert!(MARKERS.contains(marker), "{} uses unknown marker {}", scenario.id(), marker);
            }
            assert!(SUITES.contains(&scenario.suite));
        }
    }

    #[test]
    fn test_param_id() {
        assert_eq!(param_id(2, "test@example.com"), "[2-test@example.com]");
        assert_eq!(param_id(0, "a b"), "[0-a_b]");
    }
}
