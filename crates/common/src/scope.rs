//! Test scopes accepted by `--test-type` and the dashboard run endpoints

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// What a run executes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TestScope {
    All,
    Login,
    Reset,
    Demo,
    Smoke,
}

/// Concrete selection handed to the suite binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteTarget {
    Everything,
    Suite(&'static str),
    Marker(&'static str),
}

impl SuiteTarget {
    /// Arguments for `sauceqa-suite`
    pub fn args(&self) -> Vec<String> {
        match self {
            SuiteTarget::Everything => Vec::new(),
            SuiteTarget::Suite(name) => vec!["--suite".to_string(), name.to_string()],
            SuiteTarget::Marker(name) => vec!["--marker".to_string(), name.to_string()],
        }
    }
}

impl TestScope {
    pub const ALL: [TestScope; 5] = [
        TestScope::All,
        TestScope::Login,
        TestScope::Reset,
        TestScope::Demo,
        TestScope::Smoke,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestScope::All => "all",
            TestScope::Login => "login",
            TestScope::Reset => "reset",
            TestScope::Demo => "demo",
            TestScope::Smoke => "smoke",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TestScope::All => "All Tests (Complete Test Suite)",
            TestScope::Login => "Login Functionality Tests",
            TestScope::Reset => "Password Reset Tests",
            TestScope::Demo => "Demo Tests (SauceDemo Website)",
            TestScope::Smoke => "Smoke Tests",
        }
    }

    pub fn target(&self) -> SuiteTarget {
        match self {
            TestScope::All => SuiteTarget::Everything,
            TestScope::Login => SuiteTarget::Suite("login"),
            TestScope::Reset => SuiteTarget::Suite("password_reset"),
            TestScope::Demo => SuiteTarget::Suite("demo"),
            TestScope::Smoke => SuiteTarget::Marker("smoke"),
        }
    }

    /// File name prefix of the HTML report a run of this scope produces
    pub fn report_prefix(&self) -> String {
        format!("sauceqa_{}_report", self.as_str())
    }
}

impl fmt::Display for TestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TestScope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| Error::UnknownScope(s.to_string()))
    }
}
