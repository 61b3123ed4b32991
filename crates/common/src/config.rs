//! Framework configuration
//!
//! A [`Config`] is built once per process: defaults, then an optional TOML
//! file, then `SAUCEQA_*` environment overrides. Working directories are not
//! touched until [`initialize`] is called.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::data::{Credentials, DataReader, TestConfig};
use crate::error::{Error, Result};

/// Default target site
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com";

/// SauceDemo has no reset flow, so the reset page points at a second demo site.
pub const DEFAULT_DEMO_RESET_URL: &str = "https://demo.testfire.net/login.jsp";

/// Browser used for the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    #[value(alias = "chromium")]
    Chrome,
    #[value(alias = "gecko")]
    Firefox,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Firefox => "firefox",
        }
    }

    /// Conventional listen address of the matching WebDriver server
    pub fn default_webdriver_url(&self) -> &'static str {
        match self {
            Browser::Chrome => "http://localhost:9515",
            Browser::Firefox => "http://localhost:4444",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Browser {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Browser::Chrome),
            "firefox" | "gecko" => Ok(Browser::Firefox),
            other => Err(Error::UnsupportedBrowser(other.to_string())),
        }
    }
}

/// Working directories derived from a base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub base_dir: PathBuf,
    pub test_data_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Paths {
    /// Standard layout under `base`
    pub fn under(base: impl Into<PathBuf>) -> Self {
        let base_dir = base.into();
        Self {
            test_data_dir: base_dir.join("test_data"),
            reports_dir: base_dir.join("reports"),
            logs_dir: base_dir.join("reports").join("logs"),
            static_dir: base_dir.join("static"),
            base_dir,
        }
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.test_data_dir.join("credentials.json")
    }

    pub fn test_config_file(&self) -> PathBuf {
        self.test_data_dir.join("test_config.json")
    }
}

/// Create the working directories if they do not exist yet.
///
/// The static asset directory is optional and is left alone.
pub fn initialize(paths: &Paths) -> Result<()> {
    for dir in [&paths.test_data_dir, &paths.reports_dir, &paths.logs_dir] {
        std::fs::create_dir_all(dir)?;
        debug!("Ensured directory {}", dir.display());
    }
    Ok(())
}

/// Dashboard listen settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub host: String,
    pub port: u16,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl DashboardSettings {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Process-wide framework configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the site under test
    pub base_url: String,

    /// Page used as the password reset stand-in
    pub demo_reset_url: String,

    pub browser: Browser,

    pub headless: bool,

    /// Default timeout for direct, unconditioned lookups
    pub implicit_wait_secs: u64,

    /// Default timeout for page-object interactions
    pub explicit_wait_secs: u64,

    /// WebDriver server; derived from the browser when unset
    pub webdriver_url: Option<String>,

    /// Directory holding `test_data/`, `reports/` and `static/`
    pub base_dir: PathBuf,

    pub dashboard: DashboardSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            demo_reset_url: DEFAULT_DEMO_RESET_URL.to_string(),
            browser: Browser::Chrome,
            headless: false,
            implicit_wait_secs: 10,
            explicit_wait_secs: 20,
            webdriver_url: None,
            base_dir: PathBuf::from("."),
            dashboard: DashboardSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, optional TOML file, then environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("{}: {}", path.display(), e)))
    }

    /// Apply `SAUCEQA_*` overrides through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SAUCEQA_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(browser) = lookup("SAUCEQA_BROWSER").filter(|v| !v.trim().is_empty()) {
            self.browser = browser.parse()?;
        }
        if let Some(headless) = lookup("SAUCEQA_HEADLESS") {
            self.headless = parse_flag("SAUCEQA_HEADLESS", &headless)?;
        }
        if let Some(url) = lookup("SAUCEQA_WEBDRIVER_URL").filter(|v| !v.trim().is_empty()) {
            self.webdriver_url = Some(url.trim().to_string());
        }
        if let Some(dir) = lookup("SAUCEQA_BASE_DIR").filter(|v| !v.trim().is_empty()) {
            self.base_dir = PathBuf::from(dir.trim());
        }
        Ok(())
    }

    pub fn paths(&self) -> Paths {
        Paths::under(&self.base_dir)
    }

    pub fn login_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    pub fn password_reset_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    pub fn implicit_wait(&self) -> Duration {
        Duration::from_secs(self.implicit_wait_secs)
    }

    pub fn explicit_wait(&self) -> Duration {
        Duration::from_secs(self.explicit_wait_secs)
    }

    pub fn webdriver_url(&self) -> String {
        self.webdriver_url
            .clone()
            .unwrap_or_else(|| self.browser.default_webdriver_url().to_string())
    }

    /// Load the credential and test-config fixtures.
    ///
    /// A demo run is never blocked on fixtures: if either file is missing or
    /// malformed, the built-in default pair is returned and a warning names
    /// the reason.
    pub fn load_test_data(&self) -> (Credentials, TestConfig) {
        let reader = DataReader::from_config(self);
        let loaded = reader
            .get_credentials()
            .and_then(|credentials| Ok((credentials, reader.get_test_config()?)));

        match loaded {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Test data unavailable ({}), using default data", e);
                default_test_data()
            }
        }
    }
}

/// Built-in fixture pair used when the JSON files cannot be read
pub fn default_test_data() -> (Credentials, TestConfig) {
    (Credentials::default_fixture(), TestConfig::default())
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::InvalidConfig(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_derived_urls() {
        let mut config = Config::default();
        assert_eq!(config.login_url(), "https://www.saucedemo.com/");

        config.base_url = "http://localhost:3000/".to_string();
        assert_eq!(config.login_url(), "http://localhost:3000/");
        assert_eq!(config.password_reset_url(), "http://localhost:3000/");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                ("SAUCEQA_BROWSER", "Firefox"),
                ("SAUCEQA_HEADLESS", "True"),
                ("SAUCEQA_BASE_DIR", "/tmp/qa"),
            ]))
            .unwrap();

        assert_eq!(config.browser, Browser::Firefox);
        assert!(config.headless);
        assert_eq!(config.webdriver_url(), "http://localhost:4444");
        assert_eq!(config.paths().logs_dir, PathBuf::from("/tmp/qa/reports/logs"));
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let mut config = Config::default();
        assert!(config
            .apply_overrides(lookup(&[("SAUCEQA_BROWSER", "netscape")]))
            .is_err());
        assert!(config
            .apply_overrides(lookup(&[("SAUCEQA_HEADLESS", "maybe")]))
            .is_err());
    }

    #[test]
    fn test_toml_file_keeps_defaults_for_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sauceqa.toml");
        std::fs::write(
            &path,
            "base_url = \"http://localhost:3000\"\nheadless = true\n\n[dashboard]\nport = 9090\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert!(config.headless);
        assert_eq!(config.dashboard.port, 9090);
        assert_eq!(config.dashboard.host, "127.0.0.1");
        assert_eq!(config.explicit_wait(), Duration::from_secs(20));
    }

    #[test]
    fn test_initialize_creates_working_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::under(dir.path().join("project"));
        initialize(&paths).unwrap();

        assert!(paths.test_data_dir.is_dir());
        assert!(paths.reports_dir.is_dir());
        assert!(paths.logs_dir.is_dir());
        assert!(!paths.static_dir.exists());

        // Idempotent
        initialize(&paths).unwrap();
    }

    #[test]
    fn test_load_test_data_falls_back_when_files_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            base_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        let (credentials, test_config) = config.load_test_data();
        assert_eq!(credentials, Credentials::default_fixture());
        assert_eq!(test_config, TestConfig::default());
    }

    #[test]
    fn test_load_test_data_falls_back_when_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            base_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let paths = config.paths();
        initialize(&paths).unwrap();
        std::fs::write(paths.credentials_file(), "{ not json").unwrap();
        std::fs::write(paths.test_config_file(), "{}").unwrap();

        assert_eq!(config.load_test_data(), default_test_data());

        // Well-formed JSON with the required key missing is also replaced
        std::fs::write(paths.credentials_file(), r#"{"invalid_credentials": []}"#).unwrap();
        assert_eq!(config.load_test_data(), default_test_data());
    }

    #[test]
    fn test_load_test_data_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            base_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        let paths = config.paths();
        initialize(&paths).unwrap();
        std::fs::write(
            paths.credentials_file(),
            r#"{"valid_credentials": {"username": "visual_user", "password": "secret_sauce"}}"#,
        )
        .unwrap();
        std::fs::write(paths.test_config_file(), r#"{"max_login_attempts": 5}"#).unwrap();

        let (credentials, test_config) = config.load_test_data();
        assert_eq!(credentials.valid.username, "visual_user");
        assert!(credentials.invalid.is_empty());
        assert_eq!(test_config.max_login_attempts, 5);
        assert_eq!(test_config.retry_failed_tests, 2);
    }
}
