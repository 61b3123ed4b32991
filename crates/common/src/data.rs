//! Test data fixtures and the strict Data Reader

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};

/// Username/password pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Credentials that must be rejected, with the error the site shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidCredential {
    pub username: String,
    pub password: String,
    pub expected_error: String,
}

/// Expected outcome of a reset request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetOutcome {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetEmailCase {
    pub email: String,
    pub expected_result: ResetOutcome,
}

/// The credentials fixture (`test_data/credentials.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "valid_credentials", alias = "valid")]
    pub valid: LoginCredentials,

    #[serde(rename = "invalid_credentials", alias = "invalid", default)]
    pub invalid: Vec<InvalidCredential>,

    #[serde(rename = "password_reset_emails", alias = "reset_emails", default)]
    pub reset_emails: Vec<ResetEmailCase>,
}

impl Credentials {
    /// Built-in fixture matching the public SauceDemo accounts
    pub fn default_fixture() -> Self {
        Self {
            valid: LoginCredentials::new("standard_user", "secret_sauce"),
            invalid: vec![
                InvalidCredential {
                    username: "locked_out_user".to_string(),
                    password: "secret_sauce".to_string(),
                    expected_error: "Epic sadface: Sorry, this user has been locked out."
                        .to_string(),
                },
                InvalidCredential {
                    username: String::new(),
                    password: "secret_sauce".to_string(),
                    expected_error: "Epic sadface: Username is required".to_string(),
                },
                InvalidCredential {
                    username: "standard_user".to_string(),
                    password: String::new(),
                    expected_error: "Epic sadface: Password is required".to_string(),
                },
            ],
            reset_emails: vec![ResetEmailCase {
                email: "test@example.com".to_string(),
                expected_result: ResetOutcome::Success,
            }],
        }
    }
}

/// The run settings fixture (`test_data/test_config.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub test_environment: String,
    pub max_login_attempts: u32,
    /// Seconds
    pub password_reset_timeout: u64,
    pub screenshot_on_failure: bool,
    pub retry_failed_tests: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            test_environment: "demo".to_string(),
            max_login_attempts: 3,
            password_reset_timeout: 60,
            screenshot_on_failure: true,
            retry_failed_tests: 2,
        }
    }
}

const VALID_KEYS: &[&str] = &["valid_credentials", "valid"];
const INVALID_KEYS: &[&str] = &["invalid_credentials", "invalid"];
const RESET_KEYS: &[&str] = &["password_reset_emails", "reset_emails"];

/// Read accessors over the JSON fixtures.
///
/// Unlike [`Config::load_test_data`], the reader never substitutes defaults:
/// a missing file, malformed JSON or an absent required key is an error.
#[derive(Debug, Clone)]
pub struct DataReader {
    credentials_file: PathBuf,
    test_config_file: PathBuf,
}

impl DataReader {
    pub fn new(credentials_file: impl Into<PathBuf>, test_config_file: impl Into<PathBuf>) -> Self {
        Self {
            credentials_file: credentials_file.into(),
            test_config_file: test_config_file.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let paths = config.paths();
        Self::new(paths.credentials_file(), paths.test_config_file())
    }

    /// Parse a JSON file
    pub fn load_json(path: &Path) -> Result<Value> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FixtureNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|source| Error::DataFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The whole credentials fixture
    pub fn get_credentials(&self) -> Result<Credentials> {
        let data = Self::load_json(&self.credentials_file)?;
        Ok(Credentials {
            valid: self.required(&data, VALID_KEYS)?,
            invalid: self.optional_list(&data, INVALID_KEYS)?,
            reset_emails: self.optional_list(&data, RESET_KEYS)?,
        })
    }

    pub fn get_valid_credentials(&self) -> Result<LoginCredentials> {
        let data = Self::load_json(&self.credentials_file)?;
        self.required(&data, VALID_KEYS)
    }

    pub fn get_invalid_credentials(&self) -> Result<Vec<InvalidCredential>> {
        let data = Self::load_json(&self.credentials_file)?;
        self.optional_list(&data, INVALID_KEYS)
    }

    pub fn get_password_reset_data(&self) -> Result<Vec<ResetEmailCase>> {
        let data = Self::load_json(&self.credentials_file)?;
        self.optional_list(&data, RESET_KEYS)
    }

    pub fn get_test_config(&self) -> Result<TestConfig> {
        let data = Self::load_json(&self.test_config_file)?;
        serde_json::from_value(data).map_err(|source| Error::DataFormat {
            path: self.test_config_file.clone(),
            source,
        })
    }

    fn required<T: DeserializeOwned>(&self, data: &Value, keys: &[&str]) -> Result<T> {
        let value = lookup(data, keys).ok_or_else(|| Error::MissingKey {
            path: self.credentials_file.clone(),
            key: keys[0].to_string(),
        })?;
        self.decode(value)
    }

    fn optional_list<T: DeserializeOwned>(&self, data: &Value, keys: &[&str]) -> Result<Vec<T>> {
        match lookup(data, keys) {
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(value) => self.decode(value),
        }
    }

    fn decode<T: DeserializeOwned>(&self, value: &Value) -> Result<T> {
        T::deserialize(value).map_err(|source| Error::DataFormat {
            path: self.credentials_file.clone(),
            source,
        })
    }
}

fn lookup<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| data.get(*key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_with(credentials: Option<&str>, test_config: Option<&str>) -> (tempfile::TempDir, DataReader) {
        let dir = tempfile::tempdir().unwrap();
        let creds = dir.path().join("credentials.json");
        let cfg = dir.path().join("test_config.json");
        if let Some(c) = credentials {
            std::fs::write(&creds, c).unwrap();
        }
        if let Some(c) = test_config {
            std::fs::write(&cfg, c).unwrap();
        }
        (dir, DataReader::new(creds, cfg))
    }

    #[test]
    fn test_reads_full_fixture() {
        let fixture = serde_json::to_string(&Credentials::default_fixture()).unwrap();
        let (_dir, reader) = reader_with(Some(&fixture), Some(r#"{"test_environment": "ci"}"#));

        assert_eq!(reader.get_valid_credentials().unwrap().username, "standard_user");
        assert_eq!(reader.get_invalid_credentials().unwrap().len(), 3);
        let reset = reader.get_password_reset_data().unwrap();
        assert_eq!(reset[0].expected_result, ResetOutcome::Success);
        assert_eq!(reader.get_test_config().unwrap().test_environment, "ci");
        assert_eq!(reader.get_credentials().unwrap(), Credentials::default_fixture());
    }

    #[test]
    fn test_short_key_aliases() {
        let (_dir, reader) = reader_with(
            Some(
                r#"{
                    "valid": {"username": "problem_user", "password": "secret_sauce"},
                    "reset_emails": [{"email": "", "expected_result": "error"}]
                }"#,
            ),
            None,
        );

        let credentials = reader.get_credentials().unwrap();
        assert_eq!(credentials.valid.username, "problem_user");
        assert!(credentials.invalid.is_empty());
        assert_eq!(credentials.reset_emails[0].expected_result, ResetOutcome::Error);

        let parsed: Credentials = serde_json::from_str(
            r#"{"valid": {"username": "a", "password": "b"}, "invalid": []}"#,
        )
        .unwrap();
        assert_eq!(parsed.valid.username, "a");
    }

    #[test]
    fn test_missing_file() {
        let (_dir, reader) = reader_with(None, None);
        assert!(matches!(
            reader.get_valid_credentials(),
            Err(Error::FixtureNotFound { .. })
        ));
        assert!(matches!(
            reader.get_test_config(),
            Err(Error::FixtureNotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        let (_dir, reader) = reader_with(Some("{\"valid_credentials\": "), Some("[1, 2"));
        assert!(matches!(
            reader.get_invalid_credentials(),
            Err(Error::DataFormat { .. })
        ));
        assert!(matches!(reader.get_test_config(), Err(Error::DataFormat { .. })));
    }

    #[test]
    fn test_missing_required_key() {
        let (_dir, reader) = reader_with(Some(r#"{"invalid_credentials": []}"#), None);
        match reader.get_valid_credentials() {
            Err(Error::MissingKey { key, .. }) => assert_eq!(key, "valid_credentials"),
            other => panic!("expected MissingKey, got {:?}", other),
        }
        // Lists are optional
        assert!(reader.get_invalid_credentials().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_shape_is_a_format_error() {
        let (_dir, reader) = reader_with(Some(r#"{"valid_credentials": "standard_user"}"#), None);
        assert!(matches!(
            reader.get_valid_credentials(),
            Err(Error::DataFormat { .. })
        ));
    }
}
