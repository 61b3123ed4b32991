//! Run results and the HTML / JSON report writers

use sauceqa_common::report::escape_html;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::E2eResult;

pub const REPORT_TITLE: &str = "SauceQA Automation Test Report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed => "FAILED",
        }
    }
}

/// Result of one case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub suite: String,
    pub markers: Vec<String>,
    pub outcome: Outcome,
    pub duration_ms: u64,
    /// Runs it took, retries included
    #[serde(default = "first_attempt")]
    pub attempts: u32,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

fn first_attempt() -> u32 {
    1
}

impl TestResult {
    pub fn success(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: String,
    pub browser: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn new(started_at: String, browser: String, duration_ms: u64, results: Vec<TestResult>) -> Self {
        let passed = results.iter().filter(|r| r.success()).count();
        Self {
            started_at,
            browser,
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            results,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn write_json(&self, path: &Path) -> E2eResult<()> {
        create_parent(path)?;
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Results written to: {}", path.display());
        Ok(())
    }

    pub fn write_html(&self, path: &Path) -> E2eResult<()> {
        create_parent(path)?;
        std::fs::write(path, self.render_html())?;
        info!("HTML report written to: {}", path.display());
        Ok(())
    }

    pub fn render_html(&self) -> String {
        let rows: String = self
            .results
            .iter()
            .map(|r| {
                let detail = match (&r.error, &r.screenshot) {
                    (Some(error), Some(shot)) => format!(
                        "<pre>{}</pre><a href=\"{}\">screenshot</a>",
                        escape_html(error),
                        escape_html(&shot.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default())
                    ),
                    (Some(error), None) => format!("<pre>{}</pre>", escape_html(error)),
                    _ => String::new(),
                };
                let attempts = if r.attempts > 1 {
                    format!(" ({} attempts)", r.attempts)
                } else {
                    String::new()
                };
                format!(
                    "<tr class=\"{class}\"><td>{suite}</td><td>{name}</td><td>{markers}</td><td>{outcome}</td><td>{ms} ms{attempts}</td><td>{detail}</td></tr>\n",
                    class = r.outcome.as_str().to_lowercase(),
                    suite = escape_html(&r.suite),
                    name = escape_html(&r.name),
                    markers = escape_html(&r.markers.join(", ")),
                    outcome = r.outcome.as_str(),
                    ms = r.duration_ms,
                    attempts = attempts,
                    detail = detail,
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 30px; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; vertical-align: top; }}
        th {{ background: #0066cc; color: white; }}
        tr.passed td:nth-child(4) {{ color: #28a745; font-weight: bold; }}
        tr.failed td:nth-child(4) {{ color: #dc3545; font-weight: bold; }}
        pre {{ white-space: pre-wrap; margin: 0; }}
        .summary span {{ margin-right: 20px; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p class="summary">
        <span>Started: {started}</span>
        <span>Browser: {browser}</span>
        <span>{total} tests</span>
        <span>{passed} passed</span>
        <span>{failed} failed</span>
        <span>{duration:.2} s</span>
    </p>
    <table>
        <tr><th>Suite</th><th>Test</th><th>Markers</th><th>Result</th><th>Duration</th><th>Details</th></tr>
        {rows}
    </table>
</body>
</html>
"#,
            title = REPORT_TITLE,
            started = escape_html(&self.started_at),
            browser = escape_html(&self.browser),
            total = self.total,
            passed = self.passed,
            failed = self.failed,
            duration = self.duration_ms as f64 / 1000.0,
            rows = rows,
        )
    }
}

fn create_parent(path: &Path) -> E2eResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, outcome: Outcome, error: Option<&str>) -> TestResult {
        TestResult {
            name: name.to_string(),
            suite: "login".to_string(),
            markers: vec!["login".to_string(), "smoke".to_string()],
            outcome,
            duration_ms: 12,
            attempts: 1,
            error: error.map(str::to_string),
            screenshot: None,
        }
    }

    #[test]
    fn test_counts_and_html() {
        let suite = TestSuiteResult::new(
            "2026-01-01 10:00:00".to_string(),
            "chrome".to_string(),
            1500,
            vec![
                result("test_valid_login", Outcome::Passed, None),
                result("test_invalid_login[0-x]", Outcome::Failed, Some("Assertion failed: <h3> missing")),
            ],
        );
        assert_eq!(suite.total, 2);
        assert_eq!(suite.passed, 1);
        assert!(!suite.success());

        let html = suite.render_html();
        assert!(html.contains(REPORT_TITLE));
        assert!(html.contains("test_invalid_login[0-x]"));
        assert!(html.contains("&lt;h3&gt; missing"));
        assert!(!html.contains("<h3> missing"));
        assert!(!html.contains("attempts)"));
    }

    #[test]
    fn test_retried_case_shows_attempts() {
        let mut flaky = result("test_valid_login", Outcome::Passed, None);
        flaky.attempts = 3;
        let suite = TestSuiteResult::new(String::new(), "chrome".to_string(), 10, vec![flaky]);
        assert!(suite.render_html().contains("12 ms (3 attempts)"));

        let json = serde_json::to_value(&suite).unwrap();
        assert_eq!(json["results"][0]["attempts"], 3);
    }

    #[test]
    fn test_json_written_under_new_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");
        let suite = TestSuiteResult::new(String::new(), "chrome".to_string(), 0, vec![]);
        suite.write_json(&path).unwrap();

        let back: TestSuiteResult = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.total, 0);
        assert!(back.success());
    }
}
