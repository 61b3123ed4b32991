//! Report artifacts: naming, listing and the project summary report

use chrono::{DateTime, Local};
use serde::Serialize;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;

/// `strftime` layout used in artifact file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Reports returned by a listing
pub const MAX_LISTED_REPORTS: usize = 10;

/// Prefix of the summary report file
pub const SUMMARY_REPORT_PREFIX: &str = "sauceqa_summary_report";

/// Local wall-clock stamp for file names
pub fn run_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// `<dir>/<prefix>_<timestamp>.<extension>`
pub fn timestamped_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}_{}.{}", prefix, run_timestamp(), extension))
}

/// An HTML report on disk
#[derive(Debug, Clone, Serialize)]
pub struct ReportInfo {
    pub name: String,
    /// URL path the dashboard serves it under
    pub path: String,
    pub size: u64,
    pub created: String,
    pub size_kb: f64,
    #[serde(skip)]
    pub modified: SystemTime,
}

/// HTML reports in `dir`, newest first, at most `limit`.
///
/// A missing directory lists as empty.
pub fn list_reports(dir: &Path, limit: usize) -> Result<Vec<ReportInfo>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reports = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().map(|e| e != "html").unwrap_or(true) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let size = metadata.len();
        reports.push(ReportInfo {
            path: format!("/reports/{}", name),
            name,
            size,
            created: DateTime::<Local>::from(modified)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            size_kb: (size as f64 / 1024.0 * 10.0).round() / 10.0,
            modified,
        });
    }

    // Newest first; name breaks ties so the order is stable
    reports.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
    reports.truncate(limit);
    debug!("Listed {} report(s) from {}", reports.len(), dir.display());
    Ok(reports)
}

/// Whether something accepts TCP connections on `host:port`
pub fn is_dashboard_running(host: &str, port: u16) -> bool {
    let Ok(mut addrs) = (host, port).to_socket_addrs() else {
        return false;
    };
    addrs.any(|addr| TcpStream::connect_timeout(&addr, Duration::from_secs(2)).is_ok())
}

/// Minimal escaping for text placed into HTML
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Requirements the framework covers, shown on the summary report and dashboard
pub const REQUIREMENTS: &[&str] = &[
    "Login functionality automation",
    "Error message validation",
    "Forgot password workflow",
    "Scenario harness with parametrized cases",
    "Reusable page-object utilities",
];

/// Write the project summary report into the reports directory.
pub fn generate_summary_report(config: &Config) -> Result<PathBuf> {
    let paths = config.paths();
    std::fs::create_dir_all(&paths.reports_dir)?;

    let report_path = timestamped_path(&paths.reports_dir, SUMMARY_REPORT_PREFIX, "html");
    let file_name = report_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let dashboard = &config.dashboard;
    let running = is_dashboard_running(&dashboard.host, dashboard.port);
    let html = render_summary(config, &file_name, running, &list_reports(&paths.reports_dir, MAX_LISTED_REPORTS)?);

    std::fs::write(&report_path, html)?;
    info!("Summary report written to {}", report_path.display());
    Ok(report_path)
}

fn render_summary(config: &Config, file_name: &str, dashboard_running: bool, recent: &[ReportInfo]) -> String {
    let requirements: String = REQUIREMENTS
        .iter()
        .map(|r| format!("<div class=\"card\"><span class=\"success\">&#10003; COMPLETE</span> - {}</div>\n", escape_html(r)))
        .collect();

    let recent_rows: String = if recent.is_empty() {
        "<p>No reports generated yet.</p>".to_string()
    } else {
        recent
            .iter()
            .map(|r| {
                format!(
                    "<li><a href=\"{name}\">{name}</a> &middot; {created} &middot; {kb} KB</li>\n",
                    name = escape_html(&r.name),
                    created = escape_html(&r.created),
                    kb = r.size_kb,
                )
            })
            .collect::<String>()
    };

    let (status, status_class) = if dashboard_running {
        ("Running", "status-running")
    } else {
        ("Not Running", "status-stopped")
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>SauceQA Automation Report</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; background: #f0f2f5; }}
        .container {{ max-width: 1000px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; }}
        .header {{ background: #0066cc; color: white; padding: 30px; margin: -30px -30px 30px -30px; text-align: center; }}
        .section {{ margin: 30px 0; padding-bottom: 20px; border-bottom: 1px solid #eee; }}
        .card {{ background: #f8f9fa; padding: 20px; margin: 10px 0; border-left: 4px solid #0066cc; }}
        .success {{ color: #28a745; font-weight: bold; }}
        .status-running {{ color: #28a745; font-weight: bold; }}
        .status-stopped {{ color: #dc3545; font-weight: bold; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>SauceQA Automation Framework</h1>
            <p>Authentication Testing Report</p>
        </div>
        <div class="section">
            <h2>Requirements Status</h2>
            {requirements}
        </div>
        <div class="section">
            <h2>Web Dashboard</h2>
            <p><strong>Dashboard Status:</strong> <span class="{status_class}">{status}</span></p>
            <p><strong>Dashboard URL:</strong> <a href="{dashboard_url}">{dashboard_url}</a></p>
            <p><strong>Test Application:</strong> <a href="{base_url}">Swag Labs (SauceDemo)</a></p>
        </div>
        <div class="section">
            <h2>Recent Reports</h2>
            <ul>
            {recent_rows}
            </ul>
        </div>
        <div class="section">
            <h2>Report Information</h2>
            <p><strong>Generated:</strong> {generated}</p>
            <p><strong>Report File:</strong> {file_name}</p>
            <p><strong>Browser:</strong> {browser} (headless: {headless})</p>
        </div>
    </div>
</body>
</html>
"#,
        requirements = requirements,
        status_class = status_class,
        status = status,
        dashboard_url = escape_html(&config.dashboard.url()),
        base_url = escape_html(&config.base_url),
        recent_rows = recent_rows,
        generated = Local::now().format("%Y-%m-%d %H:%M:%S"),
        file_name = escape_html(file_name),
        browser = config.browser,
        headless = config.headless,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str, bytes: usize, age_secs: u64) {
        let path = dir.join(name);
        std::fs::write(&path, vec![b'x'; bytes]).unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(mtime)
            .unwrap();
    }

    #[test]
    fn test_listing_is_newest_first_and_capped() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..12u64 {
            touch(dir.path(), &format!("report_{:02}.html", i), 100, 1000 - i * 10);
        }
        touch(dir.path(), "notes.txt", 10, 0);
        touch(dir.path(), "screenshot.png", 10, 0);

        let reports = list_reports(dir.path(), MAX_LISTED_REPORTS).unwrap();
        assert_eq!(reports.len(), 10);
        assert_eq!(reports[0].name, "report_11.html");
        assert_eq!(reports[9].name, "report_02.html");
        assert!(reports.windows(2).all(|w| w[0].modified >= w[1].modified));
        assert_eq!(reports[0].path, "/reports/report_11.html");
    }

    #[test]
    fn test_size_fields() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "big.html", 2560, 0);

        let reports = list_reports(dir.path(), MAX_LISTED_REPORTS).unwrap();
        assert_eq!(reports[0].size, 2560);
        assert_eq!(reports[0].size_kb, 2.5);

        let json = serde_json::to_value(&reports[0]).unwrap();
        assert!(json.get("modified").is_none());
        assert_eq!(json["name"], "big.html");
    }

    #[test]
    fn test_missing_dir_lists_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_reports(&dir.path().join("nope"), 10).unwrap().is_empty());
    }

    #[test]
    fn test_timestamped_path_shape() {
        let path = timestamped_path(Path::new("/r"), "sauceqa_demo_report", "html");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("sauceqa_demo_report_"));
        assert!(name.ends_with(".html"));
        // prefix + '_' + YYYYmmdd_HHMMSS + ".html"
        assert_eq!(name.len(), "sauceqa_demo_report_".len() + 15 + 5);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_summary_report_is_listed() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            base_dir: dir.path().to_path_buf(),
            ..Config::default()
        };

        let path = generate_summary_report(&config).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("SauceQA Automation Framework"));
        assert!(html.contains("Swag Labs"));

        let reports = list_reports(&config.paths().reports_dir, MAX_LISTED_REPORTS).unwrap();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].name.starts_with(SUMMARY_REPORT_PREFIX));
    }
}
