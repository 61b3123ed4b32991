//! Launch a suite run
//!
//! The runner never drives a browser itself. It resolves the test type to a
//! suite selection, spawns `sauceqa-suite` and relays its exit code.

use anyhow::{Context, Result};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use sauceqa_common::report::timestamped_path;
use sauceqa_common::{Browser, Config, TestScope};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Override for the suite binary location
pub const SUITE_BIN_ENV: &str = "SAUCEQA_SUITE_BIN";

const SUITE_BIN: &str = "sauceqa-suite";

/// Exit status reported after Ctrl-C
pub const EXIT_INTERRUPTED: i32 = 130;

const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Runner flags that shape the child command
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub parallel: bool,
    pub headless: bool,
    pub browser: Option<Browser>,
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
}

/// A fully resolved suite invocation
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub html: PathBuf,
    pub json: PathBuf,
    pub parallel: bool,
}

impl RunPlan {
    /// Resolve `scope` and `options` into the suite command line
    pub fn build(program: PathBuf, scope: TestScope, options: &RunOptions, config: &Config) -> Self {
        let reports_dir = config.paths().reports_dir;
        let html = timestamped_path(&reports_dir, &scope.report_prefix(), "html");
        let json = html.with_extension("json");

        let mut args = scope.target().args();
        args.push("--html".to_string());
        args.push(html.display().to_string());
        args.push("--json".to_string());
        args.push(json.display().to_string());
        if options.parallel {
            args.push("--parallel".to_string());
        }
        if options.verbose {
            args.push("--verbose".to_string());
        }
        if let Some(path) = &options.config_path {
            args.push("--config".to_string());
            args.push(path.display().to_string());
        }

        let browser = options.browser.unwrap_or(config.browser);
        let headless = options.headless || config.headless;
        let envs = vec![
            ("SAUCEQA_BROWSER".to_string(), browser.to_string()),
            ("SAUCEQA_HEADLESS".to_string(), headless.to_string()),
        ];

        Self {
            program,
            args,
            envs,
            html,
            json,
            parallel: options.parallel,
        }
    }

    /// Printable form of the command
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

/// Locate `sauceqa-suite`: the override variable, then next to this binary,
/// then `PATH`
pub fn suite_binary() -> PathBuf {
    suite_binary_from(std::env::var_os(SUITE_BIN_ENV), std::env::current_exe().ok())
}

fn suite_binary_from(overridden: Option<OsString>, current_exe: Option<PathBuf>) -> PathBuf {
    if let Some(path) = overridden.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let file_name = format!("{}{}", SUITE_BIN, std::env::consts::EXE_SUFFIX);
    current_exe
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join(&file_name))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| PathBuf::from(file_name))
}

/// Spawn the suite and wait for it. Returns the exit code to relay.
pub async fn execute(plan: &RunPlan) -> Result<i32> {
    info!("Running: {}", plan.command_line());
    let mut child = plan
        .command()
        .spawn()
        .with_context(|| format!("failed to launch {}", plan.program.display()))?;

    tokio::select! {
        status = child.wait() => {
            let status = status.context("failed to wait for the suite")?;
            debug!("Suite exited with {}", status);
            Ok(status.code().unwrap_or(1))
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Test execution interrupted by user");
            terminate(&mut child).await;
            Ok(EXIT_INTERRUPTED)
        }
    }
}

/// SIGTERM, then SIGKILL after a grace period
async fn terminate(child: &mut Child) {
    if let Some(pid) = child.id() {
        if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            debug!("SIGTERM to {} failed: {}", pid, e);
        }
        if tokio::time::timeout(TERMINATE_GRACE, child.wait()).await.is_ok() {
            return;
        }
    }
    if let Err(e) = child.kill().await {
        warn!("Failed to kill suite process: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path) -> Config {
        Config {
            base_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_plan_for_login() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions {
            parallel: true,
            headless: true,
            browser: Some(Browser::Firefox),
            ..Default::default()
        };
        let plan = RunPlan::build(PathBuf::from("sauceqa-suite"), TestScope::Login, &options, &config(dir.path()));

        assert_eq!(&plan.args[..2], ["--suite", "login"]);
        assert!(plan.args.contains(&"--parallel".to_string()));
        let html_name = plan.html.file_name().unwrap().to_string_lossy().to_string();
        assert!(html_name.starts_with("sauceqa_login_report_"));
        assert!(html_name.ends_with(".html"));
        assert_eq!(plan.json.extension().unwrap(), "json");
        assert!(plan.html.starts_with(dir.path().join("reports")));
        assert!(plan.envs.contains(&("SAUCEQA_BROWSER".to_string(), "firefox".to_string())));
        assert!(plan.envs.contains(&("SAUCEQA_HEADLESS".to_string(), "true".to_string())));
    }

    #[test]
    fn test_plan_for_every_scope() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        for scope in TestScope::ALL {
            let plan = RunPlan::build(PathBuf::from("suite"), scope, &RunOptions::default(), &config);
            assert!(plan.args.starts_with(&scope.target().args()));
            assert!(!plan.args.contains(&"--parallel".to_string()));
            assert!(plan.envs.contains(&("SAUCEQA_HEADLESS".to_string(), "false".to_string())));
        }
    }

    #[test]
    fn test_suite_binary_resolution() {
        assert_eq!(
            suite_binary_from(Some(OsString::from("/opt/suite")), None),
            PathBuf::from("/opt/suite")
        );

        let dir = tempfile::tempdir().unwrap();
        let sibling = dir.path().join(format!("{}{}", SUITE_BIN, std::env::consts::EXE_SUFFIX));
        std::fs::write(&sibling, b"").unwrap();
        let exe = dir.path().join("sauceqa");
        assert_eq!(suite_binary_from(None, Some(exe)), sibling);

        let empty = tempfile::tempdir().unwrap();
        let fallback = suite_binary_from(Some(OsString::new()), Some(empty.path().join("sauceqa")));
        assert_eq!(fallback, PathBuf::from(format!("{}{}", SUITE_BIN, std::env::consts::EXE_SUFFIX)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_is_relayed() {
        let plan = RunPlan {
            program: PathBuf::from("sh"),
            args: vec!["-c".to_string(), "exit \"$CODE\"".to_string()],
            envs: vec![("CODE".to_string(), "5".to_string())],
            html: PathBuf::from("unused.html"),
            json: PathBuf::from("unused.json"),
            parallel: false,
        };
        assert_eq!(execute(&plan).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let plan = RunPlan {
            program: PathBuf::from("/nonexistent/sauceqa-suite"),
            args: vec![],
            envs: vec![],
            html: PathBuf::new(),
            json: PathBuf::new(),
            parallel: false,
        };
        assert!(execute(&plan).await.is_err());
    }
}
