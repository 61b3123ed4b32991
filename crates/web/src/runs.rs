//! Background test runs started from the dashboard
//!
//! One run may be active at a time. A trigger takes the single permit, records
//! a [`RunTicket`] and hands the permit to a background task that owns the
//! child process until it exits. Triggers while the permit is taken are
//! rejected with [`RunError::Busy`].

use chrono::{DateTime, Local};
use sauceqa_common::report::run_timestamp;
use sauceqa_common::TestScope;
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::{RwLock, Semaphore};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Override for the runner binary location
pub const RUNNER_BIN_ENV: &str = "SAUCEQA_BIN";

const RUNNER_BIN: &str = "sauceqa";

/// Finished tickets kept for `/api/runs`
pub const DEFAULT_TICKET_LIMIT: usize = 50;

/// Scopes the dashboard may trigger
pub const TRIGGERABLE: [TestScope; 3] = [TestScope::Demo, TestScope::Login, TestScope::All];

#[derive(Debug, Error)]
pub enum RunError {
    #[error("A test run is already in progress")]
    Busy { active: Option<Uuid> },

    #[error("Test type '{0}' cannot be started from the dashboard")]
    NotTriggerable(TestScope),
}

/// Ticket lifecycle: launching, running, then completed or failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RunStatus {
    Launching,
    Running { pid: Option<u32> },
    Completed { exit_code: i32 },
    Failed { error: String },
}

impl RunStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, RunStatus::Completed { .. } | RunStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunTicket {
    pub id: Uuid,
    pub scope: TestScope,
    pub command: String,
    pub log_file: PathBuf,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub status: RunStatus,
}

/// How to invoke the `sauceqa` runner
#[derive(Debug, Clone)]
pub struct RunnerCommand {
    pub program: PathBuf,
    /// Arguments placed before the per-request ones
    pub base_args: Vec<String>,
    pub workdir: PathBuf,
}

impl RunnerCommand {
    /// The runner binary: the override variable, then next to this binary,
    /// then `PATH`. A dashboard config file is handed on to every run.
    pub fn locate(workdir: impl Into<PathBuf>, config: Option<&Path>) -> Self {
        Self {
            program: locate_binary(std::env::var_os(RUNNER_BIN_ENV), std::env::current_exe().ok()),
            base_args: config_args(config),
            workdir: workdir.into(),
        }
    }

    fn run_args(&self, scope: TestScope) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push("--test-type".to_string());
        args.push(scope.to_string());
        args
    }

    fn report_args(&self) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.push("--generate-report".to_string());
        args
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn display(&self, args: &[String]) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(args.iter().cloned());
        parts.join(" ")
    }
}

fn config_args(config: Option<&Path>) -> Vec<String> {
    match config {
        Some(path) => vec!["--config".to_string(), path.display().to_string()],
        None => Vec::new(),
    }
}

fn locate_binary(overridden: Option<OsString>, current_exe: Option<PathBuf>) -> PathBuf {
    if let Some(path) = overridden.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let file_name = format!("{}{}", RUNNER_BIN, std::env::consts::EXE_SUFFIX);
    current_exe
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join(&file_name))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| PathBuf::from(file_name))
}

/// Result of a synchronous report generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub success: bool,
    pub message: String,
}

pub struct RunRegistry {
    runner: RunnerCommand,
    logs_dir: PathBuf,
    permit: Arc<Semaphore>,
    tickets: RwLock<HashMap<Uuid, RunTicket>>,
    ticket_limit: usize,
}

impl RunRegistry {
    pub fn new(runner: RunnerCommand, logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            logs_dir: logs_dir.into(),
            permit: Arc::new(Semaphore::new(1)),
            tickets: RwLock::new(HashMap::new()),
            ticket_limit: DEFAULT_TICKET_LIMIT,
        }
    }

    /// Keep at most `limit` finished tickets
    pub fn with_ticket_limit(mut self, limit: usize) -> Self {
        self.ticket_limit = limit;
        self
    }

    /// Start a background run of `scope`. Returns as soon as the ticket is
    /// recorded; the child is spawned by the background task.
    pub async fn launch(self: &Arc<Self>, scope: TestScope) -> Result<RunTicket, RunError> {
        if !TRIGGERABLE.contains(&scope) {
            return Err(RunError::NotTriggerable(scope));
        }
        let permit = match self.permit.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                return Err(RunError::Busy {
                    active: self.active().await.map(|t| t.id),
                })
            }
        };

        let args = self.runner.run_args(scope);
        let ticket = RunTicket {
            id: Uuid::new_v4(),
            scope,
            command: self.runner.display(&args),
            log_file: self
                .logs_dir
                .join(format!("dashboard_{}_{}.log", scope, run_timestamp())),
            started_at: Local::now(),
            finished_at: None,
            status: RunStatus::Launching,
        };
        self.tickets.write().await.insert(ticket.id, ticket.clone());
        info!("Launching {} run {}: {}", scope, ticket.id, ticket.command);

        let registry = self.clone();
        let id = ticket.id;
        let log_file = ticket.log_file.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let status = registry.execute(id, &args, &log_file).await;
            match &status {
                RunStatus::Completed { exit_code } => {
                    info!("Run {} completed with exit code {}", id, exit_code)
                }
                RunStatus::Failed { error } => error!("Run {} failed: {}", id, error),
                _ => {}
            }
            registry.finish(id, status).await;
        });

        Ok(ticket)
    }

    async fn execute(&self, id: Uuid, args: &[String], log_file: &Path) -> RunStatus {
        let (stdout, stderr) = match open_log(log_file, &self.runner.display(args)) {
            Ok(handles) => handles,
            Err(e) => {
                return RunStatus::Failed {
                    error: format!("cannot open {}: {}", log_file.display(), e),
                }
            }
        };

        let mut child = match self.runner.command(args).stdout(stdout).stderr(stderr).spawn() {
            Ok(child) => child,
            Err(e) => {
                return RunStatus::Failed {
                    error: format!("failed to launch {}: {}", self.runner.program.display(), e),
                }
            }
        };
        self.update(id, RunStatus::Running { pid: child.id() }).await;

        match child.wait().await {
            Ok(status) => RunStatus::Completed {
                exit_code: status.code().unwrap_or(-1),
            },
            Err(e) => RunStatus::Failed {
                error: format!("failed to wait for run: {}", e),
            },
        }
    }

    async fn update(&self, id: Uuid, status: RunStatus) {
        if let Some(ticket) = self.tickets.write().await.get_mut(&id) {
            ticket.status = status;
        }
    }

    async fn finish(&self, id: Uuid, status: RunStatus) {
        let mut tickets = self.tickets.write().await;
        if let Some(ticket) = tickets.get_mut(&id) {
            ticket.status = status;
            ticket.finished_at = Some(Local::now());
        }
        prune(&mut tickets, self.ticket_limit);
    }

    pub async fn get(&self, id: Uuid) -> Option<RunTicket> {
        self.tickets.read().await.get(&id).cloned()
    }

    /// Every ticket, newest first
    pub async fn list(&self) -> Vec<RunTicket> {
        let mut tickets: Vec<RunTicket> = self.tickets.read().await.values().cloned().collect();
        tickets.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        tickets
    }

    /// The unfinished ticket, if any
    pub async fn active(&self) -> Option<RunTicket> {
        self.tickets
            .read()
            .await
            .values()
            .find(|t| !t.status.is_finished())
            .cloned()
    }

    /// Run `sauceqa --generate-report` and wait for it
    pub async fn generate_report(&self) -> ReportOutcome {
        let args = self.runner.report_args();
        info!("Generating report: {}", self.runner.display(&args));

        match self.runner.command(&args).output().await {
            Ok(output) if output.status.success() => ReportOutcome {
                success: true,
                message: "Report generated".to_string(),
            },
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                warn!("Report generation failed: {}", output.status);
                ReportOutcome {
                    success: false,
                    message: if stderr.is_empty() {
                        format!("Report generator exited with {}", output.status)
                    } else {
                        stderr
                    },
                }
            }
            Err(e) => {
                warn!("Report generation could not start: {}", e);
                ReportOutcome {
                    success: false,
                    message: e.to_string(),
                }
            }
        }
    }
}

/// Drop the oldest finished tickets beyond `limit`
fn prune(tickets: &mut HashMap<Uuid, RunTicket>, limit: usize) {
    let mut finished: Vec<(DateTime<Local>, Uuid)> = tickets
        .values()
        .filter(|t| t.status.is_finished())
        .map(|t| (t.started_at, t.id))
        .collect();
    if finished.len() <= limit {
        return;
    }
    finished.sort();
    let excess = finished.len() - limit;
    for (_, id) in finished.into_iter().take(excess) {
        tickets.remove(&id);
    }
}

fn open_log(path: &Path, command: &str) -> std::io::Result<(Stdio, Stdio)> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "Command: {}\n", command)?;
    let stderr = file.try_clone()?;
    Ok((Stdio::from(file), Stdio::from(stderr)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;

    /// `sh -c <script>`; the runner's own arguments land in `$0 $1 ...`
    pub(crate) fn shell(script: &str, workdir: &Path) -> RunnerCommand {
        RunnerCommand {
            program: PathBuf::from("sh"),
            base_args: vec!["-c".to_string(), script.to_string(), "sauceqa".to_string()],
            workdir: workdir.to_path_buf(),
        }
    }

    pub(crate) async fn wait_finished(registry: &RunRegistry, id: Uuid) -> RunTicket {
        for _ in 0..200 {
            if let Some(ticket) = registry.get(id).await {
                if ticket.status.is_finished() {
                    return ticket;
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("run {} did not finish", id);
    }

    #[tokio::test]
    async fn test_ticket_completes_with_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(RunRegistry::new(
            shell("echo \"running $2\"; exit 3", dir.path()),
            dir.path().join("logs"),
        ));

        let ticket = registry.launch(TestScope::Demo).await.unwrap();
        assert_eq!(ticket.status, RunStatus::Launching);
        assert!(ticket.command.ends_with("--test-type demo"));

        let done = wait_finished(&registry, ticket.id).await;
        assert_eq!(done.status, RunStatus::Completed { exit_code: 3 });
        assert!(done.finished_at.is_some());

        let name = done.log_file.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("dashboard_demo_"));
        let log = std::fs::read_to_string(&done.log_file).unwrap();
        assert!(log.starts_with("Command: sh"));
        assert!(log.contains("running demo"));
    }

    #[tokio::test]
    async fn test_second_trigger_is_rejected_while_active() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(RunRegistry::new(shell("sleep 1", dir.path()), dir.path()));

        let first = registry.launch(TestScope::All).await.unwrap();
        match registry.launch(TestScope::Login).await {
            Err(RunError::Busy { active }) => assert_eq!(active, Some(first.id)),
            other => panic!("expected Busy, got {:?}", other.map(|t| t.id)),
        }

        wait_finished(&registry, first.id).await;
        // permit is released when the background task ends
        let mut relaunched = None;
        for _ in 0..100 {
            if let Ok(ticket) = registry.launch(TestScope::Login).await {
                relaunched = Some(ticket);
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let relaunched = relaunched.expect("permit should be released");
        wait_finished(&registry, relaunched.id).await;
        assert_eq!(registry.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_launch_failure_marks_ticket_failed() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RunnerCommand {
            program: dir.path().join("missing-runner"),
            base_args: vec![],
            workdir: dir.path().to_path_buf(),
        };
        let registry = Arc::new(RunRegistry::new(runner, dir.path()));

        let ticket = registry.launch(TestScope::Demo).await.unwrap();
        let done = wait_finished(&registry, ticket.id).await;
        assert!(matches!(done.status, RunStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_only_dashboard_scopes_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(RunRegistry::new(shell("exit 0", dir.path()), dir.path()));
        assert!(matches!(
            registry.launch(TestScope::Smoke).await,
            Err(RunError::NotTriggerable(TestScope::Smoke))
        ));
    }

    #[tokio::test]
    async fn test_report_generation_outcomes() {
        let dir = tempfile::tempdir().unwrap();

        let ok = RunRegistry::new(shell("exit 0", dir.path()), dir.path());
        assert_eq!(
            ok.generate_report().await,
            ReportOutcome {
                success: true,
                message: "Report generated".to_string()
            }
        );

        let failing = RunRegistry::new(shell("echo 'disk full' >&2; exit 1", dir.path()), dir.path());
        let outcome = failing.generate_report().await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "disk full");
    }

    #[test]
    fn test_config_file_is_forwarded() {
        let config = PathBuf::from("/etc/sauceqa/ci.toml");
        let runner = RunnerCommand::locate("/tmp", Some(&config));

        assert_eq!(
            runner.run_args(TestScope::Demo),
            ["--config", "/etc/sauceqa/ci.toml", "--test-type", "demo"]
        );
        assert_eq!(
            runner.report_args(),
            ["--config", "/etc/sauceqa/ci.toml", "--generate-report"]
        );

        let plain = RunnerCommand::locate("/tmp", None);
        assert_eq!(plain.run_args(TestScope::All), ["--test-type", "all"]);
        assert_eq!(plain.report_args(), ["--generate-report"]);
    }

    #[tokio::test]
    async fn test_finished_tickets_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let registry = Arc::new(
            RunRegistry::new(shell("exit 0", dir.path()), dir.path()).with_ticket_limit(2),
        );

        let mut ids = Vec::new();
        for _ in 0..4 {
            let mut launched = None;
            for _ in 0..100 {
                if let Ok(ticket) = registry.launch(TestScope::Demo).await {
                    launched = Some(ticket);
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            let ticket = launched.expect("permit should be released");
            wait_finished(&registry, ticket.id).await;
            ids.push(ticket.id);
        }

        let kept: Vec<Uuid> = registry.list().await.iter().map(|t| t.id).collect();
        assert_eq!(kept, vec![ids[3], ids[2]]);
        assert!(registry.get(ids[0]).await.is_none());
    }

    #[test]
    fn test_binary_resolution() {
        assert_eq!(
            locate_binary(Some(OsString::from("/opt/sauceqa")), None),
            PathBuf::from("/opt/sauceqa")
        );
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            locate_binary(None, Some(dir.path().join("sauceqa-dashboard"))),
            PathBuf::from(format!("{}{}", RUNNER_BIN, std::env::consts::EXE_SUFFIX))
        );
    }
}
