//! Dashboard HTTP server

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use sauceqa_common::report::{list_reports, MAX_LISTED_REPORTS, REQUIREMENTS};
use sauceqa_common::{Config, Paths, ReportInfo, TestScope};
use sauceqa_e2e::driver::FakeBrowser;
use sauceqa_e2e::scenarios::{catalog, Scenario};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::page;
use crate::runs::{RunError, RunRegistry, RunTicket, RunnerCommand};
use crate::static_files;

pub const PROJECT_NAME: &str = "SauceQA Automation";

/// Shared by every handler
pub struct DashboardState {
    pub config: Config,
    pub paths: Paths,
    pub runs: Arc<RunRegistry>,
    pub started: Instant,
    /// Cases in the full catalog
    pub test_cases: usize,
}

impl DashboardState {
    pub fn new(config: Config, runner: RunnerCommand) -> Self {
        let paths = config.paths();
        let (credentials, test_config) = config.load_test_data();
        let scenarios: Vec<Scenario<FakeBrowser>> = catalog(&credentials, &test_config);

        Self {
            runs: Arc::new(RunRegistry::new(runner, &paths.logs_dir)),
            test_cases: scenarios.len(),
            started: Instant::now(),
            paths,
            config,
        }
    }

    pub fn status(&self) -> StatusInfo {
        StatusInfo {
            status: "running",
            timestamp: now(),
            project: PROJECT_NAME,
            version: sauceqa_common::VERSION,
            uptime: self.started.elapsed().as_secs_f64(),
            test_cases: self.test_cases,
            requirements: REQUIREMENTS.len(),
            dashboard_url: self.config.dashboard.url(),
        }
    }

    pub fn reports(&self) -> sauceqa_common::Result<Vec<ReportInfo>> {
        list_reports(&self.paths.reports_dir, MAX_LISTED_REPORTS)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub status: &'static str,
    pub timestamp: String,
    pub project: &'static str,
    pub version: &'static str,
    /// Seconds since start
    pub uptime: f64,
    pub test_cases: usize,
    pub requirements: usize,
    pub dashboard_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoUser {
    pub username: &'static str,
    pub description: &'static str,
}

/// Static facts about the application under test
#[derive(Debug, Clone, Serialize)]
pub struct TestInfo {
    pub name: &'static str,
    pub url: String,
    pub users: Vec<DemoUser>,
    pub password: &'static str,
    pub features: Vec<&'static str>,
}

impl TestInfo {
    pub fn saucedemo(url: &str) -> Self {
        let users = [
            ("standard_user", "Valid user"),
            ("locked_out_user", "Locked account"),
            ("problem_user", "Problematic user"),
            ("performance_glitch_user", "Slow performance"),
            ("error_user", "Error scenarios"),
            ("visual_user", "Visual testing"),
        ];
        Self {
            name: "Swag Labs",
            url: url.to_string(),
            users: users
                .into_iter()
                .map(|(username, description)| DemoUser { username, description })
                .collect(),
            password: "secret_sauce",
            features: vec!["Login/Logout", "Product browsing", "Shopping cart", "Checkout process"],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
}

impl ActionResponse {
    fn new(success: bool, message: impl Into<String>, run_id: Option<Uuid>) -> Self {
        Self {
            success,
            message: message.into(),
            timestamp: now(),
            run_id,
        }
    }
}

fn now() -> String {
    Local::now().to_rfc3339()
}

/// Create router
pub fn router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/status", get(status_handler))
        .route("/api/reports", get(reports_handler))
        .route("/api/test-info", get(test_info_handler))
        .route("/api/run/:scope", get(run_handler))
        .route("/api/runs", get(list_runs_handler))
        .route("/api/runs/:id", get(get_run_handler))
        .route("/api/generate-report", post(generate_report_handler))
        .route("/reports/*path", get(report_file_handler))
        .route("/static/*path", get(static_file_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the process is stopped
pub async fn serve(listener: TcpListener, state: Arc<DashboardState>) -> anyhow::Result<()> {
    info!("Dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn index_handler(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    let reports = state.reports().unwrap_or_else(|e| {
        error!("Failed to list reports: {}", e);
        Vec::new()
    });
    let active = state.runs.active().await;
    Html(page::render(
        &state.status(),
        &reports,
        &TestInfo::saucedemo(&state.config.base_url),
        active.as_ref(),
    ))
}

async fn status_handler(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    Json(state.status())
}

async fn reports_handler(State(state): State<Arc<DashboardState>>) -> Response {
    match state.reports() {
        Ok(reports) => Json(serde_json::json!({ "reports": reports })).into_response(),
        Err(e) => {
            error!("Failed to list reports: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn test_info_handler(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    Json(TestInfo::saucedemo(&state.config.base_url))
}

async fn run_handler(
    State(state): State<Arc<DashboardState>>,
    Path(scope): Path<String>,
) -> Response {
    let scope: TestScope = match scope.parse() {
        Ok(scope) => scope,
        Err(e) => {
            return (StatusCode::NOT_FOUND, Json(ActionResponse::new(false, e.to_string(), None)))
                .into_response()
        }
    };

    match state.runs.launch(scope).await {
        Ok(ticket) => Json(ActionResponse::new(
            true,
            format!("Started {} tests", scope),
            Some(ticket.id),
        ))
        .into_response(),
        Err(e) => {
            let (status, active) = match &e {
                RunError::Busy { active } => (StatusCode::CONFLICT, *active),
                RunError::NotTriggerable(_) => (StatusCode::NOT_FOUND, None),
            };
            (status, Json(ActionResponse::new(false, e.to_string(), active))).into_response()
        }
    }
}

async fn list_runs_handler(State(state): State<Arc<DashboardState>>) -> Json<Vec<RunTicket>> {
    Json(state.runs.list().await)
}

async fn get_run_handler(
    State(state): State<Arc<DashboardState>>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.runs.get(id).await {
        Some(ticket) => Json(ticket).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("Unknown run {}", id) })),
        )
            .into_response(),
    }
}

async fn generate_report_handler(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    let outcome = state.runs.generate_report().await;
    Json(ActionResponse::new(outcome.success, outcome.message, None))
}

async fn report_file_handler(
    State(state): State<Arc<DashboardState>>,
    Path(path): Path<String>,
) -> Response {
    static_files::serve(&state.paths.reports_dir, &path).await
}

async fn static_file_handler(
    State(state): State<Arc<DashboardState>>,
    Path(path): Path<String>,
) -> Response {
    static_files::serve(&state.paths.static_dir, &path).await
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::tests::{shell, wait_finished};
    use axum::body::Body;
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state(dir: &std::path::Path, script: &str) -> Arc<DashboardState> {
        let config = Config {
            base_dir: dir.to_path_buf(),
            ..Config::default()
        };
        sauceqa_common::initialize(&config.paths()).unwrap();
        Arc::new(DashboardState::new(config, shell(script, dir)))
    }

    async fn call(state: &Arc<DashboardState>, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router(state.clone())
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn call_json(state: &Arc<DashboardState>, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = call(state, method, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_run_trigger_returns_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), "sleep 3");

        let start = Instant::now();
        let (status, body) = call_json(&state, "GET", "/api/run/demo").await;
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Started demo tests");

        let run_id = body["run_id"].as_str().unwrap().to_string();
        let (status, ticket) = call_json(&state, "GET", &format!("/api/runs/{}", run_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ticket["scope"], "demo");
    }

    #[tokio::test]
    async fn test_concurrent_trigger_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), "sleep 1");

        let (_, first) = call_json(&state, "GET", "/api/run/all").await;
        let (status, second) = call_json(&state, "GET", "/api/run/login").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(second["success"], false);
        assert_eq!(second["run_id"], first["run_id"]);
    }

    #[tokio::test]
    async fn test_run_ticket_reaches_completed() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), "exit 1");

        let (_, body) = call_json(&state, "GET", "/api/run/login").await;
        let id: Uuid = body["run_id"].as_str().unwrap().parse().unwrap();
        wait_finished(&state.runs, id).await;

        let (_, ticket) = call_json(&state, "GET", &format!("/api/runs/{}", id)).await;
        assert_eq!(ticket["status"]["state"], "completed");
        assert_eq!(ticket["status"]["exit_code"], 1);

        let (_, runs) = call_json(&state, "GET", "/api/runs").await;
        assert_eq!(runs.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_scope_and_run() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), "exit 0");

        let (status, body) = call_json(&state, "GET", "/api/run/regression").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, _) = call(&state, "GET", &format!("/api/runs/{}", Uuid::new_v4())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&state, "GET", "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generate_report_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();

        let ok = state(dir.path(), "exit 0");
        let (status, body) = call_json(&ok, "POST", "/api/generate-report").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let failing = state(dir.path(), "echo 'template missing' >&2; exit 2");
        let (_, body) = call_json(&failing, "POST", "/api/generate-report").await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "template missing");
    }

    #[tokio::test]
    async fn test_reports_listing_and_serving() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), "exit 0");
        let reports = dir.path().join("reports");
        std::fs::write(reports.join("sauceqa_demo_report_20260101_120000.html"), "<h1>ok</h1>").unwrap();
        std::fs::write(reports.join("results.json"), "{}").unwrap();

        let (_, body) = call_json(&state, "GET", "/api/reports").await;
        let listed = body["reports"].as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["path"], "/reports/sauceqa_demo_report_20260101_120000.html");

        let (status, bytes) = call(&state, "GET", "/reports/sauceqa_demo_report_20260101_120000.html").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"<h1>ok</h1>");

        std::fs::write(dir.path().join("secret.txt"), "s3cret").unwrap();
        let (status, bytes) = call(&state, "GET", "/reports/..%2Fsecret.txt").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_ne!(bytes, b"s3cret");
    }

    #[tokio::test]
    async fn test_status_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), "exit 0");

        let (_, status) = call_json(&state, "GET", "/api/status").await;
        assert_eq!(status["status"], "running");
        assert_eq!(status["test_cases"], state.test_cases);
        assert!(state.test_cases > 0);
        assert_eq!(status["dashboard_url"], "http://127.0.0.1:8080");

        let (_, info) = call_json(&state, "GET", "/api/test-info").await;
        assert_eq!(info["users"].as_array().unwrap().len(), 6);
        assert_eq!(info["password"], "secret_sauce");

        let (status, html) = call(&state, "GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(html).unwrap();
        assert!(html.contains("standard_user"));
        assert!(html.contains("/api/run/demo"));
    }
}
