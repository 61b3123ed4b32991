//! Full catalog against the in-memory demo site

use sauceqa_common::{Config, Credentials, TestConfig};
use sauceqa_e2e::driver::FakeBrowser;
use sauceqa_e2e::harness::{EXIT_FAILURES, EXIT_OK};
use sauceqa_e2e::scenarios::{catalog, Scenario, SUITES};
use sauceqa_e2e::{exit_code, FakeSessions, Harness, HarnessOptions, Selection};

/// Lay out the fixture files the framework checks look for
fn write_fixtures(config: &Config) {
    let paths = config.paths();
    std::fs::create_dir_all(&paths.test_data_dir).unwrap();
    std::fs::write(
        paths.credentials_file(),
        serde_json::to_string_pretty(&Credentials::default_fixture()).unwrap(),
    )
    .unwrap();
    std::fs::write(
        paths.test_config_file(),
        serde_json::to_string_pretty(&TestConfig::default()).unwrap(),
    )
    .unwrap();
}

fn offline_harness(base_dir: &std::path::Path, parallel: bool) -> Harness<FakeSessions> {
    let config = Config {
        base_dir: base_dir.to_path_buf(),
        ..Config::default()
    };
    write_fixtures(&config);
    Harness::new(
        FakeSessions::new(&config),
        config,
        Credentials::default_fixture(),
        TestConfig::default(),
        HarnessOptions {
            parallel,
            workers: 4,
            screenshot_on_failure: true,
            retries: 0,
        },
    )
}

fn full_catalog() -> Vec<Scenario<FakeBrowser>> {
    catalog(&Credentials::default_fixture(), &TestConfig::default())
}

#[tokio::test(start_paused = true)]
async fn offline_catalog_passes() {
    let dir = tempfile::tempdir().unwrap();
    let harness = offline_harness(dir.path(), false);
    let scenarios = full_catalog();
    let expected = scenarios.len();

    let result = harness.run(scenarios).await;

    let failures: Vec<_> = result
        .results
        .iter()
        .filter(|r| !r.success())
        .map(|r| format!("{}: {:?}", r.name, r.error))
        .collect();
    assert!(failures.is_empty(), "failed cases: {:#?}", failures);
    assert_eq!(result.total, expected);
    assert_eq!(exit_code(&result), EXIT_OK);

    for suite in SUITES {
        assert!(result.results.iter().any(|r| r.suite == *suite));
    }

    // demo cases save screenshots of the login page and the inventory
    let shots: Vec<_> = std::fs::read_dir(dir.path().join("reports"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.ends_with(".png"))
        .collect();
    assert!(shots.iter().any(|n| n.starts_with("screenshot_login_page_")));
    assert!(shots.iter().any(|n| n.starts_with("screenshot_login_success_")));
}

#[tokio::test(start_paused = true)]
async fn parallel_smoke_selection() {
    let dir = tempfile::tempdir().unwrap();
    let harness = offline_harness(dir.path(), true);
    let selection = Selection {
        markers: vec!["smoke".to_string()],
        ..Default::default()
    };
    let scenarios = selection.apply(full_catalog());
    let names: Vec<String> = scenarios.iter().map(|s| s.name.clone()).collect();

    let result = harness.run(scenarios).await;
    assert!(result.success(), "{:#?}", result.results);
    let ran: Vec<String> = result.results.iter().map(|r| r.name.clone()).collect();
    assert_eq!(ran, names);
    assert!(result.results.iter().any(|r| r.suite == "framework"));
}

#[tokio::test(start_paused = true)]
async fn wrong_expectation_fails_only_its_case() {
    let dir = tempfile::tempdir().unwrap();
    let harness = offline_harness(dir.path(), false);

    let mut credentials = Credentials::default_fixture();
    credentials.invalid[0].expected_error = "Welcome back".to_string();
    let scenarios = Selection {
        suites: vec!["login".to_string()],
        ..Default::default()
    }
    .apply(catalog::<FakeBrowser>(&credentials, &TestConfig::default()));

    let result = harness.run(scenarios).await;
    assert_eq!(result.failed, 1);
    assert_eq!(exit_code(&result), EXIT_FAILURES);

    let failed = result.results.iter().find(|r| !r.success()).unwrap();
    assert!(failed.name.starts_with("test_invalid_login[0-"));
    assert!(failed.error.as_deref().unwrap().contains("Welcome back"));
    assert!(failed.screenshot.as_ref().unwrap().exists());
}

#[tokio::test]
async fn reports_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let harness = offline_harness(dir.path(), false);
    let scenarios = Selection {
        suites: vec!["password_reset".to_string()],
        ..Default::default()
    }
    .apply(full_catalog());

    let result = harness.run(scenarios).await;
    let html = dir.path().join("reports").join("report.html");
    let json = dir.path().join("reports").join("results.json");
    result.write_html(&html).unwrap();
    result.write_json(&json).unwrap();

    let page = std::fs::read_to_string(&html).unwrap();
    assert!(page.contains("test_password_reset_requests[0-test@example.com]"));
    let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    assert_eq!(parsed["total"], result.total);
}
