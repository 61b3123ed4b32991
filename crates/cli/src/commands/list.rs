//! `--list-tests`

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use sauceqa_common::{Credentials, SuiteTarget, TestConfig, TestScope};
use sauceqa_e2e::driver::FakeBrowser;
use sauceqa_e2e::scenarios::{catalog, Scenario};
use sauceqa_e2e::Selection;

/// One catalog row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub markers: String,
    pub description: String,
}

/// Catalog entries selected by `scope`
pub fn entries(scope: TestScope, credentials: &Credentials, test_config: &TestConfig) -> Vec<CatalogEntry> {
    // listing only, the driver is never used
    let scenarios: Vec<Scenario<FakeBrowser>> = catalog(credentials, test_config);
    selection(scope)
        .apply(scenarios)
        .into_iter()
        .map(|s| CatalogEntry {
            id: s.id(),
            markers: s.markers.join(", "),
            description: s.description.clone(),
        })
        .collect()
}

fn selection(scope: TestScope) -> Selection {
    match scope.target() {
        SuiteTarget::Everything => Selection::default(),
        SuiteTarget::Suite(name) => Selection {
            suites: vec![name.to_string()],
            ..Default::default()
        },
        SuiteTarget::Marker(name) => Selection {
            markers: vec![name.to_string()],
            ..Default::default()
        },
    }
}

pub fn execute(scope: TestScope, credentials: &Credentials, test_config: &TestConfig) {
    let entries = entries(scope, credentials, test_config);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Test", "Markers", "Description"]);
    for entry in &entries {
        table.add_row(vec![entry.id.clone(), entry.markers.clone(), entry.description.clone()]);
    }

    println!("{table}");
    println!("{} test(s) for '{}'", entries.len(), scope);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_select_expected_suites() {
        let credentials = Credentials::default_fixture();
        let test_config = TestConfig::default();

        let all = entries(TestScope::All, &credentials, &test_config);
        let login = entries(TestScope::Login, &credentials, &test_config);
        let reset = entries(TestScope::Reset, &credentials, &test_config);
        let demo = entries(TestScope::Demo, &credentials, &test_config);
        let smoke = entries(TestScope::Smoke, &credentials, &test_config);

        let framework = all.iter().filter(|e| e.id.starts_with("framework::")).count();
        assert_eq!(framework, 5);
        assert_eq!(all.len(), framework + login.len() + reset.len() + demo.len());
        assert!(login.iter().all(|e| e.id.starts_with("login::")));
        assert!(reset.iter().all(|e| e.id.starts_with("password_reset::")));
        assert!(demo.iter().all(|e| e.id.starts_with("demo::")));
        assert_eq!(smoke.len(), framework + login.len() + demo.len());
    }
}
