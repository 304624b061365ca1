//! End-to-end watch cycles against a mock scope export endpoint.

use std::time::Duration;

use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scopewatch::config::{Config, HackerOneConfig};
use scopewatch::fetcher::ScopeFetcher;
use scopewatch::http_client::HttpClient;
use scopewatch::storage::SnapshotStore;
use scopewatch::watcher::{CheckOutcome, ProgramWatcher};
use scopewatch::ScopeError;

const HEADER: &str =
    "identifier,asset_type,instruction,eligible_for_bounty,eligible_for_submission,max_severity\n";

async fn serve(server: &MockServer, program: &str, rows: &str, filename: Option<&str>) {
    server.reset().await;
    let mut template = ResponseTemplate::new(200).set_body_string(format!("{}{}", HEADER, rows));
    if let Some(name) = filename {
        template = template.insert_header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", name).as_str(),
        );
    }
    Mock::given(method("GET"))
        .and(path(format!("/teams/{}/assets/download_csv.csv", program)))
        .respond_with(template)
        .mount(server)
        .await;
}

fn watcher(server: &MockServer, state_dir: &std::path::Path) -> ProgramWatcher<ScopeFetcher> {
    let hackerone = HackerOneConfig {
        base_url: format!("{}/teams/$PROGRAM$/assets/download_csv.csv", server.uri()),
        watch: vec![],
    };
    let client = HttpClient::new(Duration::from_secs(5), None).unwrap();
    ProgramWatcher::new(
        ScopeFetcher::new(client, hackerone),
        SnapshotStore::open(state_dir).unwrap(),
    )
}

#[tokio::test]
async fn test_new_eligible_asset_is_reported() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let watcher = watcher(&server, dir.path());

    serve(&server, "dyson", "a.com,URL,,true,true,critical\n", Some("dyson_1.csv")).await;
    let first = watcher.check_program("dyson").await.unwrap();
    assert!(matches!(first, CheckOutcome::NewProgram { .. }));
    assert_eq!(watcher.store().snapshot_files("dyson").unwrap().len(), 1);

    serve(
        &server,
        "dyson",
        "a.com,URL,,true,true,critical\nb.com,URL,,true,true,high\n",
        Some("dyson_2.csv"),
    )
    .await;
    let second = watcher.check_program("dyson").await.unwrap();
    assert_eq!(second.identifiers().to_vec(), vec!["b.com".to_string()]);

    let files = watcher.store().snapshot_files("dyson").unwrap();
    assert_eq!(files, vec![dir.path().join("dyson").join("dyson_2.csv")]);
}

#[tokio::test]
async fn test_unchanged_scope_removes_prior_file() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let watcher = watcher(&server, dir.path());

    serve(&server, "dyson", "a.com,URL,,true,true,critical\n", Some("dyson_1.csv")).await;
    watcher.check_program("dyson").await.unwrap();

    serve(&server, "dyson", "a.com,URL,,True,TRUE,critical\n", Some("dyson_2.csv")).await;
    let outcome = watcher.check_program("dyson").await.unwrap();
    assert!(matches!(outcome, CheckOutcome::NoUpdate { .. }));
    assert!(outcome.identifiers().is_empty());

    let files = watcher.store().snapshot_files("dyson").unwrap();
    assert_eq!(files, vec![dir.path().join("dyson").join("dyson_2.csv")]);
}

#[tokio::test]
async fn test_same_filename_keeps_one_snapshot() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let watcher = watcher(&server, dir.path());

    serve(&server, "dyson", "a.com,URL,,true,true,critical\n", None).await;
    watcher.check_program("dyson").await.unwrap();

    serve(
        &server,
        "dyson",
        "a.com,URL,,true,true,critical\nc.com,URL,,true,true,low\n",
        None,
    )
    .await;
    let outcome = watcher.check_program("dyson").await.unwrap();
    assert_eq!(outcome.identifiers().to_vec(), vec!["c.com".to_string()]);

    let files = watcher.store().snapshot_files("dyson").unwrap();
    assert_eq!(files, vec![dir.path().join("dyson").join("dyson.csv")]);
}

#[tokio::test]
async fn test_ineligible_change_reports_update_without_identifiers() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let watcher = watcher(&server, dir.path());

    serve(&server, "dyson", "a.com,URL,,true,true,critical\n", Some("1.csv")).await;
    watcher.check_program("dyson").await.unwrap();

    serve(
        &server,
        "dyson",
        "a.com,URL,,true,true,critical\nb.com,URL,,false,true,none\n",
        Some("2.csv"),
    )
    .await;
    let outcome = watcher.check_program("dyson").await.unwrap();
    assert!(matches!(outcome, CheckOutcome::Updated { .. }));
    assert!(outcome.identifiers().is_empty());
}

#[tokio::test]
async fn test_watch_all_skips_failing_program() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let watcher = watcher(&server, dir.path());

    // Only "security" is served; "gone" gets wiremock's default 404.
    serve(&server, "security", "x.com,URL,,true,true,high\n", None).await;

    let programs = vec!["gone".to_string(), "security".to_string()];
    let report = watcher.watch_all(&programs).await;

    assert_eq!(report.programs.len(), 2);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "gone");
    assert!(matches!(failures[0].1, ScopeError::Fetch { .. }));
    assert!(watcher.store().snapshot_files("gone").unwrap().is_empty());
    assert_eq!(watcher.store().snapshot_files("security").unwrap().len(), 1);
}

#[test]
fn test_bundled_config_parses() {
    let config = Config::load_from_path(
        &std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config.yaml"),
    )
    .unwrap();
    assert!(config.hackerone.base_url.contains("$PROGRAM$"));
    assert!(!config.hackerone.watch.is_empty());
}
