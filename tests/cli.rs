//! Binary exit codes and log stream.

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bin() -> Command {
    let mut cmd = Command::cargo_bin("continuous_release").unwrap();
    cmd.env_clear();
    cmd
}

fn actions_env(cmd: &mut Command, api_url: &str) {
    cmd.env("GITHUB_TOKEN", "ghs_test")
        .env("GITHUB_ACTIONS", "true")
        .env("GITHUB_REPOSITORY_OWNER", "acme")
        .env("GITHUB_REPOSITORY", "acme/widget")
        .env("GITHUB_SHA", "abc123")
        .env("GITHUB_API_URL", api_url)
        .env("GITHUB_SERVER_URL", "https://github.com");
}

async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap()
        .assert()
}

#[test]
fn test_missing_token_exits_nonzero() {
    bin()
        .env("GITHUB_ACTIONS", "true")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[ERROR]"))
        .stdout(predicate::str::contains("GITHUB_TOKEN environment variable not set."));
}

#[test]
fn test_unsupported_environment_exits_nonzero() {
    bin()
        .env("GITHUB_TOKEN", "ghs_test")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Unsupported CI environment."));
}

#[test]
fn test_invalid_arguments_exit_nonzero() {
    bin()
        .args(["--repo", "acme/widget"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Invalid arguments"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_creates_release_and_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/continuous"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/widget/releases"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3,
            "tag_name": "continuous",
            "name": "continuous",
            "target_commitish": "abc123"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = bin();
    actions_env(&mut cmd, &server.uri());
    run(cmd)
        .await
        .code(0)
        .stdout(predicate::str::contains("[INFO] Starting release management..."))
        .stdout(predicate::str::contains("[VERBOSE] Release Commit Hash: abc123"))
        .stdout(predicate::str::contains("New release created successfully!"))
        .stdout(predicate::str::contains("[ERROR]").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_noop_exits_zero_without_writes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/continuous"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "tag_name": "continuous",
            "target_commitish": "abc123"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = bin();
    actions_env(&mut cmd, &server.uri());
    run(cmd)
        .await
        .code(0)
        .stdout(predicate::str::contains("already exists and has the desired commit hash"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_on_stale_tag_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/continuous"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/widget/releases"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 4,
            "tag_name": "continuous",
            "name": "continuous",
            "target_commitish": "old999"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = bin();
    actions_env(&mut cmd, &server.uri());
    run(cmd)
        .await
        .code(1)
        .stdout(predicate::str::contains("at old999 instead of abc123"))
        .stdout(predicate::str::contains("tags/continuous"))
        .stdout(predicate::str::contains("New release created successfully!").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_permission_denied_prints_settings_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/continuous"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/acme/widget/releases"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "Resource not accessible by integration"
        })))
        .mount(&server)
        .await;

    let mut cmd = bin();
    actions_env(&mut cmd, &server.uri());
    run(cmd)
        .await
        .code(1)
        .stdout(predicate::str::contains(
            "https://github.com/acme/widget/settings/actions",
        ))
        .stdout(predicate::str::contains("Read and write permissions"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_on_fetch_exits_nonzero_without_create() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/continuous"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Server Error"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = bin();
    actions_env(&mut cmd, &server.uri());
    run(cmd)
        .await
        .code(1)
        .stdout(predicate::str::contains("HTTP 500"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dry_run_outside_ci_with_flags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/tags/continuous"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 8,
            "tag_name": "continuous",
            "target_commitish": "old999"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let mut cmd = bin();
    cmd.env("GITHUB_TOKEN", "ghs_test").args([
        "--owner",
        "acme",
        "--repo",
        "widget",
        "--commit",
        "new111",
        "--api-url",
        uri.as_str(),
        "--dry-run",
    ]);
    run(cmd)
        .await
        .code(0)
        .stdout(predicate::str::contains("Dry run: would delete release 8"));
}
