//! End-to-end runs against mocked Better Uptime and Telegram APIs.

use std::{fs, path::Path};

use clap::Parser;
use config::Opts;
use driver::{Driver, RunError};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{Value, json};
use tempfile::TempDir;

const SEND_PATH: &str = "/bottg-token/sendMessage";

fn opts(server: &ServerGuard, state_file: &Path, extra: &[&str]) -> Opts {
    let mut args = vec![
        "uptime-notify".to_owned(),
        "--betteruptime-token=bt-token".to_owned(),
        format!("--betteruptime-url={}", server.url()),
        "--incident-name=Home router".to_owned(),
        "--telegram-token=tg-token".to_owned(),
        "--telegram-chat-id=-100".to_owned(),
        format!("--telegram-url={}", server.url()),
        "--display-offset=+02:00".to_owned(),
        format!("--state-file={}", state_file.display()),
        "--http-timeout-secs=5".to_owned(),
    ];
    args.extend(extra.iter().map(|s| (*s).to_owned()));
    Opts::try_parse_from(args).unwrap()
}

fn incident(id: &str, name: &str, resolved_at: Option<&str>) -> Value {
    json!({
        "id": id,
        "type": "incident",
        "attributes": {
            "name": name,
            "started_at": "2025-03-01T10:00:00.000Z",
            "acknowledged_at": null,
            "resolved_at": resolved_at,
        }
    })
}

async fn incidents_mock(server: &mut ServerGuard, data: Vec<Value>) -> Mock {
    server
        .mock("GET", "/api/v2/incidents")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer bt-token")
        .with_body(json!({ "data": data, "pagination": { "next": null } }).to_string())
        .create_async()
        .await
}

fn saved_ids(state_file: &Path) -> Vec<String> {
    let raw: Value = serde_json::from_str(&fs::read_to_string(state_file).unwrap()).unwrap();
    assert_eq!(raw["version"], 1);
    raw["incidents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn incident_lifecycle_across_runs() {
    let dir = TempDir::new().unwrap();
    let state_file = dir.path().join("state.json");

    // first run: one matching open incident, one unrelated
    let mut server = Server::new_async().await;
    let _incidents = incidents_mock(
        &mut server,
        vec![incident("1", "Home router", None), incident("2", "Printer", None)],
    )
    .await;
    let opened = server
        .mock("POST", SEND_PATH)
        .match_body(Matcher::PartialJson(json!({
            "chat_id": "-100",
            "text": "\u{1f973} \u{1f4a1} \u{1f50c} \u{1f4e1} New incident \"Home router\" started at 2025-03-01 12:00"
        })))
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let report = Driver::from_opts(&opts(&server, &state_file, &[])).unwrap().run().await.unwrap();
    opened.assert_async().await;
    assert!(report.is_clean());
    assert_eq!(report.opened.len(), 1);
    assert_eq!(saved_ids(&state_file), vec!["1"]);

    // second run: nothing changed, nothing sent
    let mut server = Server::new_async().await;
    let _incidents = incidents_mock(&mut server, vec![incident("1", "Home router", None)]).await;
    let silent = server.mock("POST", SEND_PATH).expect(0).create_async().await;

    let report = Driver::from_opts(&opts(&server, &state_file, &[])).unwrap().run().await.unwrap();
    silent.assert_async().await;
    assert_eq!(report.delivered(), 0);
    assert_eq!(saved_ids(&state_file), vec!["1"]);

    // third run: the incident is resolved
    let mut server = Server::new_async().await;
    let _incidents = incidents_mock(
        &mut server,
        vec![incident("1", "Home router", Some("2025-03-01T10:07:00.000Z"))],
    )
    .await;
    let resolved = server
        .mock("POST", SEND_PATH)
        .match_body(Matcher::Regex("resolved at 2025-03-01 12:07".to_owned()))
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let report = Driver::from_opts(&opts(&server, &state_file, &[])).unwrap().run().await.unwrap();
    resolved.assert_async().await;
    assert_eq!(report.resolved.len(), 1);
    assert!(saved_ids(&state_file).is_empty());
}

#[tokio::test]
async fn rejected_notification_is_retried_by_next_run() {
    let dir = TempDir::new().unwrap();
    let state_file = dir.path().join("state.json");

    let mut server = Server::new_async().await;
    let _incidents = incidents_mock(&mut server, vec![incident("1", "Home router", None)]).await;
    let _rejected = server
        .mock("POST", SEND_PATH)
        .with_body(r#"{"ok":false,"description":"chat not found"}"#)
        .create_async()
        .await;

    let report = Driver::from_opts(&opts(&server, &state_file, &[])).unwrap().run().await.unwrap();
    assert_eq!(report.exit_code(), 2);
    assert!(saved_ids(&state_file).is_empty());

    let mut server = Server::new_async().await;
    let _incidents = incidents_mock(&mut server, vec![incident("1", "Home router", None)]).await;
    let delivered = server
        .mock("POST", SEND_PATH)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let report = Driver::from_opts(&opts(&server, &state_file, &[])).unwrap().run().await.unwrap();
    delivered.assert_async().await;
    assert_eq!(report.exit_code(), 0);
    assert_eq!(saved_ids(&state_file), vec!["1"]);
}

#[tokio::test]
async fn corrupt_state_aborts_without_requests() {
    let dir = TempDir::new().unwrap();
    let state_file = dir.path().join("state.json");
    fs::write(&state_file, "{ not json").unwrap();

    let mut server = Server::new_async().await;
    let fetch = server
        .mock("GET", "/api/v2/incidents")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let send = server.mock("POST", SEND_PATH).expect(0).create_async().await;

    let err = Driver::from_opts(&opts(&server, &state_file, &[])).unwrap().run().await.unwrap_err();
    fetch.assert_async().await;
    send.assert_async().await;
    assert!(matches!(err, RunError::StoreRead(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(fs::read_to_string(&state_file).unwrap(), "{ not json");
}

#[tokio::test]
async fn truncated_incident_list_aborts_without_resolving() {
    let dir = TempDir::new().unwrap();
    let state_file = dir.path().join("state.json");

    // incident 99 was reported open by an earlier run
    let mut server = Server::new_async().await;
    let _incidents = incidents_mock(&mut server, vec![incident("99", "Home router", None)]).await;
    let _send = server.mock("POST", SEND_PATH).with_body(r#"{"ok":true}"#).create_async().await;
    Driver::from_opts(&opts(&server, &state_file, &[])).unwrap().run().await.unwrap();
    assert_eq!(saved_ids(&state_file), vec!["99"]);
    let before = fs::read_to_string(&state_file).unwrap();

    // the provider keeps handing out another page and 99 is never reached
    let mut server = Server::new_async().await;
    let next = format!("{}/api/v2/incidents?page=again", server.url());
    let _endless = server
        .mock("GET", "/api/v2/incidents")
        .match_query(Matcher::Any)
        .with_body(json!({ "data": [], "pagination": { "next": next } }).to_string())
        .create_async()
        .await;
    let send = server.mock("POST", SEND_PATH).expect(0).create_async().await;

    let err = Driver::from_opts(&opts(&server, &state_file, &[])).unwrap().run().await.unwrap_err();
    send.assert_async().await;
    assert!(matches!(err, RunError::Fetch(incident::FetchError::Truncated { .. })));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(fs::read_to_string(&state_file).unwrap(), before);
}

#[tokio::test]
async fn acknowledges_after_delivery_when_enabled() {
    let dir = TempDir::new().unwrap();
    let state_file = dir.path().join("state.json");

    let mut server = Server::new_async().await;
    let _incidents = incidents_mock(&mut server, vec![incident("7", "Home router", None)]).await;
    let _send = server.mock("POST", SEND_PATH).with_body(r#"{"ok":true}"#).create_async().await;
    let ack = server
        .mock("POST", "/api/v2/incidents/7/acknowledge")
        .match_header("authorization", "Bearer bt-token")
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let opts = opts(&server, &state_file, &["--acknowledge"]);
    let report = Driver::from_opts(&opts).unwrap().run().await.unwrap();
    ack.assert_async().await;
    assert_eq!(report.acknowledge_failures, 0);
}

#[tokio::test]
async fn dry_run_sends_nothing_and_keeps_state_file() {
    let dir = TempDir::new().unwrap();
    let state_file = dir.path().join("state.json");

    let mut server = Server::new_async().await;
    let _incidents = incidents_mock(&mut server, vec![incident("1", "Home router", None)]).await;
    let send = server.mock("POST", SEND_PATH).expect(0).create_async().await;

    let opts = opts(&server, &state_file, &["--dry-run", "--acknowledge"]);
    let report = Driver::from_opts(&opts).unwrap().run().await.unwrap();
    send.assert_async().await;
    assert_eq!(report.opened.len(), 1);
    assert!(!report.state_saved);
    assert!(!state_file.exists());
}
