#![forbid(unsafe_code)]

use pk_service::{FormService, command_names};
use serde_json::json;
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("pk_service_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn every_advertised_command_dispatches() {
    let dir = temp_dir("every_command_dispatches");
    let mut service = FormService::open(&dir).expect("open service");

    // No session attached: every real command must answer with the
    // NOT_AUTHENTICATED envelope, proving it reached its handler.
    for &name in command_names() {
        let response = service.handle(name, json!({}));
        assert_eq!(
            response["error"]["code"], "NOT_AUTHENTICATED",
            "command {name} did not reach its handler"
        );
    }
}

#[test]
fn unknown_commands_get_an_envelope_not_a_panic() {
    let dir = temp_dir("unknown_command");
    let mut service = FormService::open(&dir).expect("open service");
    let response = service.handle("procedure_launch", json!({}));
    assert_eq!(response["success"], false);
    assert_eq!(response["error"]["code"], "UNKNOWN_COMMAND");
}

#[test]
fn command_names_are_unique() {
    let mut names: Vec<_> = command_names().to_vec();
    let before = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), before);
}
