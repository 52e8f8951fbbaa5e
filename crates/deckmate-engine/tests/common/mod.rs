//! Common test utilities for deckmate-engine tests.

use std::fs;
use std::path::Path;

use deckmate::AnkiClient;
use serde::Serialize;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

/// Start a new mock AnkiConnect server.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Create a client pointed at the mock server.
pub fn client_for_mock(server: &MockServer) -> AnkiClient {
    AnkiClient::builder().url(server.uri()).build()
}

/// Create a successful AnkiConnect response.
pub fn mock_anki_response<T: Serialize>(result: T) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "result": result,
        "error": null
    }))
}

/// Create an error AnkiConnect response.
#[allow(dead_code)]
pub fn mock_anki_error(error: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "result": null,
        "error": error
    }))
}

/// Mount a mock for a specific action (expect exactly 1 call).
pub async fn mock_action(server: &MockServer, action: &str, response: ResponseTemplate) {
    mock_action_times(server, action, response, 1).await;
}

/// Mount a mock for a specific action with an expected call count.
pub async fn mock_action_times(
    server: &MockServer,
    action: &str,
    response: ResponseTemplate,
    times: u64,
) {
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "action": action,
            "version": 6
        })))
        .respond_with(response)
        .expect(Times::from(times))
        .mount(server)
        .await;
}

/// Mount a mock matching the action and a partial params body.
#[allow(dead_code)]
pub async fn mock_action_params(
    server: &MockServer,
    action: &str,
    params: serde_json::Value,
    response: ResponseTemplate,
) {
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "action": action,
            "version": 6,
            "params": params
        })))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

/// Mount a mock asserting an action is never called.
#[allow(dead_code)]
pub async fn mock_action_never(server: &MockServer, action: &str) {
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "action": action,
            "version": 6
        })))
        .respond_with(mock_anki_error("must not be called"))
        .expect(0)
        .mount(server)
        .await;
}

/// Write a content directory `config.json` with defaults.
#[allow(dead_code)]
pub fn write_config(dir: &Path, deck: &str) {
    fs::write(
        dir.join("config.json"),
        serde_json::json!({ "deck": deck }).to_string(),
    )
    .unwrap();
}

/// Write a lesson file with the given cards.
#[allow(dead_code)]
pub fn write_lesson(dir: &Path, id: u32, cards: serde_json::Value) {
    let body = serde_json::json!({
        "title": format!("Lesson {:02}", id),
        "objectives": [],
        "cards": cards,
    });
    fs::write(
        dir.join(format!("lesson_{:02}.json", id)),
        serde_json::to_string_pretty(&body).unwrap(),
    )
    .unwrap();
}

/// A remote note body for `notesInfo` responses.
#[allow(dead_code)]
pub fn remote_note(
    note_id: i64,
    front: &str,
    back: &str,
    tags: &[&str],
    cards: &[i64],
) -> serde_json::Value {
    serde_json::json!({
        "noteId": note_id,
        "modelName": "Basic",
        "tags": tags,
        "fields": {
            "Front": {"value": front, "order": 0},
            "Back": {"value": back, "order": 1}
        },
        "cards": cards
    })
}
