//! Tests for note actions.

mod common;

use std::collections::HashMap;

use deckmate::{AnkiClient, Error, Note};
use common::{mock_action, mock_anki_error, mock_anki_response, setup_mock_server};

fn client_for(server: &wiremock::MockServer) -> AnkiClient {
    AnkiClient::builder().url(server.uri()).build()
}

#[tokio::test]
async fn add_note_returns_id() {
    let server = setup_mock_server().await;
    mock_action(&server, "addNote", mock_anki_response(1234567890_i64)).await;

    let client = client_for(&server);
    let note = Note::basic("Deck::Lesson 01", "Basic", "What is a tensor?", "...")
        .with_tags(vec!["uid:01-001".to_string(), "ch01".to_string()])
        .allow_duplicate();

    let id = client.notes().add(note).await.unwrap();
    assert_eq!(id, 1234567890);
}

#[tokio::test]
async fn find_notes_by_query() {
    let server = setup_mock_server().await;
    mock_action(&server, "findNotes", mock_anki_response(vec![1_i64, 2, 3])).await;

    let client = client_for(&server);
    let ids = client
        .notes()
        .find(&deckmate::query::deck_scope("Deck"))
        .await
        .unwrap();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn notes_info_parses_fields_and_tags() {
    let server = setup_mock_server().await;
    mock_action(
        &server,
        "notesInfo",
        mock_anki_response(vec![serde_json::json!({
            "noteId": 99_i64,
            "modelName": "Basic",
            "tags": ["uid:01-001", "ch01", "math"],
            "fields": {
                "Front": {"value": "What is a tensor?", "order": 0},
                "Back": {"value": "...", "order": 1}
            },
            "cards": [501_i64]
        })]),
    )
    .await;

    let client = client_for(&server);
    let infos = client.notes().info(&[99]).await.unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].note_id, 99);
    assert_eq!(infos[0].field("Front"), Some("What is a tensor?"));
    assert!(infos[0].tags.contains(&"uid:01-001".to_string()));
    assert_eq!(infos[0].cards, vec![501]);
}

#[tokio::test]
async fn update_fields_is_void() {
    let server = setup_mock_server().await;
    mock_action(
        &server,
        "updateNoteFields",
        mock_anki_response(serde_json::Value::Null),
    )
    .await;

    let client = client_for(&server);
    let mut fields = HashMap::new();
    fields.insert("Back".to_string(), "new back".to_string());
    client.notes().update_fields(99, &fields).await.unwrap();
}

#[tokio::test]
async fn set_tags_replaces_all() {
    let server = setup_mock_server().await;
    mock_action(
        &server,
        "updateNoteTags",
        mock_anki_response(serde_json::Value::Null),
    )
    .await;

    let client = client_for(&server);
    let tags = vec!["uid:01-001".to_string(), "ch01".to_string()];
    client.notes().set_tags(99, &tags).await.unwrap();
}

#[tokio::test]
async fn delete_notes() {
    let server = setup_mock_server().await;
    mock_action(
        &server,
        "deleteNotes",
        mock_anki_response(serde_json::Value::Null),
    )
    .await;

    let client = client_for(&server);
    client.notes().delete(&[99]).await.unwrap();
}

#[tokio::test]
async fn anki_error_is_surfaced() {
    let server = setup_mock_server().await;
    mock_action(&server, "addNote", mock_anki_error("deck was not found")).await;

    let client = client_for(&server);
    let note = Note::basic("Missing", "Basic", "q", "a");
    let err = client.notes().add(note).await.unwrap_err();
    assert!(matches!(err, Error::AnkiConnect(msg) if msg.contains("deck was not found")));
}

#[tokio::test]
async fn permission_error_is_classified() {
    let server = setup_mock_server().await;
    mock_action(
        &server,
        "findNotes",
        mock_anki_error("valid api key must be provided: permission denied"),
    )
    .await;

    let client = client_for(&server);
    let err = client.notes().find("deck:X").await.unwrap_err();
    assert!(matches!(err, Error::PermissionDenied));
}
