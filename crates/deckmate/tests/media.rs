//! Tests for media actions.

mod common;

use deckmate::{AnkiClient, StoreMediaParams};
use common::{mock_action, mock_anki_response, setup_mock_server};

fn client_for(server: &wiremock::MockServer) -> AnkiClient {
    AnkiClient::builder().url(server.uri()).build()
}

#[tokio::test]
async fn store_media_from_base64() {
    let server = setup_mock_server().await;
    mock_action(
        &server,
        "storeMediaFile",
        mock_anki_response("01-001_01.png"),
    )
    .await;

    let client = client_for(&server);
    let params = StoreMediaParams::from_base64("01-001_01.png", "SGVsbG8gV29ybGQ=");
    let name = client.media().store(params).await.unwrap();
    assert_eq!(name, "01-001_01.png");
}

#[tokio::test]
async fn list_media_by_pattern() {
    let server = setup_mock_server().await;
    mock_action(
        &server,
        "getMediaFilesNames",
        mock_anki_response(vec!["01-001_01.png", "01-001_02.png"]),
    )
    .await;

    let client = client_for(&server);
    let files = client.media().list("01-001_*").await.unwrap();
    assert_eq!(files.len(), 2);
}

#[tokio::test]
async fn delete_media() {
    let server = setup_mock_server().await;
    mock_action(
        &server,
        "deleteMediaFile",
        mock_anki_response(serde_json::Value::Null),
    )
    .await;

    let client = client_for(&server);
    client.media().delete("01-001_01.png").await.unwrap();
}
