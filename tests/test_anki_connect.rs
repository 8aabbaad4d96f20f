mod helpers;

use ankirubi::application::protocol::{FIND_NOTES, NOTES_INFO};
use ankirubi::domain::{FetchError, Note};
use ankirubi::util::testing::notes_info_response;
use anyhow::Result;
use helpers::{settings, AnkiConnectServer};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn given_well_formed_responses_when_fetching_then_returns_normalized_note() -> Result<()> {
    // Arrange
    let anki = AnkiConnectServer::start().await;
    anki.respond_to(FIND_NOTES, json!({ "result": [42], "error": null }))
        .await;
    anki.respond_to(
        NOTES_INFO,
        json!({ "result": [{
            "noteId": 42,
            "modelName": "X",
            "tags": [],
            "fields": {
                "word": { "value": "話す" },
                "rubi": { "value": "はなす" },
                "def": { "value": "[[[\"v5s\"],[\"to speak\"]]]" }
            }
        }], "error": null }),
    )
    .await;

    // Act
    let note = anki.fetcher().fetch_random_note().await?;

    // Assert
    assert_eq!(
        note,
        Note {
            id: "42".to_string(),
            word: "話す".to_string(),
            rubi: "はなす".to_string(),
            def: "[[[\"v5s\"],[\"to speak\"]]]".to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn given_fetch_when_sending_requests_then_uses_anki_connect_wire_format() -> Result<()> {
    // Arrange
    let anki = AnkiConnectServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "action": "findNotes",
            "version": 6,
            "params": { "query": settings().query }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [7] })))
        .expect(1)
        .mount(&anki.server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(json!({
            "action": "notesInfo",
            "version": 6,
            "params": { "notes": [7] }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(notes_info_response(7, "w", "r", "[]")),
        )
        .expect(1)
        .mount(&anki.server)
        .await;

    // Act
    let note = anki.fetcher().fetch_random_note().await?;

    // Assert
    assert_eq!(note.id, "7");
    Ok(())
}

#[tokio::test]
async fn given_malformed_find_notes_when_fetching_then_never_requests_note_info() {
    // Arrange
    let anki = AnkiConnectServer::start().await;
    anki.respond_to(FIND_NOTES, json!({ "result": ["42"] })).await;
    anki.respond_to_times(NOTES_INFO, notes_info_response(42, "w", "r", "[]"), 0)
        .await;

    // Act
    let result = anki.fetcher().fetch_random_note().await;

    // Assert
    assert!(matches!(
        result,
        Err(FetchError::Malformed {
            action: FIND_NOTES,
            ..
        })
    ));
}

#[tokio::test]
async fn given_missing_result_when_fetching_then_returns_malformed() {
    let anki = AnkiConnectServer::start().await;
    anki.respond_to(FIND_NOTES, json!({ "error": null })).await;

    let result = anki.fetcher().fetch_random_note().await;

    assert!(matches!(result, Err(FetchError::Malformed { .. })));
}

#[tokio::test]
async fn given_empty_candidate_list_when_fetching_then_returns_no_candidates() {
    let anki = AnkiConnectServer::start().await;
    anki.respond_to(FIND_NOTES, json!({ "result": [], "error": null }))
        .await;
    anki.respond_to_times(NOTES_INFO, notes_info_response(1, "w", "r", "[]"), 0)
        .await;

    let result = anki.fetcher().fetch_random_note().await;

    assert_eq!(result, Err(FetchError::NoCandidates));
}

#[tokio::test]
async fn given_empty_notes_info_result_when_fetching_then_returns_malformed() {
    let anki = AnkiConnectServer::start().await;
    anki.respond_to(FIND_NOTES, json!({ "result": [3] })).await;
    anki.respond_to(NOTES_INFO, json!({ "result": [], "error": null }))
        .await;

    let result = anki.fetcher().fetch_random_note().await;

    assert!(matches!(
        result,
        Err(FetchError::Malformed {
            action: NOTES_INFO,
            ..
        })
    ));
}

#[tokio::test]
async fn given_non_string_field_value_when_fetching_then_returns_malformed() {
    let anki = AnkiConnectServer::start().await;
    anki.respond_to(FIND_NOTES, json!({ "result": [3] })).await;
    anki.respond_to(
        NOTES_INFO,
        json!({ "result": [{
            "noteId": 3,
            "modelName": "X",
            "tags": [],
            "fields": {
                "word": { "value": 3 },
                "rubi": { "value": "r" },
                "def": { "value": "[]" }
            }
        }] }),
    )
    .await;

    let result = anki.fetcher().fetch_random_note().await;

    assert!(matches!(result, Err(FetchError::Malformed { .. })));
}

#[tokio::test]
async fn given_service_error_when_fetching_then_returns_service_error() {
    let anki = AnkiConnectServer::start().await;
    anki.respond_to(
        FIND_NOTES,
        json!({ "result": null, "error": "unsupported action" }),
    )
    .await;

    let result = anki.fetcher().fetch_random_note().await;

    assert_eq!(
        result,
        Err(FetchError::Service {
            action: FIND_NOTES,
            message: "unsupported action".to_string(),
        })
    );
}

#[tokio::test]
async fn given_http_error_status_when_fetching_then_returns_transport_error() {
    let anki = AnkiConnectServer::start().await;
    anki.respond_with(FIND_NOTES, ResponseTemplate::new(500))
        .await;

    let result = anki.fetcher().fetch_random_note().await;

    assert!(matches!(result, Err(FetchError::Transport(_))));
}

#[tokio::test]
async fn given_non_json_body_when_fetching_then_returns_malformed() {
    let anki = AnkiConnectServer::start().await;
    anki.respond_with(
        FIND_NOTES,
        ResponseTemplate::new(200).set_body_string("AnkiConnect v.6"),
    )
    .await;

    let result = anki.fetcher().fetch_random_note().await;

    assert!(matches!(result, Err(FetchError::Malformed { .. })));
}

#[tokio::test]
async fn given_slow_service_when_timeout_configured_then_returns_transport_error() {
    // Arrange
    let anki = AnkiConnectServer::start().await;
    anki.respond_with(
        FIND_NOTES,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "result": [1] }))
            .set_delay(Duration::from_secs(5)),
    )
    .await;
    let client = anki.client(Some(Duration::from_millis(200)));
    let fetcher = ankirubi::application::NoteFetcher::new(client, settings());

    // Act
    let result = fetcher.fetch_random_note().await;

    // Assert
    assert!(matches!(result, Err(FetchError::Transport(_))));
}

#[tokio::test]
async fn given_unreachable_service_when_fetching_then_returns_transport_error() {
    let client = ankirubi::infrastructure::AnkiConnectClient::new("http://127.0.0.1:1", None)
        .expect("Client should build");
    let fetcher = ankirubi::application::NoteFetcher::new(client, settings());

    let result = fetcher.fetch_random_note().await;

    assert!(matches!(result, Err(FetchError::Transport(_))));
}
