use crate::e2e::helpers;

use axum::http::StatusCode;
use helpers::fake_webhook::FakeWebhook;
use pretty_assertions::assert_eq;
use std::time::Duration;
use voicevox_narrator::error::AppError;
use voicevox_narrator::infrastructure::http::build_client;
use voicevox_narrator::infrastructure::webhook::WebhookPoster;

fn poster(url: &str) -> WebhookPoster {
    let http = build_client(Duration::from_secs(10)).expect("Failed to build HTTP client");
    WebhookPoster::new(http, url)
}

#[tokio::test]
async fn it_should_post_title_mode_timestamp_and_content() {
    let webhook = FakeWebhook::start(StatusCode::OK).await;
    let script = "[めたん][ノーマル] こんにちは。\n[ずんだもん][ノーマル] やあなのだ。";

    poster(&webhook.url)
        .post("episode-1", "dialogue", script)
        .await
        .unwrap();

    let received = webhook.received();
    assert_eq!(received.len(), 1);

    let body = &received[0];
    assert_eq!(body["title"], "episode-1");
    assert_eq!(body["mode"], "dialogue");
    assert_eq!(body["content"], script);

    let timestamp = body["timestamp"].as_str().expect("timestamp should be a string");
    assert!(
        chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(),
        "timestamp is not RFC 3339: {}",
        timestamp
    );
    assert_eq!(body.as_object().map(|fields| fields.len()), Some(4));
}

#[tokio::test]
async fn it_should_report_a_server_error_as_external_service_failure() {
    let webhook = FakeWebhook::start(StatusCode::INTERNAL_SERVER_ERROR).await;

    let result = poster(&webhook.url).post("episode-1", "solo", "[A][B] text").await;

    assert!(
        matches!(&result, Err(AppError::ExternalService(message)) if message.contains("500")),
        "unexpected result: {:?}",
        result
    );
    assert_eq!(webhook.received().len(), 1);
}

#[tokio::test]
async fn it_should_report_a_missing_route_as_external_service_failure() {
    let webhook = FakeWebhook::start(StatusCode::OK).await;
    let url = format!("{}/missing", webhook.url);

    let result = poster(&url).post("episode-1", "solo", "[A][B] text").await;

    assert!(matches!(result, Err(AppError::ExternalService(_))));
    assert!(webhook.received().is_empty());
}
