use crate::e2e::helpers;

use helpers::fake_engine::{FakeEngine, FakeEngineConfig};
use helpers::TestContext;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;
use voicevox_narrator::infrastructure::repositories::{LoaderError, VoiceTableLoader};

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_load_supported_speakers_and_styles(ctx: &TestContext) {
    let table = ctx.client.load().await.unwrap();

    assert_eq!(table.style_id("[めたん][ノーマル]"), Some(2));
    assert_eq!(table.style_id("[めたん][ささやき]"), Some(36));
    assert_eq!(table.style_id("[ずんだもん][ツンツン]"), Some(7));
    assert_eq!(table.default_tag("[めたん]"), Some("[めたん][ノーマル]"));
    assert_eq!(table.default_tag("[ずんだもん]"), Some("[ずんだもん][ノーマル]"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_skip_unsupported_speakers_and_styles(ctx: &TestContext) {
    let table = ctx.client.load().await.unwrap();

    assert_eq!(table.style_id("[めたん][ヒソヒソ]"), None);
    assert_eq!(table.default_tag("[つむぎ]"), None);
    assert_eq!(table.len(), 9);
}

#[tokio::test]
async fn it_should_fail_when_a_required_speaker_has_no_default_style() {
    let ctx = TestContext::start(FakeEngineConfig {
        speakers: json!([
            { "name": "四国めたん", "styles": [{ "name": "ノーマル", "id": 2 }] },
            { "name": "ずんだもん", "styles": [{ "name": "あまあま", "id": 1 }] }
        ]),
        ..FakeEngineConfig::default()
    })
    .await;

    let err = ctx.client.load().await.unwrap_err();

    match err {
        LoaderError::MissingDefaults(missing) => {
            assert_eq!(missing, vec!["[ずんだもん]".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn it_should_reject_a_malformed_catalog() {
    let ctx = TestContext::start(FakeEngineConfig {
        speakers: json!({ "unexpected": true }),
        ..FakeEngineConfig::default()
    })
    .await;

    assert!(matches!(
        ctx.client.load().await,
        Err(LoaderError::Decode(_))
    ));
}

#[tokio::test]
async fn it_should_surface_engine_http_errors() {
    let engine = FakeEngine::start(FakeEngineConfig::default()).await;
    let client = helpers::voicevox_client(&format!("{}/missing-prefix", engine.base_url), 1024);

    assert!(matches!(client.load().await, Err(LoaderError::Client(_))));
}
