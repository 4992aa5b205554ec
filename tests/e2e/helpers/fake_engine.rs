use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Text containing this marker makes `/audio_query` answer with an empty object.
pub const EMPTY_QUERY_MARKER: &str = "EMPTYQUERY";

/// Scripted behaviour of the fake engine.
#[derive(Debug, Clone)]
pub struct FakeEngineConfig {
    pub speakers: Value,
    /// Number of initial `/audio_query` calls answered with 503.
    pub transient_failures: usize,
    /// Text fragment that makes `/audio_query` answer with the given status.
    pub reject_text: Option<(String, u16)>,
}

impl Default for FakeEngineConfig {
    fn default() -> Self {
        Self {
            speakers: default_speakers(),
            transient_failures: 0,
            reject_text: None,
        }
    }
}

pub fn default_speakers() -> Value {
    json!([
        {
            "name": "四国めたん",
            "speaker_uuid": "7ffcb7ce-00ec-4bdc-82cd-45a8889e43ff",
            "styles": [
                { "name": "ノーマル", "id": 2 },
                { "name": "あまあま", "id": 0 },
                { "name": "ツンツン", "id": 6 },
                { "name": "セクシー", "id": 4 },
                { "name": "ささやき", "id": 36 },
                { "name": "ヒソヒソ", "id": 37 }
            ]
        },
        {
            "name": "ずんだもん",
            "speaker_uuid": "388f246b-8c41-4ac1-8e2d-5d79f3ff56d9",
            "styles": [
                { "name": "ノーマル", "id": 3 },
                { "name": "あまあま", "id": 1 },
                { "name": "ツンツン", "id": 7 },
                { "name": "ささやき", "id": 22 }
            ]
        },
        {
            "name": "春日部つむぎ",
            "speaker_uuid": "35b2c544-660e-401e-b503-0e14c635303a",
            "styles": [{ "name": "ノーマル", "id": 8 }]
        }
    ])
}

#[derive(Debug, Default)]
pub struct Calls {
    pub audio_query: AtomicUsize,
    pub synthesis: AtomicUsize,
    /// `(speaker, text)` of every accepted query, in arrival order.
    pub queried: Mutex<Vec<(u32, String)>>,
}

struct EngineState {
    config: FakeEngineConfig,
    calls: Arc<Calls>,
}

pub struct FakeEngine {
    pub base_url: String,
    pub calls: Arc<Calls>,
}

impl FakeEngine {
    pub async fn start(config: FakeEngineConfig) -> Self {
        let calls = Arc::new(Calls::default());
        let state = Arc::new(EngineState {
            config,
            calls: calls.clone(),
        });

        let app = Router::new()
            .route("/speakers", get(speakers))
            .route("/audio_query", post(audio_query))
            .route("/synthesis", post(synthesis))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake engine");
        let addr = listener.local_addr().expect("Failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            calls,
        }
    }
}

/// Payload the fake engine renders for one query.
pub fn expected_payload(speaker: u32, text: &str) -> Vec<u8> {
    format!("{}:{}|", speaker, text).into_bytes()
}

/// 16-bit mono 24 kHz WAV around `payload`.
pub fn wav(payload: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(44 + payload.len());
    buffer.extend_from_slice(b"RIFF");
    buffer.extend_from_slice(&(36 + payload.len() as u32).to_le_bytes());
    buffer.extend_from_slice(b"WAVEfmt ");
    buffer.extend_from_slice(&16u32.to_le_bytes());
    buffer.extend_from_slice(&1u16.to_le_bytes());
    buffer.extend_from_slice(&1u16.to_le_bytes());
    buffer.extend_from_slice(&24_000u32.to_le_bytes());
    buffer.extend_from_slice(&48_000u32.to_le_bytes());
    buffer.extend_from_slice(&2u16.to_le_bytes());
    buffer.extend_from_slice(&16u16.to_le_bytes());
    buffer.extend_from_slice(b"data");
    buffer.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buffer.extend_from_slice(payload);
    buffer
}

#[derive(Debug, Deserialize)]
struct QueryParams {
    text: String,
    speaker: u32,
}

#[derive(Debug, Deserialize)]
struct SpeakerParams {
    speaker: u32,
}

async fn speakers(State(state): State<Arc<EngineState>>) -> Json<Value> {
    Json(state.config.speakers.clone())
}

async fn audio_query(
    State(state): State<Arc<EngineState>>,
    Query(params): Query<QueryParams>,
) -> Response {
    let call = state.calls.audio_query.fetch_add(1, Ordering::SeqCst);
    if call < state.config.transient_failures {
        return (StatusCode::SERVICE_UNAVAILABLE, "engine busy").into_response();
    }

    if let Some((fragment, status)) = &state.config.reject_text {
        if params.text.contains(fragment.as_str()) {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST);
            return (status, "rejected text").into_response();
        }
    }

    if params.text.contains(EMPTY_QUERY_MARKER) {
        return Json(json!({})).into_response();
    }

    state
        .calls
        .queried
        .lock()
        .push((params.speaker, params.text.clone()));

    Json(json!({
        "accent_phrases": [],
        "speedScale": 1.0,
        "kana": params.text,
    }))
    .into_response()
}

async fn synthesis(
    State(state): State<Arc<EngineState>>,
    Query(params): Query<SpeakerParams>,
    body: Bytes,
) -> Response {
    state.calls.synthesis.fetch_add(1, Ordering::SeqCst);

    let query: Value = match serde_json::from_slice(&body) {
        Ok(query) => query,
        Err(_) => return (StatusCode::UNPROCESSABLE_ENTITY, "invalid query").into_response(),
    };
    let text = query.get("kana").and_then(Value::as_str).unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "audio/wav")],
        wav(&expected_payload(params.speaker, text)),
    )
        .into_response()
}
