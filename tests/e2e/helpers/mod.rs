use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use uuid::Uuid;
use voicevox_narrator::domain::script::{ScriptSegmenter, SegmenterConfig};
use voicevox_narrator::domain::synthesis::{EngineConfig, SynthesisEngine};
use voicevox_narrator::infrastructure::http::build_client;
use voicevox_narrator::infrastructure::repositories::{LocalFileWriter, VoicevoxClient};

pub mod fake_engine;

use fake_engine::{FakeEngine, FakeEngineConfig};

pub const MAX_RESPONSE_BYTES: u64 = 1024 * 1024;

pub struct TestContext {
    pub engine: FakeEngine,
    pub client: Arc<VoicevoxClient>,
    pub output_dir: PathBuf,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async { Self::start(FakeEngineConfig::default()).await }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            let _ = tokio::fs::remove_dir_all(&self.output_dir).await;
        }
    }
}

impl TestContext {
    pub async fn start(config: FakeEngineConfig) -> Self {
        let engine = FakeEngine::start(config).await;
        let client = Arc::new(voicevox_client(&engine.base_url, MAX_RESPONSE_BYTES));
        let output_dir = std::env::temp_dir().join(format!("voicevox-narrator-e2e-{}", Uuid::new_v4()));

        Self {
            engine,
            client,
            output_dir,
        }
    }

    pub fn output_path(&self, name: &str) -> String {
        self.output_dir.join(name).to_string_lossy().into_owned()
    }

    pub fn synthesis_engine(&self) -> SynthesisEngine {
        let segmenter = ScriptSegmenter::new(SegmenterConfig {
            fallback_tag: Some("[めたん][ノーマル]".to_string()),
            ..SegmenterConfig::default()
        })
        .expect("Failed to build segmenter");

        SynthesisEngine::new(
            self.client.clone(),
            Arc::new(LocalFileWriter::new()),
            segmenter,
            test_engine_config(),
        )
    }
}

pub fn voicevox_client(base_url: &str, max_response_bytes: u64) -> VoicevoxClient {
    let http = build_client(Duration::from_secs(10)).expect("Failed to build HTTP client");
    VoicevoxClient::new(http, base_url, max_response_bytes)
}

pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        max_parallel_segments: 3,
        segment_timeout: Duration::from_secs(10),
        max_retries: 3,
        retry_base_delay: Duration::from_millis(5),
    }
}
