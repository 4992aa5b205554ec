use super::synthesis_client::{ClientError, SynthesisClient};
use super::voice_table_loader::{LoaderError, VoiceTableLoader};
use crate::domain::audio::WAV_HEADER_SIZE;
use crate::domain::voice::{StyleId, VoiceTable};
use crate::infrastructure::http::{classify_error, read_success_body};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// Engine speaker names mapped to the tags used in scripts.
const DEFAULT_SPEAKERS: &[(&str, &str)] = &[("四国めたん", "[めたん]"), ("ずんだもん", "[ずんだもん]")];

/// Engine style names mapped to the tags used in scripts.
const DEFAULT_STYLES: &[(&str, &str)] = &[
    ("ノーマル", "[ノーマル]"),
    ("あまあま", "[あまあま]"),
    ("ツンツン", "[ツンツン]"),
    ("セクシー", "[セクシー]"),
    ("ささやき", "[ささやき]"),
];

const DEFAULT_STYLE_TAG: &str = "[ノーマル]";

#[derive(Debug, Deserialize)]
pub struct EngineSpeaker {
    pub name: String,
    #[serde(default)]
    pub styles: Vec<EngineStyle>,
}

#[derive(Debug, Deserialize)]
pub struct EngineStyle {
    pub name: String,
    pub id: StyleId,
}

/// Which engine speakers and styles the tool exposes, and under which tags.
#[derive(Debug, Clone)]
pub struct SpeakerCatalog {
    speaker_tags: HashMap<String, String>,
    style_tags: HashMap<String, String>,
    default_style_tag: String,
}

impl Default for SpeakerCatalog {
    fn default() -> Self {
        Self::new(
            DEFAULT_SPEAKERS.iter().map(|(n, t)| (n.to_string(), t.to_string())).collect(),
            DEFAULT_STYLES.iter().map(|(n, t)| (n.to_string(), t.to_string())).collect(),
            DEFAULT_STYLE_TAG,
        )
    }
}

impl SpeakerCatalog {
    pub fn new(
        speaker_tags: HashMap<String, String>,
        style_tags: HashMap<String, String>,
        default_style_tag: impl Into<String>,
    ) -> Self {
        Self {
            speaker_tags,
            style_tags,
            default_style_tag: default_style_tag.into(),
        }
    }

    /// Filter the engine's speaker list down to a `VoiceTable`.
    ///
    /// Every catalog speaker must expose the default style.
    pub fn build_table(&self, speakers: &[EngineSpeaker]) -> Result<VoiceTable, LoaderError> {
        let mut style_id_by_tag = HashMap::new();
        let mut default_tag_by_speaker = HashMap::new();

        for speaker in speakers {
            let Some(speaker_tag) = self.speaker_tags.get(&speaker.name) else {
                continue;
            };

            for style in &speaker.styles {
                let Some(style_tag) = self.style_tags.get(&style.name) else {
                    tracing::debug!(
                        speaker = %speaker.name,
                        style = %style.name,
                        "Skipping unsupported style"
                    );
                    continue;
                };

                let tag = format!("{}{}", speaker_tag, style_tag);
                if *style_tag == self.default_style_tag {
                    default_tag_by_speaker.insert(speaker_tag.clone(), tag.clone());
                }
                style_id_by_tag.insert(tag, style.id);
            }
        }

        let missing: BTreeSet<&String> = self
            .speaker_tags
            .values()
            .filter(|tag| !default_tag_by_speaker.contains_key(*tag))
            .collect();
        if !missing.is_empty() {
            for tag in &missing {
                tracing::error!(
                    speaker = %tag,
                    required_style = %self.default_style_tag,
                    "Required speaker has no default style"
                );
            }
            return Err(LoaderError::MissingDefaults(
                missing.into_iter().cloned().collect(),
            ));
        }

        Ok(VoiceTable::new(style_id_by_tag, default_tag_by_speaker)?)
    }
}

/// HTTP client for a VOICEVOX-compatible engine.
pub struct VoicevoxClient {
    http: reqwest::Client,
    base_url: String,
    max_response_bytes: u64,
    catalog: SpeakerCatalog,
}

impl VoicevoxClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, max_response_bytes: u64) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_response_bytes,
            catalog: SpeakerCatalog::default(),
        }
    }

    pub fn with_catalog(mut self, catalog: SpeakerCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, ClientError> {
        let response = request.send().await.map_err(classify_error)?;
        read_success_body(response, self.max_response_bytes).await
    }
}

fn validate_query(body: &[u8]) -> Result<(), ClientError> {
    if body.is_empty() {
        return Err(ClientError::InvalidResponse("empty audio query".to_string()));
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ClientError::InvalidResponse(format!("audio query is not JSON: {}", e)))?;
    match value.as_object() {
        Some(query) if query.contains_key("accent_phrases") => Ok(()),
        _ => Err(ClientError::InvalidResponse(
            "audio query has no accent_phrases".to_string(),
        )),
    }
}

#[async_trait]
impl SynthesisClient for VoicevoxClient {
    async fn audio_query(&self, text: &str, style_id: StyleId) -> Result<Vec<u8>, ClientError> {
        let speaker = style_id.to_string();
        let request = self
            .http
            .post(self.endpoint("audio_query"))
            .query(&[("text", text), ("speaker", speaker.as_str())]);

        let body = self.send(request).await?;
        validate_query(&body)?;
        Ok(body)
    }

    async fn synthesize(&self, query: &[u8], style_id: StyleId) -> Result<Vec<u8>, ClientError> {
        let request = self
            .http
            .post(self.endpoint("synthesis"))
            .query(&[("speaker", style_id)])
            .header(CONTENT_TYPE, "application/json")
            .body(query.to_vec());

        let audio = self.send(request).await?;
        if audio.len() < WAV_HEADER_SIZE {
            return Err(ClientError::InvalidResponse(format!(
                "synthesis returned {} bytes, expected at least {}",
                audio.len(),
                WAV_HEADER_SIZE
            )));
        }
        Ok(audio)
    }
}

#[async_trait]
impl VoiceTableLoader for VoicevoxClient {
    async fn load(&self) -> Result<VoiceTable, LoaderError> {
        let body = self.send(self.http.get(self.endpoint("speakers"))).await?;
        let speakers: Vec<EngineSpeaker> =
            serde_json::from_slice(&body).map_err(|e| LoaderError::Decode(e.to_string()))?;

        let table = self.catalog.build_table(&speakers)?;
        tracing::info!(
            styles = table.len(),
            speakers = ?table.speakers(),
            "Voice table loaded"
        );
        Ok(table)
    }
}
