use crate::domain::script::{SegmenterConfig, DEFAULT_MAX_SEGMENT_CHARS};
use crate::domain::synthesis::config::{
    DEFAULT_MAX_PARALLEL_SEGMENTS, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BASE_DELAY,
    DEFAULT_SEGMENT_TIMEOUT,
};
use crate::domain::synthesis::EngineConfig;
use crate::error::{AppError, AppResult};
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_FALLBACK_TAG: &str = "[めたん][ノーマル]";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub voicevox_api_url: String,
    pub log_format: LogFormat,
    pub max_parallel_segments: usize,
    pub segment_timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub http_timeout: Duration,
    pub max_response_bytes: u64,
    pub max_segment_chars: usize,
    pub fallback_tag: Option<String>,
    pub post_api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let voicevox_api_url = lookup("VOICEVOX_API_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::Config("VOICEVOX_API_URL is not set".to_string()))?;

        let config = Config {
            voicevox_api_url,
            log_format: match lookup("LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            max_parallel_segments: parse_or(
                &lookup,
                "VOICEVOX_MAX_PARALLEL",
                DEFAULT_MAX_PARALLEL_SEGMENTS,
            )?,
            segment_timeout: Duration::from_secs(parse_or(
                &lookup,
                "VOICEVOX_SEGMENT_TIMEOUT_SECS",
                DEFAULT_SEGMENT_TIMEOUT.as_secs(),
            )?),
            max_retries: parse_or(&lookup, "VOICEVOX_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_base_delay: Duration::from_millis(parse_or(
                &lookup,
                "VOICEVOX_RETRY_DELAY_MS",
                DEFAULT_RETRY_BASE_DELAY.as_millis() as u64,
            )?),
            http_timeout: Duration::from_secs(parse_or(
                &lookup,
                "VOICEVOX_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            max_response_bytes: parse_or(
                &lookup,
                "VOICEVOX_MAX_RESPONSE_BYTES",
                DEFAULT_MAX_RESPONSE_BYTES,
            )?,
            max_segment_chars: parse_or(
                &lookup,
                "SCRIPT_MAX_SEGMENT_CHARS",
                DEFAULT_MAX_SEGMENT_CHARS,
            )?,
            // Set but empty disables the fallback.
            fallback_tag: match lookup("SCRIPT_FALLBACK_TAG") {
                Some(tag) if tag.trim().is_empty() => None,
                Some(tag) => Some(tag.trim().to_string()),
                None => Some(DEFAULT_FALLBACK_TAG.to_string()),
            },
            post_api_url: lookup("POST_API_URL").filter(|url| !url.trim().is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.max_parallel_segments == 0 {
            return Err(AppError::Config(
                "VOICEVOX_MAX_PARALLEL must be at least 1".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(AppError::Config(
                "VOICEVOX_MAX_RETRIES must be at least 1".to_string(),
            ));
        }
        if self.max_segment_chars == 0 {
            return Err(AppError::Config(
                "SCRIPT_MAX_SEGMENT_CHARS must be at least 1".to_string(),
            ));
        }
        if self.segment_timeout.is_zero() || self.http_timeout.is_zero() {
            return Err(AppError::Config("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_parallel_segments: self.max_parallel_segments,
            segment_timeout: self.segment_timeout,
            max_retries: self.max_retries,
            retry_base_delay: self.retry_base_delay,
        }
    }

    pub fn segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            max_chars: self.max_segment_chars,
            fallback_tag: self.fallback_tag.clone(),
            ..SegmenterConfig::default()
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("invalid {}={:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}
