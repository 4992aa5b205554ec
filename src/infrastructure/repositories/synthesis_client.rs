use crate::error::AppError;
use async_trait::async_trait;

/// Errors raised by a TTS engine call.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("engine responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("response body exceeds {limit} bytes")]
    ResponseTooLarge { limit: u64 },
}

impl ClientError {
    /// Transport failures, timeouts, 5xx and 429 may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) | ClientError::Timeout => true,
            ClientError::Status { status, .. } => *status >= 500 || *status == 429,
            ClientError::InvalidResponse(_) | ClientError::ResponseTooLarge { .. } => false,
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        AppError::ExternalService(err.to_string())
    }
}

/// Two-phase access to a TTS engine: build a synthesis query, then render it to audio.
///
/// Cancellation is driven by the caller dropping the returned future.
#[async_trait]
pub trait SynthesisClient: Send + Sync {
    /// Build the engine-specific synthesis query for `text` spoken with `style_id`.
    async fn audio_query(&self, text: &str, style_id: u32) -> Result<Vec<u8>, ClientError>;

    /// Render a query to a WAV buffer of at least the fixed header size.
    async fn synthesize(&self, query: &[u8], style_id: u32) -> Result<Vec<u8>, ClientError>;
}
