use super::synthesis_client::ClientError;
use crate::domain::voice::{VoiceTable, VoiceTableError};
use crate::error::AppError;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("failed to fetch speaker catalog: {0}")]
    Client(#[from] ClientError),

    #[error("malformed speaker catalog: {0}")]
    Decode(String),

    #[error("speakers without a default style: {}", .0.join(", "))]
    MissingDefaults(Vec<String>),

    #[error(transparent)]
    Table(#[from] VoiceTableError),
}

impl From<LoaderError> for AppError {
    fn from(err: LoaderError) -> Self {
        AppError::Catalog(err.to_string())
    }
}

/// Source of the supported-voice table, queried once per run.
#[async_trait]
pub trait VoiceTableLoader: Send + Sync {
    async fn load(&self) -> Result<VoiceTable, LoaderError>;
}
