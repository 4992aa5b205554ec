/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Speaker catalog error: {0}")]
    Catalog(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Audio format error: {0}")]
    AudioFormat(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
