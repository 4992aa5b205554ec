use crate::error::AppError;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StyleResolutionError {
    #[error("no style id for tag {tag} and no default style for its speaker (segment {index})")]
    UnknownStyle { tag: String, index: usize },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VoiceTableError {
    #[error("default tag {default_tag} for speaker {speaker} has no style id")]
    DanglingDefault { speaker: String, default_tag: String },
}

impl From<VoiceTableError> for AppError {
    fn from(err: VoiceTableError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<StyleResolutionError> for AppError {
    fn from(err: StyleResolutionError) -> Self {
        AppError::Synthesis(err.to_string())
    }
}
