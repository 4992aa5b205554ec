use crate::error::AppError;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WavError {
    #[error("no WAV buffers to combine")]
    NoInput,
    #[error("WAV buffer #{index} is {len} bytes, shorter than the {required}-byte header")]
    HeaderTooShort {
        index: usize,
        len: usize,
        required: usize,
    },
    #[error("WAV buffer #{index} declares {declared} payload bytes but only {actual} are present")]
    PayloadSizeMismatch {
        index: usize,
        declared: u32,
        actual: usize,
    },
    #[error("every WAV buffer has an empty payload")]
    EmptyPayload,
    #[error("combined payload of {0} bytes does not fit a WAV size field")]
    PayloadTooLarge(u64),
}

impl From<WavError> for AppError {
    fn from(err: WavError) -> Self {
        AppError::AudioFormat(err.to_string())
    }
}
