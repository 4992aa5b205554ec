use crate::domain::audio::WavError;
use crate::domain::voice::StyleResolutionError;
use crate::error::AppError;
use crate::infrastructure::repositories::{ClientError, OutputError};
use std::fmt;

/// Phase of the per-segment state machine at which a segment failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStage {
    Resolving,
    Querying,
    Synthesizing,
}

impl SegmentStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentStage::Resolving => "resolving",
            SegmentStage::Querying => "querying",
            SegmentStage::Synthesizing => "synthesizing",
        }
    }
}

impl fmt::Display for SegmentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FailureCause {
    #[error(transparent)]
    Resolution(#[from] StyleResolutionError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, thiserror::Error)]
#[error("segment {index} {tag}: {stage} failed after {attempts} attempt(s): {cause}")]
pub struct SegmentFailure {
    pub index: usize,
    pub tag: String,
    pub stage: SegmentStage,
    pub attempts: u32,
    #[source]
    pub cause: FailureCause,
}

/// Every failed segment of a run, ordered by segment index.
#[derive(Debug)]
pub struct SegmentFailures(Vec<SegmentFailure>);

impl SegmentFailures {
    pub fn new(mut failures: Vec<SegmentFailure>) -> Self {
        failures.sort_by_key(|failure| failure.index);
        Self(failures)
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.0.iter().map(|failure| failure.index).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentFailure> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for SegmentFailures {
    type Item = SegmentFailure;
    type IntoIter = std::vec::IntoIter<SegmentFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for SegmentFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} segment(s) failed", self.0.len())?;
        for failure in &self.0 {
            write!(f, "\n  - {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for SegmentFailures {}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("script contains no synthesizable segments")]
    NoSegments,

    #[error(transparent)]
    Segments(SegmentFailures),

    #[error("synthesis cancelled")]
    Cancelled,

    #[error("failed to assemble audio: {0}")]
    Audio(#[from] WavError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Cancelled => AppError::Cancelled,
            EngineError::NoSegments => AppError::InvalidInput(err.to_string()),
            EngineError::Segments(_) => AppError::Synthesis(err.to_string()),
            EngineError::Audio(e) => e.into(),
            EngineError::Output(e) => e.into(),
            EngineError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
