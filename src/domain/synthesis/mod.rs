pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::{SynthesisEngine, SynthesisReport};
pub use error::{EngineError, FailureCause, SegmentFailure, SegmentFailures, SegmentStage};
