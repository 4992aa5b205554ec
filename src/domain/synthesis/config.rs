use std::time::Duration;

pub const DEFAULT_MAX_PARALLEL_SEGMENTS: usize = 15;
pub const DEFAULT_SEGMENT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(2);

/// Largest shift applied to the retry delay; keeps the multiplication in range.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Orchestration limits. Values arrive here already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_parallel_segments: usize,
    /// Upper bound for a single query or synthesis attempt.
    pub segment_timeout: Duration,
    /// Total attempts per segment, shared by both phases.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_parallel_segments: DEFAULT_MAX_PARALLEL_SEGMENTS,
            segment_timeout: DEFAULT_SEGMENT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

impl EngineConfig {
    /// Delay before the attempt following `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        self.retry_base_delay.saturating_mul(1 << exponent)
    }
}
