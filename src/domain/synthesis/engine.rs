use super::config::EngineConfig;
use super::error::{EngineError, SegmentFailure, SegmentFailures, SegmentStage};
use crate::domain::audio::{combine, WAV_HEADER_SIZE};
use crate::domain::script::{ScriptSegmenter, Segment};
use crate::domain::voice::{StyleId, StyleResolver, VoiceTable};
use crate::infrastructure::repositories::{ClientError, OutputWriter, SynthesisClient};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Summary of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisReport {
    pub segments: usize,
    pub payload_bytes: usize,
    pub output_bytes: usize,
}

/// Turns a tagged script into one combined WAV file.
///
/// Each run segments the script, resolves every tag up front, then synthesizes
/// segments concurrently (bounded by `max_parallel_segments`) and reassembles the
/// audio in script order. Any segment failure fails the whole run.
pub struct SynthesisEngine {
    client: Arc<dyn SynthesisClient>,
    writer: Arc<dyn OutputWriter>,
    segmenter: ScriptSegmenter,
    config: EngineConfig,
}

impl SynthesisEngine {
    pub fn new(
        client: Arc<dyn SynthesisClient>,
        writer: Arc<dyn OutputWriter>,
        segmenter: ScriptSegmenter,
        config: EngineConfig,
    ) -> Self {
        Self {
            client,
            writer,
            segmenter,
            config,
        }
    }

    /// Synthesize `script` and return the combined buffer without writing it.
    pub async fn render(
        &self,
        script: &str,
        table: Arc<VoiceTable>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, EngineError> {
        self.render_segments(script, table, cancel)
            .instrument(run_span())
            .await
            .map(|(audio, _)| audio)
    }

    /// Synthesize `script` and hand the combined buffer to the output writer once.
    ///
    /// Nothing is written unless every segment succeeded.
    pub async fn execute(
        &self,
        script: &str,
        destination: &str,
        table: Arc<VoiceTable>,
        cancel: &CancellationToken,
    ) -> Result<SynthesisReport, EngineError> {
        self.render_and_write(script, destination, table, cancel)
            .instrument(run_span())
            .await
    }

    async fn render_and_write(
        &self,
        script: &str,
        destination: &str,
        table: Arc<VoiceTable>,
        cancel: &CancellationToken,
    ) -> Result<SynthesisReport, EngineError> {
        let (audio, segments) = self.render_segments(script, table, cancel).await?;
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        self.writer.write(destination, &audio).await?;

        let report = SynthesisReport {
            segments,
            payload_bytes: audio.len().saturating_sub(WAV_HEADER_SIZE),
            output_bytes: audio.len(),
        };
        tracing::info!(
            destination = %destination,
            segments = report.segments,
            output_bytes = report.output_bytes,
            "Synthesis run completed"
        );
        Ok(report)
    }

    async fn render_segments(
        &self,
        script: &str,
        table: Arc<VoiceTable>,
        cancel: &CancellationToken,
    ) -> Result<(Vec<u8>, usize), EngineError> {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        let segments = self.segmenter.segment(script);
        if segments.is_empty() {
            tracing::error!(script_len = script.len(), "Script produced no segments");
            return Err(EngineError::NoSegments);
        }
        let total = segments.len();

        tracing::info!(
            segments = total,
            max_parallel = self.config.max_parallel_segments,
            max_retries = self.config.max_retries,
            "Synthesis run started"
        );

        // Resolve everything before the first network call so a broken table fails fast.
        let resolver = StyleResolver::new(table);
        let mut failures = Vec::new();
        let mut jobs = Vec::with_capacity(total);
        for (index, segment) in segments.into_iter().enumerate() {
            match resolver.resolve(segment.tag(), index) {
                Ok(style_id) => jobs.push((index, segment, style_id)),
                Err(err) => {
                    tracing::error!(
                        segment_index = index,
                        tag = %segment.tag(),
                        stage = %SegmentStage::Resolving,
                        error = %err,
                        "Style resolution failed"
                    );
                    failures.push(SegmentFailure {
                        index,
                        tag: segment.tag().to_string(),
                        stage: SegmentStage::Resolving,
                        attempts: 1,
                        cause: err.into(),
                    });
                }
            }
        }

        if jobs.is_empty() {
            tracing::error!(segments = total, "No segment tag could be resolved");
            return Err(EngineError::Segments(SegmentFailures::new(failures)));
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_segments.max(1)));
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|(index, segment, style_id)| {
                let job = SegmentJob {
                    index,
                    segment,
                    style_id,
                    client: Arc::clone(&self.client),
                    config: self.config.clone(),
                    cancel: cancel.clone(),
                };
                let semaphore = Arc::clone(&semaphore);
                let handle = tokio::spawn(job.admit_and_run(semaphore).in_current_span());
                (index, handle)
            })
            .collect();

        let mut buffers: Vec<Option<Vec<u8>>> = vec![None; total];
        let mut cancelled = false;
        let mut aborted = None;
        for (index, handle) in handles {
            match handle.await {
                Ok(Ok(audio)) => buffers[index] = Some(audio),
                Ok(Err(SegmentError::Cancelled)) => cancelled = true,
                Ok(Err(SegmentError::Failed(failure))) => failures.push(failure),
                Err(err) => {
                    tracing::error!(segment_index = index, error = %err, "Segment worker aborted");
                    aborted.get_or_insert_with(|| format!("segment {} worker aborted: {}", index, err));
                }
            }
        }

        if cancelled || cancel.is_cancelled() {
            tracing::warn!("Synthesis run cancelled");
            return Err(EngineError::Cancelled);
        }
        if let Some(message) = aborted {
            return Err(EngineError::Internal(message));
        }
        if !failures.is_empty() {
            let failures = SegmentFailures::new(failures);
            tracing::error!(
                failed = failures.len(),
                failed_indices = ?failures.failed_indices(),
                "Synthesis run failed"
            );
            return Err(EngineError::Segments(failures));
        }

        let buffers: Vec<Vec<u8>> = buffers
            .into_iter()
            .collect::<Option<_>>()
            .ok_or_else(|| EngineError::Internal("segment audio missing".to_string()))?;
        let audio = combine(&buffers)?;

        Ok((audio, total))
    }
}

fn run_span() -> tracing::Span {
    tracing::info_span!("synthesis_run", run_id = %Uuid::new_v4())
}

enum SegmentError {
    Cancelled,
    Failed(SegmentFailure),
}

/// Per-segment state machine: Querying, then Synthesizing, each retried on
/// transient errors within one shared attempt budget.
struct SegmentJob {
    index: usize,
    segment: Segment,
    style_id: StyleId,
    client: Arc<dyn SynthesisClient>,
    config: EngineConfig,
    cancel: CancellationToken,
}

impl SegmentJob {
    async fn admit_and_run(self, semaphore: Arc<Semaphore>) -> Result<Vec<u8>, SegmentError> {
        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(SegmentError::Cancelled),
            permit = semaphore.acquire_owned() => permit.map_err(|_| SegmentError::Cancelled)?,
        };

        self.run().await
    }

    async fn run(&self) -> Result<Vec<u8>, SegmentError> {
        tracing::debug!(
            segment_index = self.index,
            tag = %self.segment.tag(),
            style_id = self.style_id,
            chars = self.segment.char_len(),
            preview = %self.segment.preview(),
            "Segment started"
        );

        let mut attempt = 0;
        let query = self
            .run_phase(SegmentStage::Querying, &mut attempt, || {
                self.client.audio_query(self.segment.text(), self.style_id)
            })
            .await?;
        let audio = self
            .run_phase(SegmentStage::Synthesizing, &mut attempt, || {
                self.client.synthesize(&query, self.style_id)
            })
            .await?;

        tracing::debug!(
            segment_index = self.index,
            attempts = attempt,
            audio_bytes = audio.len(),
            "Segment synthesized"
        );
        Ok(audio)
    }

    async fn run_phase<F, Fut>(
        &self,
        stage: SegmentStage,
        attempt: &mut u32,
        call: F,
    ) -> Result<Vec<u8>, SegmentError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, ClientError>>,
    {
        loop {
            *attempt += 1;

            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(SegmentError::Cancelled),
                outcome = tokio::time::timeout(self.config.segment_timeout, call()) => outcome,
            };
            let err = match outcome {
                Ok(Ok(bytes)) => return Ok(bytes),
                Ok(Err(err)) => err,
                Err(_) => ClientError::Timeout,
            };

            if !err.is_retryable() || *attempt >= self.config.max_retries {
                tracing::error!(
                    segment_index = self.index,
                    tag = %self.segment.tag(),
                    stage = %stage,
                    attempt = *attempt,
                    error = %err,
                    "Segment failed"
                );
                return Err(SegmentError::Failed(SegmentFailure {
                    index: self.index,
                    tag: self.segment.tag().to_string(),
                    stage,
                    attempts: *attempt,
                    cause: err.into(),
                }));
            }

            let delay = self.config.backoff(*attempt);
            tracing::warn!(
                segment_index = self.index,
                tag = %self.segment.tag(),
                stage = %stage,
                attempt = *attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying segment"
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(SegmentError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
