//! The chunk driver: walk the document one page range at a time.
//!
//! ```text
//!           ┌──────────────── y ─────────────────┐
//!           ▼                                    │
//!   RUNNING: convert chunk ── ok ──► ask operator ┤
//!           │                                    │
//!          fail                              anything else
//!           ▼                                    ▼
//!   STOPPED(ConverterFailed)           STOPPED(Declined)
//! ```
//!
//! Chunks are processed strictly in order, one converter process at a time.
//! There is no retry: the first failed chunk ends the run.

use crate::chunk::Chunk;
use crate::config::JobConfig;
use crate::converter::{ConversionRequest, PageConverter};
use crate::error::{ChunkError, ConverterError};
use crate::prompt::ContinuationPrompt;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A chunk the converter finished successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedChunk {
    pub chunk: Chunk,
    pub output: PathBuf,
    pub duration_ms: u64,
}

/// Why the run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The operator did not accept `next`.
    Declined { next: Chunk },
    /// The converter failed on `chunk`; `error` is its description.
    ConverterFailed { chunk: Chunk, error: String },
    /// The next chunk would start past the largest representable page.
    PageSpaceExhausted { next_start: usize },
}

/// Driver state. `Stopped` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Stopped(StopReason),
}

/// Outcome of a run that stopped normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Chunks converted, in page order.
    pub completed: Vec<CompletedChunk>,
    pub stop: StopReason,
}

impl RunSummary {
    /// True when the run ended because a converter invocation failed.
    pub fn failed(&self) -> bool {
        matches!(self.stop, StopReason::ConverterFailed { .. })
    }

    /// 0-based page a follow-up run should pass as `--start-page` to
    /// continue where this one stopped.
    pub fn resume_page(&self) -> Option<usize> {
        match &self.stop {
            StopReason::Declined { next } => Some(next.start),
            StopReason::ConverterFailed { chunk, .. } => Some(chunk.start),
            StopReason::PageSpaceExhausted { .. } => None,
        }
    }
}

/// Process `config`'s document chunk by chunk until the converter fails or
/// `prompt` declines.
///
/// # Errors
/// Returns `Err(ChunkError)` only for fatal errors:
/// - the output directory cannot be created
/// - the converter cannot be launched
/// - the prompt cannot read or write the terminal
///
/// A converter that runs and fails is not an error of the run; it is
/// reported as [`StopReason::ConverterFailed`].
pub async fn run<C, P>(
    config: &JobConfig,
    converter: &C,
    prompt: &mut P,
) -> Result<RunSummary, ChunkError>
where
    C: PageConverter + ?Sized,
    P: ContinuationPrompt + ?Sized,
{
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|e| ChunkError::OutputDir {
            path: config.output_dir.clone(),
            source: e,
        })?;

    info!(
        "Chunking {} into {}-page chunks from page {}",
        config.input.display(),
        config.chunk_size,
        config.first_page()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(config);
    }

    let mut completed = Vec::new();
    let mut plan = config.plan();
    let mut state = DriverState::Running;

    while state == DriverState::Running {
        let Some(chunk) = plan.next() else {
            // Only reachable after the previous chunk ended at the top of usize.
            let next_start = completed
                .last()
                .map(|c: &CompletedChunk| c.chunk.end)
                .unwrap_or_else(|| config.first_page());
            state = DriverState::Stopped(StopReason::PageSpaceExhausted { next_start });
            break;
        };

        match process_chunk(config, converter, &chunk).await? {
            Ok(done) => completed.push(done),
            Err(e) => {
                state = DriverState::Stopped(StopReason::ConverterFailed {
                    chunk,
                    error: e.to_string(),
                });
                break;
            }
        }

        let Some(next) = plan.peek().copied() else {
            continue;
        };
        if !prompt.confirm(&next).await? {
            debug!("Operator declined chunk {}", next);
            state = DriverState::Stopped(StopReason::Declined { next });
        }
    }

    let DriverState::Stopped(stop) = state else {
        return Err(ChunkError::Internal("driver left loop while running".into()));
    };
    let summary = RunSummary { completed, stop };

    info!("Run stopped after {} chunk(s)", summary.completed.len());
    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(&summary);
    }
    Ok(summary)
}

/// Run one chunk. The outer `Result` is fatal; the inner one is the
/// converter's verdict.
async fn process_chunk<C>(
    config: &JobConfig,
    converter: &C,
    chunk: &Chunk,
) -> Result<Result<CompletedChunk, ConverterError>, ChunkError>
where
    C: PageConverter + ?Sized,
{
    let output = config.output_path(chunk);
    let request = ConversionRequest::for_chunk(chunk, &config.input, output.clone());
    debug!(
        "Chunk {} (pages {}): max_pages={} start_page={:?}",
        chunk.index, chunk, request.max_pages, request.start_page
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_chunk_start(chunk);
    }
    let start = Instant::now();

    match converter.convert(&request).await {
        Ok(()) => {
            let elapsed = start.elapsed();
            info!("Processed pages {} to {}", chunk, output.display());
            if let Some(ref cb) = config.progress_callback {
                cb.on_chunk_complete(chunk, &output, elapsed);
            }
            Ok(Ok(CompletedChunk {
                chunk: *chunk,
                output,
                duration_ms: duration_ms(elapsed),
            }))
        }
        Err(e @ ConverterError::Failed { .. }) => {
            warn!("Error processing chunk {}: {}", chunk, e);
            if let Some(ref cb) = config.progress_callback {
                cb.on_chunk_error(chunk, &e);
            }
            Ok(Err(e))
        }
        Err(ConverterError::Launch { program, source }) => {
            Err(ChunkError::ConverterLaunch { program, source })
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Blocking variant of [`run`]; builds its own tokio runtime.
pub fn run_sync<C, P>(
    config: &JobConfig,
    converter: &C,
    prompt: &mut P,
) -> Result<RunSummary, ChunkError>
where
    C: PageConverter + ?Sized,
    P: ContinuationPrompt + ?Sized,
{
    tokio::runtime::Runtime::new()
        .map_err(|e| ChunkError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(run(config, converter, prompt))
}
