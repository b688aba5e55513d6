//! Progress-callback trait for per-chunk events.
//!
//! Inject an [`Arc<dyn ChunkProgressCallback>`] via
//! [`crate::config::JobConfigBuilder::progress_callback`] to be told when a
//! chunk starts, finishes, or fails. The library itself only emits `tracing`
//! events; anything user-facing (spinners, coloured status lines) belongs in
//! a callback.
//!
//! # Example
//!
//! ```rust
//! use pdfchunk::{Chunk, ChunkProgressCallback, JobConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//! use std::time::Duration;
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ChunkProgressCallback for CountingCallback {
//!     fn on_chunk_complete(&self, chunk: &Chunk, output: &Path, _elapsed: Duration) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("pages {} -> {}", chunk, output.display());
//!     }
//! }
//!
//! let config = JobConfig::builder("book.pdf", "out")
//!     .progress_callback(Arc::new(CountingCallback { completed: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::chunk::Chunk;
use crate::config::JobConfig;
use crate::driver::RunSummary;
use crate::error::ConverterError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Called by the driver as it walks through the chunks.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Chunks are processed one at a time, so calls never
/// overlap, but the trait is `Send + Sync` so a callback can be shared with
/// other tasks.
pub trait ChunkProgressCallback: Send + Sync {
    /// Called once, after the output directory exists and before the first chunk.
    fn on_run_start(&self, config: &JobConfig) {
        let _ = config;
    }

    /// Called just before the converter is launched for `chunk`.
    fn on_chunk_start(&self, chunk: &Chunk) {
        let _ = chunk;
    }

    /// Called when the converter exits successfully for `chunk`.
    ///
    /// # Arguments
    /// * `output`  — path the converter was asked to write
    /// * `elapsed` — wall-clock time of the converter process
    fn on_chunk_complete(&self, chunk: &Chunk, output: &Path, elapsed: Duration) {
        let _ = (chunk, output, elapsed);
    }

    /// Called when the converter fails for `chunk`. The run stops afterwards.
    fn on_chunk_error(&self, chunk: &Chunk, error: &ConverterError) {
        let _ = (chunk, error);
    }

    /// Called once when the run stops normally (decline or converter failure).
    fn on_run_complete(&self, summary: &RunSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ChunkProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::JobConfig`].
pub type ProgressCallback = Arc<dyn ChunkProgressCallback>;
