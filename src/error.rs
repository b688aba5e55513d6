//! Error types for the pdfchunk library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ChunkError`] — **Fatal**: the run cannot proceed at all (invalid
//!   configuration, output directory cannot be created, converter binary
//!   missing). Returned as `Err(ChunkError)` from [`crate::driver::run`].
//!
//! * [`ConverterError`] — the outcome of one failed converter invocation.
//!   A `Failed` outcome stops the loop but is not an `Err` of the run: it is
//!   recorded in [`crate::driver::StopReason::ConverterFailed`] so callers
//!   can see which chunks completed before it.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfchunk library.
#[derive(Debug, Error)]
pub enum ChunkError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The converter process could not be started at all.
    #[error("Failed to launch converter '{program}': {source}\nCheck the converter command is installed and on PATH.")]
    ConverterLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the operator's answer (or writing the question) failed.
    #[error("Failed to read continuation answer: {0}")]
    Prompt(#[source] std::io::Error),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a single converter invocation did not produce its chunk.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// The converter ran and exited unsuccessfully. `code` is `None` when the
    /// process was terminated by a signal.
    #[error("converter `{command}` {}", describe_exit(.code))]
    Failed { command: String, code: Option<i32> },

    /// The converter could not be spawned.
    #[error("could not launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exited with status {c}"),
        None => "was terminated by a signal".to_string(),
    }
}
