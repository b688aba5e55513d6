//! # pdfchunk
//!
//! Drive an external document converter over a large PDF in fixed-size
//! page-range chunks, asking the operator before each new chunk.
//!
//! ## Why chunk?
//!
//! Single-shot PDF-to-Markdown converters hold a whole document in memory and
//! lose everything when they crash on page 412. Running them over 30-page
//! windows bounds memory, produces usable output early, and lets an operator
//! stop and pick the job up later with `--start-page`.
//!
//! ## Run Overview
//!
//! ```text
//! report.pdf
//!  │
//!  ├─ chunk 1  pages 1-30   → converter → out/report_P_1-30.md
//!  ├─ prompt   "Process next chunk (pages 31-60)? [y/n]"
//!  ├─ chunk 2  pages 31-60  → converter (--start_page 29) → out/report_P_31-60.md
//!  └─ …        until the operator says no or the converter fails
//! ```
//!
//! The page range handed to the converter for every chunk after the first
//! starts one page early (`--start_page {start - 1}`), so each output also
//! covers the last page of the chunk before it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfchunk::{run, CommandConverter, JobConfig, LinePrompt};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = JobConfig::builder("report.pdf", "out").chunk_size(30).build()?;
//!     let converter = CommandConverter::new(config.converter.clone());
//!     let summary = run(&config, &converter, &mut LinePrompt::stdio()).await?;
//!     eprintln!("{} chunks converted", summary.completed.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfchunk` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chunk;
pub mod config;
pub mod converter;
pub mod driver;
pub mod error;
pub mod progress;
pub mod prompt;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chunk::{Chunk, ChunkPlan};
pub use config::{ConverterCommand, JobConfig, JobConfigBuilder};
pub use converter::{CommandConverter, ConversionRequest, PageConverter};
pub use driver::{run, run_sync, CompletedChunk, DriverState, RunSummary, StopReason};
pub use error::{ChunkError, ConverterError};
pub use progress::{ChunkProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompt::{ContinuationPrompt, LinePrompt, ScriptedPrompt};
