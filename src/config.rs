//! Configuration types for a chunked conversion run.
//!
//! Everything the driver needs lives in [`JobConfig`], built via its
//! [`JobConfigBuilder`]. The config is immutable for the duration of a run.

use crate::chunk::{self, ChunkPlan};
use crate::error::ChunkError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default number of pages per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 30;

/// Default output file extension.
pub const DEFAULT_EXTENSION: &str = "md";

/// Configuration for one chunked conversion run.
///
/// # Example
/// ```rust
/// use pdfchunk::JobConfig;
///
/// let config = JobConfig::builder("report.pdf", "out")
///     .chunk_size(20)
///     .start_page(40)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_name(), "report");
/// ```
#[derive(Clone)]
pub struct JobConfig {
    /// Document handed to the converter on every invocation.
    pub input: PathBuf,

    /// Directory receiving one output file per chunk. Created if absent.
    pub output_dir: PathBuf,

    /// Pages per chunk, also passed to the converter as `--max_pages`. Default: 30.
    pub chunk_size: usize,

    /// 0-based page the first chunk starts at. `None` means page 0.
    pub start_page: Option<usize>,

    /// Extension of the output files, without the dot. Default: `md`.
    pub extension: String,

    /// Command prefix used to reach the converter.
    pub converter: ConverterCommand,

    /// Optional observer for per-chunk events.
    pub progress_callback: Option<ProgressCallback>,

    base_name: String,
}

impl fmt::Debug for JobConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobConfig")
            .field("input", &self.input)
            .field("output_dir", &self.output_dir)
            .field("chunk_size", &self.chunk_size)
            .field("start_page", &self.start_page)
            .field("extension", &self.extension)
            .field("converter", &self.converter)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ChunkProgressCallback>"),
            )
            .finish()
    }
}

impl JobConfig {
    /// Create a new builder for `JobConfig`.
    pub fn builder(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> JobConfigBuilder {
        JobConfigBuilder {
            input: input.into(),
            output_dir: output_dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            start_page: None,
            extension: DEFAULT_EXTENSION.to_string(),
            converter: ConverterCommand::default(),
            progress_callback: None,
        }
    }

    /// Input file name without its final extension, used in output names.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// 0-based page of the first chunk.
    pub fn first_page(&self) -> usize {
        self.start_page.unwrap_or(0)
    }

    /// Lazy chunk sequence for this run.
    pub fn plan(&self) -> ChunkPlan {
        ChunkPlan::new(self.first_page(), self.chunk_size)
    }

    /// Output path for a chunk of this run.
    pub fn output_path(&self, chunk: &chunk::Chunk) -> PathBuf {
        chunk.output_path(&self.output_dir, &self.base_name, &self.extension)
    }
}

/// Builder for [`JobConfig`].
pub struct JobConfigBuilder {
    input: PathBuf,
    output_dir: PathBuf,
    chunk_size: usize,
    start_page: Option<usize>,
    extension: String,
    converter: ConverterCommand,
    progress_callback: Option<ProgressCallback>,
}

impl JobConfigBuilder {
    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n;
        self
    }

    pub fn start_page(mut self, page: usize) -> Self {
        self.start_page = Some(page);
        self
    }

    /// Set or clear the start page; convenient when mapping an optional flag.
    pub fn maybe_start_page(mut self, page: Option<usize>) -> Self {
        self.start_page = page;
        self
    }

    /// Accepts `md` or `.md`.
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.extension = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn converter(mut self, command: ConverterCommand) -> Self {
        self.converter = command;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<JobConfig, ChunkError> {
        if self.chunk_size == 0 {
            return Err(ChunkError::InvalidConfig("Chunk size must be ≥ 1".into()));
        }
        if self.extension.is_empty() {
            return Err(ChunkError::InvalidConfig(
                "Output extension must not be empty".into(),
            ));
        }
        if self.converter.program.trim().is_empty() {
            return Err(ChunkError::InvalidConfig(
                "Converter program must not be empty".into(),
            ));
        }
        let base_name = chunk::base_name(&self.input).ok_or_else(|| {
            ChunkError::InvalidConfig(format!(
                "Input '{}' has no UTF-8 file name to derive output names from",
                self.input.display()
            ))
        })?;
        if ChunkPlan::new(self.start_page.unwrap_or(0), self.chunk_size)
            .peek()
            .is_none()
        {
            return Err(ChunkError::InvalidConfig(format!(
                "Start page {} is too large for chunks of {} pages",
                self.start_page.unwrap_or(0),
                self.chunk_size
            )));
        }

        Ok(JobConfig {
            input: self.input,
            output_dir: self.output_dir,
            chunk_size: self.chunk_size,
            start_page: self.start_page,
            extension: self.extension,
            converter: self.converter,
            progress_callback: self.progress_callback,
            base_name,
        })
    }
}

/// The command prefix that reaches the converter.
///
/// Per-chunk arguments are appended after `args`:
/// `<input> <output> --max_pages <n> [--start_page <n>]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ConverterCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from an argv-style list; `None` when the list is empty.
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut it = argv.into_iter().map(Into::into);
        let program = it.next()?;
        Some(Self {
            program,
            args: it.collect(),
        })
    }
}

impl Default for ConverterCommand {
    /// `poetry run python convert_single.py`
    fn default() -> Self {
        Self::new("poetry", ["run", "python", "convert_single.py"])
    }
}

impl fmt::Display for ConverterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
