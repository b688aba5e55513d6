//! The external page converter.
//!
//! The driver never inspects exit codes itself; it hands a
//! [`ConversionRequest`] to a [`PageConverter`] and gets back
//! `Ok(())` or a [`ConverterError`]. [`CommandConverter`] is the real
//! implementation that launches a child process. Tests substitute a fake.

use crate::chunk::Chunk;
use crate::config::ConverterCommand;
use crate::error::ConverterError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Everything the converter needs for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    /// Source document.
    pub input: PathBuf,
    /// File the converter must write.
    pub output: PathBuf,
    /// Page-count limit (`--max_pages`).
    pub max_pages: usize,
    /// 0-based start offset (`--start_page`); omitted for the first page.
    pub start_page: Option<usize>,
}

impl ConversionRequest {
    /// Request for `chunk` of `input`, written to `output`.
    pub fn for_chunk(chunk: &Chunk, input: &Path, output: PathBuf) -> Self {
        Self {
            input: input.to_path_buf(),
            output,
            max_pages: chunk.size(),
            start_page: chunk.converter_start_page(),
        }
    }

    /// Per-chunk arguments appended after the converter command prefix.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.input.clone().into_os_string(),
            self.output.clone().into_os_string(),
            "--max_pages".into(),
            self.max_pages.to_string().into(),
        ];
        if let Some(start) = self.start_page {
            args.push("--start_page".into());
            args.push(start.to_string().into());
        }
        args
    }
}

/// Something that can convert one page range of a document.
#[async_trait]
pub trait PageConverter: Send + Sync {
    /// Run the conversion to completion.
    ///
    /// Return [`ConverterError::Failed`] when the conversion ran and failed;
    /// the driver stops the run. Return [`ConverterError::Launch`] when it
    /// could not be attempted; the driver aborts with a fatal error.
    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConverterError>;
}

/// Runs the converter as a child process with inherited stdio and waits for it.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    command: ConverterCommand,
}

impl CommandConverter {
    pub fn new(command: ConverterCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &ConverterCommand {
        &self.command
    }

    fn build(&self, request: &ConversionRequest) -> Command {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.args).args(request.to_args());
        cmd
    }
}

#[async_trait]
impl PageConverter for CommandConverter {
    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConverterError> {
        let mut cmd = self.build(request);
        debug!("Launching converter: {:?}", cmd.as_std());

        let status = cmd.status().await.map_err(|e| ConverterError::Launch {
            program: self.command.program.clone(),
            source: e,
        })?;

        if status.success() {
            Ok(())
        } else {
            Err(ConverterError::Failed {
                command: self.command.to_string(),
                code: status.code(),
            })
        }
    }
}
