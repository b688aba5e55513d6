//! CLI binary for pdfchunk.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `JobConfig`, wires the terminal prompt, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::HumanDuration;
use pdfchunk::{
    run, Chunk, ChunkProgressCallback, CommandConverter, ContinuationPrompt, ConverterCommand,
    ConverterError, JobConfig, LinePrompt, ProgressCallback, RunSummary, StopReason,
};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Exit code used with `--strict` when the converter fails.
const EXIT_CONVERTER_FAILED: u8 = 2;

// ── CLI progress callback ────────────────────────────────────────────────────

/// Terminal progress callback: one status line per chunk on stderr.
///
/// No spinner is drawn while a chunk runs because the converter inherits the
/// terminal and prints its own progress.
///
/// The callback owns the failure line. The driver logs the same failure at
/// WARN, which the CLI filter hides unless `--verbose` is given; in that case
/// the log line is the only report.
struct CliProgressCallback {
    /// Print the failure line only.
    quiet: bool,
    /// Leave the failure line to the WARN log.
    verbose: bool,
}

impl ChunkProgressCallback for CliProgressCallback {
    fn on_run_start(&self, config: &JobConfig) {
        if self.quiet {
            return;
        }
        eprintln!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Chunking {} into {}-page chunks → {}",
                config.input.display(),
                config.chunk_size,
                config.output_dir.display()
            ))
        );
    }

    fn on_chunk_start(&self, chunk: &Chunk) {
        if self.quiet {
            return;
        }
        eprintln!(
            "{} Chunk {:>3}  pages {}",
            cyan("▸"),
            chunk.index,
            bold(&chunk.to_string())
        );
    }

    fn on_chunk_complete(&self, chunk: &Chunk, output: &Path, elapsed: Duration) {
        if self.quiet {
            return;
        }
        eprintln!(
            "  {} Processed pages {} to {}  {}",
            green("✓"),
            chunk,
            output.display(),
            dim(&HumanDuration(elapsed).to_string()),
        );
    }

    fn on_chunk_error(&self, chunk: &Chunk, error: &ConverterError) {
        if self.verbose {
            return;
        }
        eprintln!(
            "  {} {}",
            red("✗"),
            red(&format!("Error processing chunk {chunk}: {error}"))
        );
    }

    fn on_run_complete(&self, summary: &RunSummary) {
        if self.quiet {
            return;
        }
        let done = summary.completed.len();
        let mark = if summary.failed() { red("✘") } else { green("✔") };
        eprintln!(
            "{} {} chunk(s) converted",
            mark,
            bold(&done.to_string())
        );
        if let Some(page) = summary.resume_page() {
            eprintln!(
                "   {}",
                dim(&format!("resume later with --start-page {page}"))
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert report.pdf 30 pages at a time into out/
  pdfchunk report.pdf out/

  # Smaller chunks, resuming at (0-based) page 120
  pdfchunk --chunk-size 20 --start-page 120 book.pdf out/

  # Use a different converter command (everything after `--`)
  pdfchunk report.pdf out/ -- marker_single --output_format markdown

  # Answer prompts from a script: two chunks, then stop
  printf 'y\nn\n' | pdfchunk report.pdf out/

CONVERTER CONTRACT:
  For each chunk pdfchunk runs

    <converter...> <input> <output> --max_pages <chunk-size> [--start_page <n>]

  --start_page is omitted for a chunk starting at page 0; otherwise it is
  one less than the chunk's first 0-based page, so every chunk after the
  first also re-reads the last page of the chunk before it.
  A non-zero exit status stops the run.

  Default converter: poetry run python convert_single.py

OUTPUT FILES:
  <output_directory>/<input stem>_P_<first>-<last>.<extension>
  with 1-based, inclusive page numbers, e.g. out/report_P_31-60.md

EXIT STATUS:
  0  operator declined, or converter failed (without --strict)
  1  fatal error (bad arguments, output directory, converter not found)
  2  converter failed and --strict was given
"#;

/// Run a PDF converter over a document in page-range chunks.
#[derive(Parser, Debug)]
#[command(
    name = "pdfchunk",
    version,
    about = "Run a PDF converter over a document in page-range chunks",
    long_about = "Split a large document conversion into sequential page-range chunks. \
The external converter is invoked once per chunk, and you are asked before each \
new chunk whether to continue.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF file.
    input_document: PathBuf,

    /// Directory for the per-chunk output files (created if missing).
    output_directory: PathBuf,

    /// Number of pages per chunk.
    #[arg(long, env = "PDFCHUNK_CHUNK_SIZE", default_value_t = 30,
          value_parser = clap::value_parser!(u64).range(1..))]
    chunk_size: u64,

    /// Starting page number (0-based).
    #[arg(long, env = "PDFCHUNK_START_PAGE")]
    start_page: Option<usize>,

    /// Extension of the output files.
    #[arg(long, env = "PDFCHUNK_EXTENSION", default_value = "md")]
    extension: String,

    /// Exit with status 2 if the run stops because the converter failed.
    #[arg(long, env = "PDFCHUNK_STRICT")]
    strict: bool,

    /// Print the run summary as JSON on stdout (prompts move to stderr).
    #[arg(long, env = "PDFCHUNK_JSON")]
    json: bool,

    /// Disable per-chunk status lines.
    #[arg(long, env = "PDFCHUNK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFCHUNK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and prompts.
    #[arg(short, long, env = "PDFCHUNK_QUIET")]
    quiet: bool,

    /// Converter command, given after `--`. Default: poetry run python convert_single.py
    #[arg(last = true, value_name = "CONVERTER")]
    converter: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The status lines already say what the INFO/WARN logs would; keep the
    // log to errors while they are shown. `--quiet` keeps only the failure line.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress || cli.quiet {
        let cb = CliProgressCallback {
            quiet: cli.quiet,
            verbose: cli.verbose,
        };
        Some(Arc::new(cb) as Arc<dyn ChunkProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;
    let converter = CommandConverter::new(config.converter.clone());

    let mut prompt: Box<dyn ContinuationPrompt> = if cli.json {
        Box::new(LinePrompt::stdin_stderr())
    } else {
        Box::new(LinePrompt::stdio())
    };

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = run(&config, &converter, prompt.as_mut())
        .await
        .context("Chunked conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    }

    if let StopReason::PageSpaceExhausted { next_start } = summary.stop {
        tracing::warn!("Stopped: no chunk can start at page {}", next_start);
    }

    if cli.strict && summary.failed() {
        return Ok(ExitCode::from(EXIT_CONVERTER_FAILED));
    }
    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `JobConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<JobConfig> {
    let chunk_size =
        usize::try_from(cli.chunk_size).context("Chunk size does not fit this platform")?;

    let mut builder = JobConfig::builder(&cli.input_document, &cli.output_directory)
        .chunk_size(chunk_size)
        .maybe_start_page(cli.start_page)
        .extension(cli.extension.as_str());

    if let Some(command) = ConverterCommand::from_argv(cli.converter.iter().cloned()) {
        builder = builder.converter(command);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
