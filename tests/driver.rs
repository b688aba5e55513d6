//! Driver integration tests with an in-process fake converter.
//!
//! The fake records every request and can be told to fail on a given
//! invocation, so the chunk arithmetic, argument policy, and stop conditions
//! can be checked without launching processes.

use async_trait::async_trait;
use pdfchunk::{
    run, run_sync, Chunk, ChunkError, ChunkProgressCallback, ConversionRequest, ConverterError,
    JobConfig, PageConverter, RunSummary, ScriptedPrompt, StopReason,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeConverter {
    calls: Mutex<Vec<ConversionRequest>>,
    /// 1-based invocation that exits non-zero.
    fail_on: Option<usize>,
    /// 1-based invocation that cannot be launched.
    launch_error_on: Option<usize>,
}

impl FakeConverter {
    fn failing_on(n: usize) -> Self {
        Self {
            fail_on: Some(n),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<ConversionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageConverter for FakeConverter {
    async fn convert(&self, request: &ConversionRequest) -> Result<(), ConverterError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len()
        };
        if self.launch_error_on == Some(n) {
            return Err(ConverterError::Launch {
                program: "fake".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            });
        }
        if self.fail_on == Some(n) {
            return Err(ConverterError::Failed {
                command: "fake".into(),
                code: Some(1),
            });
        }
        Ok(())
    }
}

fn config(dir: &TempDir, input: &str, chunk_size: usize, start: Option<usize>) -> JobConfig {
    JobConfig::builder(input, dir.path().join("out"))
        .chunk_size(chunk_size)
        .maybe_start_page(start)
        .build()
        .unwrap()
}

fn file_name(p: &Path) -> String {
    p.file_name().unwrap().to_string_lossy().into_owned()
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_scenario_two_chunks() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, "report.pdf", 30, None);
    let conv = FakeConverter::default();
    let mut prompt = ScriptedPrompt::new(["y", "n"]);

    let summary = run(&cfg, &conv, &mut prompt).await.unwrap();

    let calls = conv.calls();
    assert_eq!(calls.len(), 2);

    assert_eq!(calls[0].input, PathBuf::from("report.pdf"));
    assert_eq!(calls[0].max_pages, 30);
    assert_eq!(calls[0].start_page, None);
    assert_eq!(calls[0].output, dir.path().join("out/report_P_1-30.md"));

    assert_eq!(calls[1].max_pages, 30);
    assert_eq!(calls[1].start_page, Some(29));
    assert_eq!(calls[1].output, dir.path().join("out/report_P_31-60.md"));

    assert_eq!(summary.completed.len(), 2);
    match summary.stop {
        StopReason::Declined { next } => {
            assert_eq!((next.start, next.end), (60, 90));
        }
        other => panic!("expected decline, got {other:?}"),
    }

    // Prompts named the upcoming 1-based ranges.
    let asked: Vec<String> = prompt.asked().iter().map(Chunk::to_string).collect();
    assert_eq!(asked, vec!["31-60", "61-90"]);
}

#[tokio::test]
async fn first_chunk_failure_stops_without_prompt() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, "report.pdf", 30, None);
    let conv = FakeConverter::failing_on(1);
    let mut prompt = ScriptedPrompt::accept(10);

    let summary = run(&cfg, &conv, &mut prompt).await.unwrap();

    assert_eq!(conv.calls().len(), 1);
    assert!(prompt.asked().is_empty(), "no prompt after a failure");
    assert!(summary.completed.is_empty());
    match &summary.stop {
        StopReason::ConverterFailed { chunk, error } => {
            assert_eq!(chunk.to_string(), "1-30");
            assert!(error.contains("status 1"), "got: {error}");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(summary.failed());
}

#[tokio::test]
async fn terminates_after_exactly_one_failure() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, "doc.pdf", 10, None);
    let conv = FakeConverter::failing_on(4);
    let mut prompt = ScriptedPrompt::accept(100);

    let summary = run(&cfg, &conv, &mut prompt).await.unwrap();

    assert_eq!(conv.calls().len(), 4);
    assert_eq!(summary.completed.len(), 3);
    assert_eq!(prompt.asked().len(), 3);
    assert!(matches!(
        summary.stop,
        StopReason::ConverterFailed { chunk, .. } if chunk.start == 30
    ));
}

#[tokio::test]
async fn nth_chunk_range_from_start_page() {
    let dir = TempDir::new().unwrap();
    let (p, s) = (17usize, 8usize);
    let cfg = config(&dir, "book.pdf", s, Some(p));
    let conv = FakeConverter::default();
    let mut prompt = ScriptedPrompt::accept(4);

    let summary = run(&cfg, &conv, &mut prompt).await.unwrap();

    assert_eq!(summary.completed.len(), 5);
    for (i, done) in summary.completed.iter().enumerate() {
        let n = i + 1;
        assert_eq!(done.chunk.index, n);
        assert_eq!(done.chunk.start, p + (n - 1) * s);
        assert_eq!(done.chunk.end, p + n * s);
    }

    let calls = conv.calls();
    // Non-zero start on the very first chunk still gets the overlap.
    assert_eq!(calls[0].start_page, Some(p - 1));
    for (call, done) in calls.iter().zip(&summary.completed) {
        assert_eq!(call.start_page, Some(done.chunk.start - 1));
        assert_eq!(call.max_pages, s);
        assert_eq!(call.output, done.output);
    }
}

#[tokio::test]
async fn output_names_unique_and_increasing() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, "scan.v2.pdf", 5, None);
    let conv = FakeConverter::default();
    let mut prompt = ScriptedPrompt::accept(3);

    run(&cfg, &conv, &mut prompt).await.unwrap();

    let names: Vec<String> = conv.calls().iter().map(|c| file_name(&c.output)).collect();
    assert_eq!(
        names,
        vec![
            "scan.v2_P_1-5.md",
            "scan.v2_P_6-10.md",
            "scan.v2_P_11-15.md",
            "scan.v2_P_16-20.md"
        ]
    );
}

#[tokio::test]
async fn start_page_zero_passes_no_start_argument() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, "a.pdf", 3, Some(0));
    let conv = FakeConverter::default();

    run(&cfg, &conv, &mut ScriptedPrompt::default()).await.unwrap();

    assert_eq!(conv.calls()[0].start_page, None);
}

#[tokio::test]
async fn non_affirmative_answers_decline() {
    for answer in ["n", "yes", "", "Y ", "q"] {
        let dir = TempDir::new().unwrap();
        let cfg = config(&dir, "a.pdf", 30, None);
        let conv = FakeConverter::default();
        let mut prompt = ScriptedPrompt::new([answer]);

        let summary = run(&cfg, &conv, &mut prompt).await.unwrap();

        assert_eq!(conv.calls().len(), 1, "answer {answer:?}");
        assert!(matches!(summary.stop, StopReason::Declined { .. }));
    }
}

#[tokio::test]
async fn uppercase_y_continues() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, "a.pdf", 30, None);
    let conv = FakeConverter::default();

    run(&cfg, &conv, &mut ScriptedPrompt::new(["Y"])).await.unwrap();

    assert_eq!(conv.calls().len(), 2);
}

#[tokio::test]
async fn creates_nested_output_directory() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("a/b/c");
    let cfg = JobConfig::builder("a.pdf", &out).build().unwrap();

    run(&cfg, &FakeConverter::default(), &mut ScriptedPrompt::default())
        .await
        .unwrap();
    assert!(out.is_dir());

    // Idempotent on a second run.
    run(&cfg, &FakeConverter::default(), &mut ScriptedPrompt::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn output_directory_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, b"not a dir").unwrap();
    let cfg = JobConfig::builder("a.pdf", blocker.join("out")).build().unwrap();
    let conv = FakeConverter::default();

    let err = run(&cfg, &conv, &mut ScriptedPrompt::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ChunkError::OutputDir { .. }));
    assert!(conv.calls().is_empty(), "no chunk before the directory exists");
}

#[tokio::test]
async fn launch_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, "a.pdf", 30, None);
    let conv = FakeConverter {
        launch_error_on: Some(2),
        ..FakeConverter::default()
    };

    let err = run(&cfg, &conv, &mut ScriptedPrompt::accept(5))
        .await
        .unwrap_err();

    assert!(matches!(err, ChunkError::ConverterLaunch { .. }));
    assert_eq!(conv.calls().len(), 2);
}

#[tokio::test]
async fn stops_when_page_space_runs_out() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, "a.pdf", 10, Some(usize::MAX - 15));
    let conv = FakeConverter::default();
    let mut prompt = ScriptedPrompt::accept(5);

    let summary = run(&cfg, &conv, &mut prompt).await.unwrap();

    assert_eq!(conv.calls().len(), 1);
    assert!(prompt.asked().is_empty());
    assert_eq!(
        summary.stop,
        StopReason::PageSpaceExhausted {
            next_start: usize::MAX - 5
        }
    );
}

// ── Progress callback ────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
    runs_completed: AtomicUsize,
}

impl ChunkProgressCallback for Recorder {
    fn on_run_start(&self, config: &JobConfig) {
        self.events
            .lock()
            .unwrap()
            .push(format!("run:{}", config.chunk_size));
    }

    fn on_chunk_start(&self, chunk: &Chunk) {
        self.events.lock().unwrap().push(format!("start:{chunk}"));
    }

    fn on_chunk_complete(&self, chunk: &Chunk, output: &Path, _elapsed: Duration) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done:{chunk}:{}", file_name(output)));
    }

    fn on_chunk_error(&self, chunk: &Chunk, _error: &ConverterError) {
        self.events.lock().unwrap().push(format!("error:{chunk}"));
    }

    fn on_run_complete(&self, _summary: &RunSummary) {
        self.runs_completed.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn progress_events_in_order() {
    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let cfg = JobConfig::builder("r.pdf", dir.path().join("out"))
        .chunk_size(30)
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    let conv = FakeConverter::failing_on(2);

    run(&cfg, &conv, &mut ScriptedPrompt::accept(5)).await.unwrap();

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec![
            "run:30",
            "start:1-30",
            "done:1-30:r_P_1-30.md",
            "start:31-60",
            "error:31-60",
        ]
    );
    assert_eq!(recorder.runs_completed.load(Ordering::SeqCst), 1);
}

// ── Blocking API ─────────────────────────────────────────────────────────────

#[test]
fn run_sync_matches_async() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir, "report.pdf", 30, None);
    let conv = FakeConverter::default();

    let summary = run_sync(&cfg, &conv, &mut ScriptedPrompt::accept(1)).unwrap();

    assert_eq!(summary.completed.len(), 2);
    assert_eq!(summary.resume_page(), Some(60));
}
