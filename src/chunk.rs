//! Page-range windows over a document.
//!
//! A [`Chunk`] is the half-open, 0-based range `[start, end)` handed to one
//! converter invocation. [`ChunkPlan`] produces them lazily: each chunk starts
//! where the previous one ended, so the sequence is contiguous and strictly
//! increasing, and it never ends on its own. The driver decides when to stop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One contiguous page range processed by a single converter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chunk {
    /// 1-based ordinal of this chunk within the run.
    pub index: usize,
    /// 0-based inclusive first page.
    pub start: usize,
    /// 0-based exclusive end page (`start + size`).
    pub end: usize,
}

impl Chunk {
    /// Number of pages the converter is allowed to process.
    pub fn size(&self) -> usize {
        self.end - self.start
    }

    /// 1-based number of the first page in this chunk.
    pub fn first_page(&self) -> usize {
        self.start + 1
    }

    /// 1-based number of the last page in this chunk.
    pub fn last_page(&self) -> usize {
        self.end
    }

    /// Start-page offset passed to the converter.
    ///
    /// `None` for a chunk at the very beginning of the document. Otherwise one
    /// page *before* `start`, so the converter re-reads the last page of the
    /// previous chunk.
    pub fn converter_start_page(&self) -> Option<usize> {
        self.start.checked_sub(1)
    }

    /// The chunk that follows this one, or `None` if it would overflow.
    pub fn next(&self) -> Option<Chunk> {
        let end = self.end.checked_add(self.size())?;
        Some(Chunk {
            index: self.index + 1,
            start: self.end,
            end,
        })
    }

    /// Output file name: `{base_name}_P_{first}-{last}.{extension}`.
    pub fn file_name(&self, base_name: &str, extension: &str) -> String {
        format!(
            "{}_P_{}-{}.{}",
            base_name,
            self.first_page(),
            self.last_page(),
            extension
        )
    }

    /// Full output path inside `output_dir`.
    pub fn output_path(&self, output_dir: &Path, base_name: &str, extension: &str) -> PathBuf {
        output_dir.join(self.file_name(base_name, extension))
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first_page(), self.last_page())
    }
}

/// Unbounded, lazy sequence of contiguous chunks of a fixed size.
///
/// Yields `None` only when the next range cannot be represented in `usize`.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    next: Option<Chunk>,
}

impl ChunkPlan {
    /// Plan chunks of `chunk_size` pages starting at 0-based page `start_page`.
    ///
    /// `chunk_size` must be non-zero; [`crate::config::JobConfigBuilder::build`]
    /// enforces that for configured runs.
    pub fn new(start_page: usize, chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0, "chunk size must be positive");
        let next = start_page.checked_add(chunk_size).map(|end| Chunk {
            index: 1,
            start: start_page,
            end,
        });
        Self { next }
    }

    /// The chunk the next call to [`Iterator::next`] will yield.
    pub fn peek(&self) -> Option<&Chunk> {
        self.next.as_ref()
    }
}

impl Iterator for ChunkPlan {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let current = self.next.take()?;
        self.next = current.next();
        Some(current)
    }
}

/// Derive the base name used in output file names: the input's file name
/// with its final extension removed (`docs/report.v2.pdf` → `report.v2`).
///
/// `None` when there is no stem or it is not valid UTF-8; a lossy stem could
/// map distinct inputs onto the same output names.
pub fn base_name(input: &Path) -> Option<String> {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
