//! Asking the operator whether to continue with the next chunk.
//!
//! The driver only sees the [`ContinuationPrompt`] capability: given the
//! chunk it is about to process, answer yes or no. [`LinePrompt`] asks on a
//! terminal (or any async line source); [`ScriptedPrompt`] replays canned
//! answers and is what the tests use.

use crate::chunk::Chunk;
use crate::error::ChunkError;
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Decides whether the run continues with `next`.
#[async_trait]
pub trait ContinuationPrompt: Send {
    async fn confirm(&mut self, next: &Chunk) -> Result<bool, ChunkError>;
}

/// Only a single `y`, in either case, counts as acceptance.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim_end_matches(['\r', '\n']).eq_ignore_ascii_case("y")
}

/// The question shown before `next`.
pub fn question(next: &Chunk) -> String {
    format!(
        "\nProcess next chunk (pages {}-{})? [y/n]: ",
        next.first_page(),
        next.last_page()
    )
}

/// Writes the question to `writer` and reads one line of answer from `reader`.
///
/// End of input counts as "no".
pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> LinePrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl LinePrompt<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    /// Ask on stdout, answer on stdin.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl LinePrompt<BufReader<tokio::io::Stdin>, tokio::io::Stderr> {
    /// Ask on stderr, answer on stdin; keeps stdout free for machine output.
    pub fn stdin_stderr() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stderr())
    }
}

#[async_trait]
impl<R, W> ContinuationPrompt for LinePrompt<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn confirm(&mut self, next: &Chunk) -> Result<bool, ChunkError> {
        self.writer
            .write_all(question(next).as_bytes())
            .await
            .map_err(ChunkError::Prompt)?;
        self.writer.flush().await.map_err(ChunkError::Prompt)?;

        let mut answer = String::new();
        let n = self
            .reader
            .read_line(&mut answer)
            .await
            .map_err(ChunkError::Prompt)?;
        if n == 0 {
            return Ok(false);
        }
        Ok(is_affirmative(&answer))
    }
}

/// Replays a fixed list of answers, then answers "no".
///
/// Every chunk it was asked about is recorded in [`ScriptedPrompt::asked`].
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<String>,
    asked: Vec<Chunk>,
}

impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Answer `y` to the first `n` questions.
    pub fn accept(n: usize) -> Self {
        Self::new(std::iter::repeat_n("y", n))
    }

    pub fn asked(&self) -> &[Chunk] {
        &self.asked
    }
}

#[async_trait]
impl ContinuationPrompt for ScriptedPrompt {
    async fn confirm(&mut self, next: &Chunk) -> Result<bool, ChunkError> {
        self.asked.push(*next);
        Ok(self
            .answers
            .pop_front()
            .is_some_and(|a| is_affirmative(&a)))
    }
}
