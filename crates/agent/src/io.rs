//! Input and output seams of the chat loop

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use praktor_provider::ToolCall;

/// Source of user messages, one per line. `None` means end of input.
#[async_trait]
pub trait LineSource: Send {
    async fn next_line(&mut self) -> std::io::Result<Option<String>>;
}

/// Lines from any buffered async reader, newline (and `\r\n`) stripped
pub struct ReaderLines<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl ReaderLines<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> LineSource for ReaderLines<R> {
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.lines.next_line().await
    }
}

/// Fixed script of lines
#[derive(Debug, Default)]
pub struct ScriptedLines {
    lines: VecDeque<String>,
}

impl ScriptedLines {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl LineSource for ScriptedLines {
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Where the loop reports what happens
pub trait ChatOutput: Send {
    /// Called right before waiting for user input
    fn prompt(&mut self) {}

    fn assistant(&mut self, text: &str);

    fn tool_call(&mut self, call: &ToolCall);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reader_lines_strips_newlines() {
        let mut source = ReaderLines::new(&b"first\r\nsecond\nlast"[..]);
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reader_lines_keeps_empty_lines() {
        let mut source = ReaderLines::new(&b"\nx\n"[..]);
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("x"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reader_lines_across_partial_reads() {
        let reader = tokio_test::io::Builder::new()
            .read(b"hel")
            .read(b"lo\nwor")
            .read(b"ld\n")
            .build();
        let mut source = ReaderLines::new(BufReader::new(reader));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("hello"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("world"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_scripted_lines() {
        let mut source = ScriptedLines::new(["a", "b"]);
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("a"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("b"));
        assert_eq!(source.next_line().await.unwrap(), None);
        assert_eq!(source.next_line().await.unwrap(), None);
    }
}
