//! Event source abstraction for host event ingestion.
//!
//! Provides a unified trait for reading [`HostEvent`]s from different sources:
//! JSON lines on stdin (live host bridge) and pre-loaded events (replay).

use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use crate::types::HostEvent;

/// Errors a source can fail with. Malformed lines on a live stream are not
/// errors; they are skipped.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid host event: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Events produced by an event source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A host event was read.
    Event(HostEvent),
    /// Source reached end of data.
    Eof,
}

/// Trait abstracting where host events come from.
///
/// The processing loop calls [`next_event`](EventSource::next_event) inside a
/// `select!` with cancellation, so implementations must be cancel safe at
/// line granularity.
#[async_trait]
pub trait EventSource: Send {
    /// Read the next event. Returns `SourceEvent::Eof` when no more data is available.
    async fn next_event(&mut self) -> Result<SourceEvent, SourceError>;

    /// Human-readable name for logging (e.g. "stdin", "replay").
    fn source_name(&self) -> &str;
}

// ============================================================================
// Replay Source
// ============================================================================

/// Replays pre-loaded host events with optional inter-event delay.
pub struct ReplaySource {
    events: std::vec::IntoIter<HostEvent>,
    delay_ms: u64,
    yielded_first: bool,
}

impl ReplaySource {
    pub fn new(events: Vec<HostEvent>, delay_ms: u64) -> Self {
        Self {
            events: events.into_iter(),
            delay_ms,
            yielded_first: false,
        }
    }

    /// Load a JSON-lines recording. Blank lines and `#` comments are skipped;
    /// any other unparseable line fails the load.
    pub fn from_file(path: &Path, delay_ms: u64) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::new(parse_event_lines(&content)?, delay_ms))
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl EventSource for ReplaySource {
    async fn next_event(&mut self) -> Result<SourceEvent, SourceError> {
        // No delay before the first event.
        if self.yielded_first && self.delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.delay_ms)).await;
        }
        match self.events.next() {
            Some(event) => {
                self.yielded_first = true;
                Ok(SourceEvent::Event(event))
            }
            None => Ok(SourceEvent::Eof),
        }
    }

    fn source_name(&self) -> &str {
        "replay"
    }
}

/// Parse a JSON-lines recording into host events.
pub fn parse_event_lines(content: &str) -> Result<Vec<HostEvent>, SourceError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str(line.trim()).map_err(|source| SourceError::Parse { line: idx + 1, source })
        })
        .collect()
}

// ============================================================================
// JSON Lines Source (stdin)
// ============================================================================

/// Reads JSON-formatted host events, one per line, from an async reader.
///
/// Used with the simulation harness:
/// `meter-simulation | phasewatch --stdin --emit-frames`
pub struct JsonLinesSource<R> {
    reader: R,
    line_buffer: Vec<u8>,
    lines_read: usize,
    name: &'static str,
}

/// Host events from the process's standard input.
pub type StdinSource = JsonLinesSource<BufReader<Stdin>>;

impl JsonLinesSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), "stdin")
    }
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(reader: R, name: &'static str) -> Self {
        Self {
            reader,
            line_buffer: Vec::with_capacity(2048),
            lines_read: 0,
            name,
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> EventSource for JsonLinesSource<R> {
    async fn next_event(&mut self) -> Result<SourceEvent, SourceError> {
        loop {
            self.line_buffer.clear();
            let bytes = self.reader.read_until(b'\n', &mut self.line_buffer).await?;
            if bytes == 0 {
                return Ok(SourceEvent::Eof);
            }
            self.lines_read += 1;
            let line = match std::str::from_utf8(&self.line_buffer) {
                Ok(line) => line.trim(),
                Err(e) => {
                    tracing::warn!(line = self.lines_read, "[{}] Skipping unparseable event: {}", self.name, e);
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<HostEvent>(line) {
                Ok(event) => return Ok(SourceEvent::Event(event)),
                Err(e) => {
                    tracing::warn!(line = self.lines_read, "[{}] Skipping unparseable event: {}", self.name, e);
                }
            }
        }
    }

    fn source_name(&self) -> &str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_json_lines_skips_malformed() {
        let input = b"{\"event\":\"configuration\",\"ids\":[\"V1\"]}\n\nnot json\n{\"event\":\"values\",\"batch\":{\"V1\":{\"value\":1}}}\n";
        let mut source = JsonLinesSource::new(&input[..], "test");

        let first = source.next_event().await.expect("read");
        assert!(matches!(first, SourceEvent::Event(HostEvent::Configuration { .. })));
        let second = source.next_event().await.expect("read");
        assert!(matches!(second, SourceEvent::Event(HostEvent::Values { .. })));
        assert_eq!(source.next_event().await.expect("read"), SourceEvent::Eof);
    }

    #[tokio::test]
    async fn test_json_lines_skips_invalid_utf8() {
        let input = b"{\"event\":\"configuration\",\"ids\":[\"V1\"]}\n\xff\xfe garbage\n{\"event\":\"values\",\"batch\":{\"V1\":{\"value\":229.9}}}\n";
        let mut source = JsonLinesSource::new(&input[..], "test");

        let first = source.next_event().await.expect("read");
        assert!(matches!(first, SourceEvent::Event(HostEvent::Configuration { .. })));
        let second = source.next_event().await.expect("undecodable line is skipped");
        assert!(matches!(second, SourceEvent::Event(HostEvent::Values { .. })));
        assert_eq!(source.next_event().await.expect("read"), SourceEvent::Eof);
        assert_eq!(source.lines_read, 3);
    }

    #[test]
    fn test_replay_source_yields_then_eof() {
        let mut source = ReplaySource::new(vec![HostEvent::Configuration { ids: vec![] }], 0);
        assert_eq!(source.remaining(), 1);
        assert!(matches!(tokio_test::block_on(source.next_event()), Ok(SourceEvent::Event(_))));
        assert!(matches!(tokio_test::block_on(source.next_event()), Ok(SourceEvent::Eof)));
    }

    #[test]
    fn test_replay_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session.jsonl");
        std::fs::write(
            &path,
            "{\"event\":\"configuration\",\"ids\":[\"V1\"]}\n\n{\"event\":\"values\",\"batch\":{}}\n",
        )
        .expect("write recording");

        let source = ReplaySource::from_file(&path, 0).expect("recording loads");
        assert_eq!(source.remaining(), 2);
        assert!(matches!(
            ReplaySource::from_file(&dir.path().join("missing.jsonl"), 0),
            Err(SourceError::Io(_))
        ));
    }

    #[test]
    fn test_parse_event_lines_reports_line_number() {
        let content = "# recorded\n{\"event\":\"configuration\",\"ids\":[]}\n{oops}\n";
        match parse_event_lines(content) {
            Err(SourceError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
