use crate::error::{McpHealthError, Result};
use crate::mcp::sse::{FieldStyle, SseDemux, SseFrame};
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use tokio::time::{timeout, Duration};

/// Longest line accepted before the stream is rejected.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Frame reader over a live HTTP response body.
pub type ResponseFrames = FrameStream<BoxStream<'static, reqwest::Result<Bytes>>>;

/// Reads a chunked byte stream and yields SSE frames.
///
/// Chunks may split lines (and UTF-8 sequences) anywhere; bytes are held
/// until a full line is available. Each read from the underlying stream is
/// bounded by `read_timeout`.
pub struct FrameStream<S> {
    inner: S,
    partial: Vec<u8>,
    lines: VecDeque<String>,
    demux: SseDemux,
    read_timeout: Duration,
    finished: bool,
}

impl ResponseFrames {
    pub fn from_response(
        response: reqwest::Response,
        style: FieldStyle,
        read_timeout: Duration,
    ) -> Self {
        FrameStream::new(response.bytes_stream().boxed(), style, read_timeout)
    }
}

impl<S, E> FrameStream<S>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: Into<McpHealthError>,
{
    pub fn new(inner: S, style: FieldStyle, read_timeout: Duration) -> Self {
        Self {
            inner,
            partial: Vec::new(),
            lines: VecDeque::new(),
            demux: SseDemux::new(style),
            read_timeout,
            finished: false,
        }
    }

    pub fn set_read_timeout(&mut self, read_timeout: Duration) {
        self.read_timeout = read_timeout;
    }

    /// Next complete frame, `None` once the stream has ended and every
    /// buffered frame was returned. A read that stalls past the timeout
    /// yields [`McpHealthError::Timeout`].
    pub async fn next_frame(&mut self) -> Result<Option<SseFrame>> {
        loop {
            while let Some(line) = self.lines.pop_front() {
                if let Some(frame) = self.demux.push_line(&line) {
                    tracing::debug!(event = ?frame.event_type, data = %frame.data, "sse frame");
                    return Ok(Some(frame));
                }
            }

            if self.finished {
                return Ok(self.demux.finish());
            }

            match timeout(self.read_timeout, self.inner.next()).await {
                Ok(Some(chunk)) => {
                    let chunk = chunk.map_err(Into::into)?;
                    self.push_bytes(&chunk)?;
                }
                Ok(None) => {
                    self.finished = true;
                    if !self.partial.is_empty() {
                        let tail = std::mem::take(&mut self.partial);
                        self.lines
                            .push_back(String::from_utf8_lossy(&tail).into_owned());
                    }
                }
                Err(_) => {
                    return Err(McpHealthError::Timeout(self.read_timeout));
                }
            }
        }
    }

    fn push_bytes(&mut self, chunk: &[u8]) -> Result<()> {
        // bytes already buffered hold no newline
        let mut cursor = self.partial.len();
        self.partial.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(offset) = self.partial[cursor..].iter().position(|b| *b == b'\n') {
            let end = cursor + offset;
            self.lines
                .push_back(String::from_utf8_lossy(&self.partial[start..end]).into_owned());
            start = end + 1;
            cursor = start;
        }
        self.partial.drain(..start);

        if self.partial.len() > MAX_LINE_BYTES {
            return Err(McpHealthError::Other(format!(
                "SSE line exceeds {} bytes without a newline",
                MAX_LINE_BYTES
            )));
        }
        Ok(())
    }
}
