use crate::error::{describe_duration, McpHealthError, Result};
use crate::mcp::envelope::unwrap_tool_result;
use crate::mcp::sse::SseFrame;
use crate::mcp::stream::FrameStream;
use crate::mcp::types::{MessageKind, ToolOutput};
use bytes::Bytes;
use futures::Stream;
use serde_json::Value;
use tokio::time::{timeout, Duration};

/// End-of-stream marker some servers send as frame data.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Picks the frame carrying the JSON-RPC response out of a frame sequence.
///
/// With [`Correlator::after_event`] every frame is ignored until one of the
/// given event type has been seen; that frame and all later ones are then
/// considered.
#[derive(Debug, Clone)]
pub struct Correlator {
    expect_event: Option<String>,
    expect_id: Option<Value>,
    gate_open: bool,
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator {
    pub fn new() -> Self {
        Self {
            expect_event: None,
            expect_id: None,
            gate_open: true,
        }
    }

    pub fn after_event(mut self, event_type: impl Into<String>) -> Self {
        self.expect_event = Some(event_type.into());
        self.gate_open = false;
        self
    }

    pub fn expecting_id(mut self, id: impl Into<Value>) -> Self {
        self.expect_id = Some(id.into());
        self
    }

    /// Returns the reply when `frame` completes the exchange.
    pub fn offer(&mut self, frame: &SseFrame) -> Option<ToolOutput> {
        if !self.gate_open {
            match &self.expect_event {
                Some(event) if frame.is_event(event) => self.gate_open = true,
                _ => {
                    tracing::debug!(event = ?frame.event_type, "skipping frame before message boundary");
                    return None;
                }
            }
        }

        let data = frame.data.trim();
        if data.is_empty() || data == DONE_SENTINEL {
            return None;
        }

        let message: Value = match serde_json::from_str(data) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(error = %e, "frame data is not JSON, passing through");
                return Some(ToolOutput::RawText(frame.data.clone()));
            }
        };

        match MessageKind::of(&message) {
            MessageKind::Response if self.matches_id(&message) => {
                Some(unwrap_tool_result(message))
            }
            MessageKind::Response => {
                tracing::debug!(id = %message["id"], "skipping response for another request");
                None
            }
            MessageKind::Request | MessageKind::Notification => {
                tracing::debug!(method = %message["method"], "skipping server-initiated message");
                None
            }
            MessageKind::Invalid => {
                tracing::warn!("skipping JSON frame that is not a JSON-RPC message");
                None
            }
        }
    }

    fn matches_id(&self, message: &Value) -> bool {
        let Some(expected) = &self.expect_id else {
            return true;
        };
        match message.get("id") {
            Some(id) if id == expected => true,
            // errors for requests the server could not parse carry a null id
            Some(Value::Null) => message.get("error").is_some(),
            _ => false,
        }
    }
}

/// Correlate over an already-collected frame sequence.
pub fn correlate<I>(frames: I, mut correlator: Correlator) -> Option<ToolOutput>
where
    I: IntoIterator<Item = SseFrame>,
{
    frames
        .into_iter()
        .find_map(|frame| correlator.offer(&frame))
}

/// Read frames until the correlator accepts one, for at most `limit` overall.
///
/// Stream end, a stalled read and the overall limit all surface as
/// [`McpHealthError::NoResponse`].
pub async fn await_response<S, E>(
    frames: &mut FrameStream<S>,
    mut correlator: Correlator,
    limit: Duration,
) -> Result<ToolOutput>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: Into<McpHealthError>,
{
    let read = async {
        loop {
            match frames.next_frame().await {
                Ok(Some(frame)) => {
                    if let Some(output) = correlator.offer(&frame) {
                        return Ok(output);
                    }
                }
                Ok(None) => {
                    return Err(McpHealthError::NoResponse(
                        "stream ended before a JSON-RPC response arrived".to_string(),
                    ))
                }
                Err(McpHealthError::Timeout(waited)) => {
                    return Err(McpHealthError::NoResponse(format!(
                        "timeout, no data for {}",
                        describe_duration(waited)
                    )))
                }
                Err(e) => return Err(e),
            }
        }
    };

    match timeout(limit, read).await {
        Ok(result) => result,
        Err(_) => Err(McpHealthError::NoResponse(format!(
            "timeout, no reply within {}",
            describe_duration(limit)
        ))),
    }
}
