use crate::error::{describe_duration, McpHealthError, Result};
use crate::mcp::sse::SseFrame;
use crate::mcp::stream::FrameStream;
use crate::mcp::types::SessionId;
use bytes::Bytes;
use futures::Stream;
use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;
use tokio::time::{timeout, Duration};

/// Frames read from the bootstrap stream before giving up on a session id.
pub const SESSION_FRAME_LIMIT: usize = 16;

const SESSION_PARAM: &str = "sessionId";

fn session_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"sessionId=([A-Za-z0-9_-]+)").expect("session id pattern is valid")
    })
}

fn is_session_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Extract the session id from an endpoint announcement such as
/// `/message?sessionId=abc123`.
///
/// The payload is resolved against `base` and its query parameters are read;
/// payloads that are not usable URLs fall back to a pattern search.
pub fn session_id_from_endpoint(base: &Url, data: &str) -> Option<SessionId> {
    let data = data.trim();
    if data.is_empty() {
        return None;
    }

    if let Ok(endpoint) = base.join(data) {
        let from_query = endpoint
            .query_pairs()
            .find(|(key, _)| key == SESSION_PARAM)
            .map(|(_, value)| value.into_owned())
            .filter(|value| is_session_token(value));
        if let Some(id) = from_query {
            return Some(SessionId::new(id));
        }
    }

    session_pattern()
        .captures(data)
        .map(|caps| SessionId::new(&caps[1]))
}

pub fn session_id_from_frame(base: &Url, frame: &SseFrame) -> Option<SessionId> {
    session_id_from_endpoint(base, &frame.data)
}

/// Read the bootstrap stream until a frame announces the session endpoint.
///
/// Bounded by [`SESSION_FRAME_LIMIT`] frames and by `deadline` overall.
pub async fn resolve_session<S, E>(
    frames: &mut FrameStream<S>,
    base: &Url,
    deadline: Duration,
) -> Result<SessionId>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
    E: Into<McpHealthError>,
{
    let search = async {
        for _ in 0..SESSION_FRAME_LIMIT {
            match frames.next_frame().await {
                Ok(Some(frame)) => {
                    if let Some(id) = session_id_from_frame(base, &frame) {
                        return Ok(id);
                    }
                    tracing::debug!(event = ?frame.event_type, "frame carries no session id");
                }
                Ok(None) => {
                    return Err(McpHealthError::SessionNotFound(
                        "stream ended before an endpoint was announced".to_string(),
                    ))
                }
                Err(McpHealthError::Timeout(waited)) => {
                    return Err(McpHealthError::SessionNotFound(format!(
                        "no data for {}",
                        describe_duration(waited)
                    )))
                }
                Err(e) => return Err(e),
            }
        }
        Err(McpHealthError::SessionNotFound(format!(
            "no sessionId in the first {} frames",
            SESSION_FRAME_LIMIT
        )))
    };

    match timeout(deadline, search).await {
        Ok(result) => result,
        Err(_) => Err(McpHealthError::SessionNotFound(format!(
            "timed out after {}",
            describe_duration(deadline)
        ))),
    }
}
