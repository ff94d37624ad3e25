use crate::error::{describe_duration, McpHealthError, Result};
use crate::mcp::types::SessionId;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Response, Url};
use serde::Serialize;
use tokio::time::{timeout, Duration};

pub const PROTOCOL_VERSION: &str = "2025-06-18";

pub const SESSION_HEADER: &str = "mcp-session-id";
pub const PROTOCOL_VERSION_HEADER: &str = "mcp-protocol-version";

pub const EVENT_STREAM: &str = "text/event-stream";
pub const JSON_OR_EVENT_STREAM: &str = "application/json, text/event-stream";

/// A single HTTP exchange to open.
pub struct OpenRequest<'a, B: Serialize + ?Sized> {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<&'a B>,
    pub timeout: Duration,
}

impl<'a, B: Serialize + ?Sized> OpenRequest<'a, B> {
    pub fn post(url: Url, headers: HeaderMap, body: &'a B, timeout: Duration) -> Self {
        Self {
            method: Method::POST,
            url,
            headers,
            body: Some(body),
            timeout,
        }
    }
}

impl OpenRequest<'static, ()> {
    pub fn get(url: Url, headers: HeaderMap, timeout: Duration) -> Self {
        Self {
            method: Method::GET,
            url,
            headers,
            body: None,
            timeout,
        }
    }
}

/// Issues requests against one MCP server and hands back streaming responses.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, connect_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            McpHealthError::ConfigError(format!("Invalid server URL '{}': {}", base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| McpHealthError::Other(format!("Invalid endpoint path '{}': {}", path, e)))
    }

    /// Send the request and return the response with its body unread.
    ///
    /// The timeout covers sending and receiving the response head only; the
    /// body is read later as a stream. Any failure, including a non-2xx
    /// status, is reported as [`McpHealthError::Connect`].
    pub async fn open<B: Serialize + ?Sized>(&self, request: OpenRequest<'_, B>) -> Result<Response> {
        let url = request.url;
        let mut builder = self
            .client
            .request(request.method.clone(), url.clone())
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, url = %url, "opening request");

        let response = match timeout(request.timeout, builder.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(McpHealthError::connect(url, e)),
            Err(_) => {
                return Err(McpHealthError::connect(
                    url,
                    format!("timed out after {}", describe_duration(request.timeout)),
                ))
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(McpHealthError::connect(url, format!("HTTP status {}", status)));
        }

        tracing::debug!(status = %status, content_type = ?content_type(&response), "response opened");
        Ok(response)
    }
}

/// Headers for the legacy SSE bootstrap stream.
pub fn event_stream_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(EVENT_STREAM));
    headers
}

/// Headers for the session-scoped call on the legacy transport.
pub fn message_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Headers for every Streamable HTTP POST, with the session replayed once known.
pub fn streamable_headers(session: Option<&SessionId>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_OR_EVENT_STREAM));
    headers.insert(
        HeaderName::from_static(PROTOCOL_VERSION_HEADER),
        HeaderValue::from_static(PROTOCOL_VERSION),
    );
    if let Some(session) = session {
        let value = HeaderValue::from_str(session.as_str()).map_err(|e| {
            McpHealthError::Other(format!("Session id is not a valid header value: {}", e))
        })?;
        headers.insert(HeaderName::from_static(SESSION_HEADER), value);
    }
    Ok(headers)
}

pub fn content_type(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

pub fn session_header(response: &Response) -> Option<SessionId> {
    response
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(SessionId::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_streamable_headers_without_session() {
        let headers = streamable_headers(None).unwrap();
        assert_eq!(headers[ACCEPT], "application/json, text/event-stream");
        assert_eq!(headers["MCP-Protocol-Version"], "2025-06-18");
        assert!(headers.get("Mcp-Session-Id").is_none());
    }

    #[test]
    fn test_streamable_headers_replay_session() {
        let session = SessionId::new("sess-42");
        let headers = streamable_headers(Some(&session)).unwrap();
        assert_eq!(headers["Mcp-Session-Id"], "sess-42");
    }

    #[test]
    fn test_event_stream_accept() {
        assert_eq!(event_stream_headers()[ACCEPT], "text/event-stream");
    }

    #[test]
    fn test_endpoint_join() {
        let transport = HttpTransport::new("http://localhost:5001", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.endpoint("/sse").unwrap().as_str(), "http://localhost:5001/sse");
        assert_eq!(transport.endpoint("/").unwrap().as_str(), "http://localhost:5001/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpTransport::new("not a url", Duration::from_secs(5)),
            Err(McpHealthError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connect_error() {
        // bind then drop to get a port nobody listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport =
            HttpTransport::new(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2)).unwrap();
        let url = transport.endpoint("/sse").unwrap();
        let result = transport
            .open(OpenRequest::get(url, event_stream_headers(), Duration::from_secs(2)))
            .await;
        assert!(matches!(result, Err(McpHealthError::Connect { .. })));
    }
}
