//! Legacy HTTP+SSE transport: one long-lived event stream carries the
//! session announcement and, later, the reply to the call posted to the
//! session-scoped endpoint.
//!
//! The reply is read from the same stream that announced the session. This
//! relies on the server routing the session's traffic to that stream; it is
//! not something the transport guarantees when several sessions share a
//! server.

use crate::config::Config;
use crate::error::Result;
use crate::mcp::correlate::{await_response, Correlator};
use crate::mcp::session::resolve_session;
use crate::mcp::sse::FieldStyle;
use crate::mcp::stream::ResponseFrames;
use crate::mcp::transport::{event_stream_headers, message_headers, HttpTransport, OpenRequest};
use crate::mcp::types::{JsonRpcRequest, SessionId, ToolOutput};
use crate::ui::output;
use reqwest::Url;

pub const SSE_PATH: &str = "/sse";
pub const MESSAGE_PATH: &str = "/message";
pub const MESSAGE_EVENT: &str = "message";
pub const CALL_ID: u64 = 1;

pub struct SseClient {
    transport: HttpTransport,
    config: Config,
}

impl SseClient {
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config.base_url(), config.connect_timeout())?;
        Ok(Self { transport, config })
    }

    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    /// Open the bootstrap stream. Failure here is fatal for the run.
    pub async fn open_stream(&self) -> Result<ResponseFrames> {
        let url = self.transport.endpoint(SSE_PATH)?;
        let response = self
            .transport
            .open(OpenRequest::get(
                url,
                event_stream_headers(),
                self.config.connect_timeout(),
            ))
            .await?;

        Ok(ResponseFrames::from_response(
            response,
            FieldStyle::Trimmed,
            self.config.connect_timeout(),
        ))
    }

    pub fn message_url(&self, session: &SessionId) -> Result<Url> {
        let mut url = self.transport.endpoint(MESSAGE_PATH)?;
        url.query_pairs_mut().append_pair("sessionId", session.as_str());
        Ok(url)
    }

    /// POST the tool call to the session endpoint. The server acknowledges
    /// here and delivers the reply on the event stream.
    pub async fn post_call(&self, session: &SessionId) -> Result<reqwest::StatusCode> {
        let request = JsonRpcRequest::tool_call(CALL_ID, &self.config.tool_name);
        let url = self.message_url(session)?;
        let response = self
            .transport
            .open(OpenRequest::post(
                url,
                message_headers(),
                &request,
                self.config.connect_timeout(),
            ))
            .await
            .map_err(|e| e.into_request_failure(&request.method))?;

        Ok(response.status())
    }
}

/// Run the full legacy flow and return the correlated reply.
pub async fn run(config: &Config) -> Result<ToolOutput> {
    let client = SseClient::new(config.clone())?;

    output::info(&format!("Connecting to MCP server at {}...", config.base_url()));
    println!();

    let mut frames = client.open_stream().await?;

    let session = resolve_session(&mut frames, client.base_url(), config.connect_timeout()).await?;
    output::success(&format!("Session established: {}", session));
    println!();

    output::info("Requesting system health...");
    let status = client.post_call(&session).await?;
    output::info(&format!("Request status: {}", status.as_u16()));
    println!();

    output::info("Reading response from SSE stream...");
    println!();

    frames.set_read_timeout(config.call_timeout());
    let correlator = Correlator::new()
        .after_event(MESSAGE_EVENT)
        .expecting_id(CALL_ID);
    let result = await_response(&mut frames, correlator, config.call_timeout()).await;
    drop(frames);

    result
}
