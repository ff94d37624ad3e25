//! Streamable HTTP transport (protocol revision 2025-06-18).
//!
//! Every step is its own POST to the server root. A reply is either a single
//! JSON body or an SSE stream, chosen by the server per request.

use crate::config::Config;
use crate::error::{describe_duration, McpHealthError, Result};
use crate::mcp::correlate::{await_response, correlate, Correlator};
use crate::mcp::sse::{FieldStyle, SseFrame};
use crate::mcp::stream::ResponseFrames;
use crate::mcp::transport::{
    content_type, session_header, streamable_headers, HttpTransport, OpenRequest, PROTOCOL_VERSION,
};
use crate::mcp::types::{ClientInfo, JsonRpcNotification, JsonRpcRequest, SessionId, ToolOutput};
use crate::ui::output;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use tokio::time::{timeout, Duration};

pub const MCP_PATH: &str = "/";
pub const INITIALIZE_ID: u64 = 1;
pub const CALL_ID: u64 = 2;

/// Outcome of one request/response step.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub output: ToolOutput,
}

pub struct StreamableClient {
    transport: HttpTransport,
    session: Option<SessionId>,
    client_info: ClientInfo,
}

impl StreamableClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            transport,
            session: None,
            client_info: ClientInfo::default(),
        }
    }

    pub fn session(&self) -> Option<&SessionId> {
        self.session.as_ref()
    }

    async fn post<B: Serialize + ?Sized>(&self, body: &B, limit: Duration) -> Result<Response> {
        let url = self.transport.endpoint(MCP_PATH)?;
        let headers = streamable_headers(self.session.as_ref())?;
        self.transport
            .open(OpenRequest::post(url, headers, body, limit))
            .await
    }

    /// Send `initialize` and capture the session id, if the server issues one.
    pub async fn initialize(&mut self, limit: Duration) -> Result<Exchange> {
        let request = JsonRpcRequest::initialize(INITIALIZE_ID, PROTOCOL_VERSION, &self.client_info);
        let response = self.post(&request, limit).await?;

        if self.session.is_none() {
            self.session = session_header(&response);
            match &self.session {
                Some(id) => tracing::debug!(session = %id, "captured session id"),
                None => tracing::debug!("server issued no session id"),
            }
        }

        read_exchange(response, limit, INITIALIZE_ID).await
    }

    /// Send `notifications/initialized`; servers answer 202 with no body.
    pub async fn notify_initialized(&self, limit: Duration) -> Result<StatusCode> {
        let notification = JsonRpcNotification::initialized();
        let response = self
            .post(&notification, limit)
            .await
            .map_err(|e| e.into_request_failure(&notification.method))?;
        Ok(response.status())
    }

    pub async fn call_tool(&self, tool_name: &str, limit: Duration) -> Result<Exchange> {
        let request = JsonRpcRequest::tool_call(CALL_ID, tool_name);
        let response = self
            .post(&request, limit)
            .await
            .map_err(|e| e.into_request_failure(&request.method))?;
        read_exchange(response, limit, CALL_ID).await
    }
}

fn is_json_body(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false)
}

/// Read one reply, as a single JSON body or as an event stream.
async fn read_exchange(response: Response, limit: Duration, id: u64) -> Result<Exchange> {
    let status = response.status();
    let content_type = content_type(&response).map(str::to_string);
    let correlator = Correlator::new().expecting_id(id);

    let output = if is_json_body(content_type.as_deref()) {
        let body = match timeout(limit, response.text()).await {
            Ok(body) => body?,
            Err(_) => {
                return Err(McpHealthError::NoResponse(format!(
                    "timeout, body not received within {}",
                    describe_duration(limit)
                )))
            }
        };
        correlate(std::iter::once(SseFrame::new(None, body)), correlator).ok_or_else(|| {
            McpHealthError::NoResponse("JSON body held no matching response".to_string())
        })?
    } else {
        let mut frames = ResponseFrames::from_response(response, FieldStyle::SingleSpace, limit);
        let output = await_response(&mut frames, correlator, limit).await;
        drop(frames);
        output?
    };

    Ok(Exchange {
        status,
        content_type,
        output,
    })
}

fn print_exchange_head(exchange: &Exchange) {
    output::success(&format!("Status: {}", exchange.status.as_u16()));
    output::success(&format!(
        "Content-Type: {}",
        exchange.content_type.as_deref().unwrap_or("(none)")
    ));
}

/// Run initialize → initialized → tools/call and return the tool reply.
pub async fn run(config: &Config) -> Result<ToolOutput> {
    let transport = HttpTransport::new(&config.base_url(), config.connect_timeout())?;
    let mut client = StreamableClient::new(transport);

    output::banner(&format!("MCP Streamable HTTP Test (Protocol {})", PROTOCOL_VERSION));
    output::info(&format!("Server: {}", config.base_url()));
    println!();

    output::step("Step 1: Initialize Session");
    let init = client.initialize(config.initialize_timeout()).await?;
    print_exchange_head(&init);
    match client.session() {
        Some(id) => output::success(&format!("Mcp-Session-Id: {}", id)),
        None => output::warning("No Mcp-Session-Id header (optional for stateless servers)"),
    }
    println!();
    output::info("Initialize Response:");
    output::print_tool_output(&init.output, "INITIALIZE RESPONSE");
    println!();

    output::step("Step 2: Send Initialized Notification");
    match client.notify_initialized(config.connect_timeout()).await {
        Ok(status) if status == StatusCode::ACCEPTED => output::success("Notification accepted: 202"),
        Ok(status) => output::warning(&format!("Unexpected status: {}", status.as_u16())),
        // a lost notification does not stop the check
        Err(e) => output::failure(&e),
    }
    println!();

    output::step(&format!("Step 3: Call {} Tool", config.tool_name));
    let call = client
        .call_tool(&config.tool_name, config.call_timeout())
        .await?;
    print_exchange_head(&call);
    println!();

    Ok(call.output)
}
