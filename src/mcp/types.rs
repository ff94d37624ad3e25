use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }

    /// `initialize` request declaring the protocol revision and client identity.
    pub fn initialize(id: u64, protocol_version: &str, client: &ClientInfo) -> Self {
        Self::new(
            id,
            "initialize",
            json!({
                "protocolVersion": protocol_version,
                "capabilities": {
                    "roots": { "listChanged": false }
                },
                "clientInfo": client,
            }),
        )
    }

    /// `tools/call` request with empty arguments.
    pub fn tool_call(id: u64, tool_name: &str) -> Self {
        Self::new(
            id,
            "tools/call",
            json!({
                "name": tool_name,
                "arguments": {}
            }),
        )
    }
}

/// A JSON-RPC 2.0 notification (no id, no response expected).
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
        }
    }

    pub fn initialized() -> Self {
        Self::new("notifications/initialized")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Shape of a decoded JSON value as seen by the JSON-RPC layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Notification,
    Response,
    Invalid,
}

impl MessageKind {
    pub fn of(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return MessageKind::Invalid;
        };
        if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
            return MessageKind::Invalid;
        }

        let has_id = obj.contains_key("id");
        if obj.contains_key("method") {
            return if has_id {
                MessageKind::Request
            } else {
                MessageKind::Notification
            };
        }

        match (has_id, obj.contains_key("result"), obj.contains_key("error")) {
            (true, true, false) | (true, false, true) => MessageKind::Response,
            _ => MessageKind::Invalid,
        }
    }
}

/// Opaque session identifier issued by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Most-decoded form of a correlated reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Payload unwrapped from the tool result envelope.
    Decoded(Value),
    /// The JSON-RPC response as received.
    RawOuter(Value),
    /// Frame data that was not JSON at all.
    RawText(String),
}

impl ToolOutput {
    /// JSON-RPC `error` member, if the outer response carried one.
    pub fn rpc_error(&self) -> Option<&Value> {
        match self {
            ToolOutput::RawOuter(message) => message.get("error"),
            _ => None,
        }
    }
}
