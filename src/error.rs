use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum McpHealthError {
    /// Opening the transport failed: refused, timed out or non-2xx.
    Connect {
        url: String,
        reason: String,
    },
    SessionNotFound(String),
    RequestFailed {
        method: String,
        reason: String,
    },
    NoResponse(String),
    ConfigError(String),
    NetworkError(reqwest::Error),
    /// A stream read stalled for the given time.
    Timeout(Duration),
    IoError(std::io::Error),
    Other(String),
}

impl McpHealthError {
    pub fn connect(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        McpHealthError::Connect {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn request_failed(method: impl Into<String>, reason: impl fmt::Display) -> Self {
        McpHealthError::RequestFailed {
            method: method.into(),
            reason: reason.to_string(),
        }
    }

    /// Re-tag a transport failure on an in-session request as `RequestFailed`.
    pub fn into_request_failure(self, method: &str) -> Self {
        match self {
            McpHealthError::Connect { reason, .. } => McpHealthError::request_failed(method, reason),
            other => other,
        }
    }
}

impl fmt::Display for McpHealthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McpHealthError::Connect { url, reason } => {
                write!(f, "Failed to connect to {}: {}", url, reason)
            }
            McpHealthError::SessionNotFound(msg) => {
                write!(f, "Failed to get session ID from SSE: {}", msg)
            }
            McpHealthError::RequestFailed { method, reason } => {
                write!(f, "Request '{}' failed: {}", method, reason)
            }
            McpHealthError::NoResponse(msg) => write!(f, "No response received ({})", msg),
            McpHealthError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            McpHealthError::NetworkError(e) => write!(f, "Network error: {}", e),
            McpHealthError::Timeout(waited) => {
                write!(f, "Timed out after {} without data", describe_duration(*waited))
            }
            McpHealthError::IoError(e) => write!(f, "IO error: {}", e),
            McpHealthError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for McpHealthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            McpHealthError::NetworkError(e) => Some(e),
            McpHealthError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for McpHealthError {
    fn from(err: reqwest::Error) -> Self {
        McpHealthError::NetworkError(err)
    }
}

impl From<std::io::Error> for McpHealthError {
    fn from(err: std::io::Error) -> Self {
        McpHealthError::IoError(err)
    }
}

impl From<anyhow::Error> for McpHealthError {
    fn from(err: anyhow::Error) -> Self {
        McpHealthError::Other(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, McpHealthError>;

/// Whole seconds when exact, milliseconds otherwise.
pub fn describe_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        format!("{} seconds", duration.as_secs())
    } else {
        format!("{} ms", duration.as_millis())
    }
}
