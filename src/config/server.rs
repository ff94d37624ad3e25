use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Timeouts in seconds.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TimeoutsConfig {
    #[serde(default)]
    pub connect: Option<u64>,
    #[serde(default)]
    pub call: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub name: Option<String>,
}
