mod defaults;
mod server;
mod validation;

use crate::cli::Args;
use crate::error::{McpHealthError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use defaults::{
    default_call_timeout, default_connect_timeout, default_host, default_initialize_timeout,
    default_port, default_tool_name,
};
pub use server::{ServerConfig, TimeoutsConfig, ToolConfig};
pub use validation::{expand_env_var_in_string, parse_bool, parse_timeout_secs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub connect_timeout: u64,
    pub call_timeout: u64,
    pub tool_name: String,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout: default_connect_timeout(),
            call_timeout: default_call_timeout(),
            tool_name: default_tool_name(),
            verbose: false,
        }
    }
}

/// On-disk configuration, YAML or JSON.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub timeouts: TimeoutsConfig,
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub verbose: Option<bool>,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = FileConfig::load()?;
        Self::resolve(args, |name| env::var(name).ok(), &file_config)
    }

    /// Merge settings with precedence CLI > environment > file > defaults.
    pub fn resolve(
        args: &Args,
        env_lookup: impl Fn(&str) -> Option<String>,
        file: &FileConfig,
    ) -> Result<Self> {
        let expand = |value: String| expand_env_var_in_string(&value, &env_lookup);

        let host = args
            .host
            .clone()
            .or_else(|| env_lookup("MCP_HEALTH_HOST"))
            .or_else(|| file.server.host.clone().map(expand))
            .unwrap_or_else(default_host);
        if host.trim().is_empty() {
            return Err(McpHealthError::ConfigError("host must not be empty".to_string()));
        }

        let port = args
            .port
            .or_else(|| env_lookup("MCP_HEALTH_PORT").and_then(|p| p.trim().parse().ok()))
            .or(file.server.port)
            .unwrap_or_else(default_port);

        let connect_timeout = args
            .connect_timeout
            .or_else(|| env_lookup("MCP_HEALTH_CONNECT_TIMEOUT").and_then(|v| parse_timeout_secs(&v)))
            .or(file.timeouts.connect)
            .unwrap_or_else(default_connect_timeout);

        let call_timeout = args
            .call_timeout
            .or_else(|| env_lookup("MCP_HEALTH_CALL_TIMEOUT").and_then(|v| parse_timeout_secs(&v)))
            .or(file.timeouts.call)
            .unwrap_or_else(default_call_timeout);

        if connect_timeout == 0 || call_timeout == 0 {
            return Err(McpHealthError::ConfigError(
                "timeouts must be at least one second".to_string(),
            ));
        }

        let tool_name = args
            .tool
            .clone()
            .or_else(|| env_lookup("MCP_HEALTH_TOOL"))
            .or_else(|| file.tool.name.clone().map(expand))
            .unwrap_or_else(default_tool_name);

        let verbose = args.verbose
            || env_lookup("MCP_HEALTH_VERBOSE")
                .and_then(|v| parse_bool(&v))
                .or(file.verbose)
                .unwrap_or(false);

        Ok(Config {
            host,
            port,
            connect_timeout,
            call_timeout,
            tool_name,
            verbose,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout)
    }

    pub fn initialize_timeout(&self) -> Duration {
        Duration::from_secs(default_initialize_timeout().max(self.connect_timeout))
    }
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Ok(Self::load_from(&path)?);
            }
        }

        // No config file found, return default
        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );

        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Current directory (local override)
        paths.push(PathBuf::from(".mcp-health.yaml"));
        paths.push(PathBuf::from(".mcp-health.yml"));
        paths.push(PathBuf::from(".mcp-health.json"));

        // 2. User's config directory
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("mcp-health");
            paths.push(config_dir.join("mcp-health.yaml"));
            paths.push(config_dir.join("mcp-health.yml"));
            paths.push(config_dir.join("mcp-health.json"));
        }

        paths
    }
}
