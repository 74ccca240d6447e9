//! Service configuration loaded from environment variables.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Completion service configuration
    pub llm: LlmConfig,

    /// Chat loop configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// MCP tool servers
    #[serde(default)]
    pub mcp: McpConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// API key for the completion service
    pub api_key: SecretString,

    /// OpenAI-compatible base URL
    #[serde(default = "default_llm_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout
    #[serde(default = "default_llm_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Model round-trips allowed per chat
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McpConfig {
    /// Comma-separated `name=url` pairs
    #[serde(default)]
    pub servers: String,

    /// Per-call tool timeout
    #[serde(default = "default_tool_timeout", with = "humantime_serde")]
    pub tool_timeout: Duration,

    /// Tool output is truncated past this many bytes
    #[serde(default = "default_max_response_len")]
    pub max_response_len: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Global requests per minute
    #[serde(default = "default_global_rpm")]
    pub global_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl McpConfig {
    /// Configured servers as `(name, url)` pairs, in the order given.
    ///
    /// Blank entries are ignored; an entry without `=` or with an empty side
    /// is an error.
    pub fn servers(&self) -> Result<Vec<(String, String)>> {
        self.servers
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (name, url) = entry
                    .split_once('=')
                    .with_context(|| format!("MCP server entry '{entry}' is not name=url"))?;
                let (name, url) = (name.trim(), url.trim());
                if name.is_empty() || url.is_empty() {
                    anyhow::bail!("MCP server entry '{entry}' has an empty name or url");
                }
                Ok((name.to_string(), url.to_string()))
            })
            .collect()
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: default_max_tool_iterations(),
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            servers: String::new(),
            tool_timeout: default_tool_timeout(),
            max_response_len: default_max_response_len(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            global_per_minute: default_global_rpm(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_llm_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_llm_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_max_tool_iterations() -> usize {
    5
}

fn default_tool_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_response_len() -> usize {
    4000
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_global_rpm() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcp(servers: &str) -> McpConfig {
        McpConfig {
            servers: servers.into(),
            ..McpConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let mcp = McpConfig::default();
        assert_eq!(mcp.tool_timeout, Duration::from_secs(10));
        assert_eq!(mcp.max_response_len, 4000);
        assert_eq!(ChatConfig::default().max_tool_iterations, 5);
        assert_eq!(ServerConfig::default().port, 8080);
        assert_eq!(RateLimitConfig::default().global_per_minute, 60);
    }

    #[test]
    fn test_servers_parsed_in_order() {
        let servers = mcp("calc=http://localhost:8000/mcp, weather = http://w:9000/mcp")
            .servers()
            .unwrap();
        assert_eq!(
            servers,
            vec![
                ("calc".to_string(), "http://localhost:8000/mcp".to_string()),
                ("weather".to_string(), "http://w:9000/mcp".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_servers() {
        assert!(mcp("").servers().unwrap().is_empty());
        assert!(mcp(" , ").servers().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_server_entry() {
        assert!(mcp("calc").servers().is_err());
        assert!(mcp("=http://x").servers().is_err());
        assert!(mcp("calc=").servers().is_err());
    }
}
