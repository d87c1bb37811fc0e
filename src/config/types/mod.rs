//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// MCP client and tool server configuration
    #[serde(default)]
    pub mcp: McpConfig,

    /// Built-in skill configuration
    #[serde(default)]
    pub skills: SkillsConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load configuration from the config file and environment
    ///
    /// 1. Default values
    /// 2. Config file (if present)
    /// 3. Environment variable overrides
    pub fn from_env() -> crate::error::Result<Self> {
        crate::config::load_config()
    }
}

/// Agent-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Name sent as `clientInfo.name` in the MCP handshake
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            client_name: default_client_name(),
            verbose: false,
        }
    }
}

fn default_client_name() -> String {
    crate::NAME.to_string()
}

/// MCP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Bound on the handshake and every request; `null` waits forever
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
    /// Tool servers keyed by the name they are registered under
    #[serde(default)]
    pub servers: HashMap<String, McpServerConfig>,
}

impl Default for McpConfig {
    fn default() -> Self {
        McpConfig {
            request_timeout: default_request_timeout(),
            servers: HashMap::new(),
        }
    }
}

impl McpConfig {
    /// Request timeout with a zero duration treated as unbounded
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.request_timeout.filter(|t| !t.is_zero())
    }
}

fn default_request_timeout() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

/// One tool server process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Executable to launch
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables for the child process
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Expose one of the server's tools as a skill
    #[serde(default)]
    pub skill: Option<ToolSkillConfig>,
}

/// Generic tool-backed skill declared alongside a server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSkillConfig {
    /// Tool to call
    pub tool: String,
    /// Argument name carrying the goal text
    #[serde(default = "default_argument")]
    pub argument: String,
    /// Goals starting with this prefix match; it is stripped from the query
    #[serde(default)]
    pub prefix: Option<String>,
    /// Goals containing any of these match
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_argument() -> String {
    "query".to_string()
}

/// Built-in skill configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillsConfig {
    #[serde(default)]
    pub osquery: OsqueryConfig,
}

/// Osquery MCP server launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsqueryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_osquery_command")]
    pub command: String,
    #[serde(default = "default_osquery_args")]
    pub args: Vec<String>,
}

impl Default for OsqueryConfig {
    fn default() -> Self {
        OsqueryConfig {
            enabled: false,
            command: default_osquery_command(),
            args: default_osquery_args(),
        }
    }
}

fn default_osquery_command() -> String {
    "npx".to_string()
}

fn default_osquery_args() -> Vec<String> {
    vec![
        "-y".to_string(),
        "@modelcontextprotocol/server-osquery".to_string(),
    ]
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bind address
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

impl GatewayConfig {
    /// `bind:port` socket address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn default_port() -> u16 {
    8080
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_true() -> bool {
    true
}
