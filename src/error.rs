//! Error types for SkillBridge

use thiserror::Error;

/// Result type alias using SkillBridge's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for SkillBridge
///
/// Server-reported tool failures are not represented here: `tools/call`
/// errors come back as a [`McpToolResult`](crate::mcp::McpToolResult) with
/// `is_error` set.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tool server process could not be started
    #[error("Failed to spawn MCP server '{server}': {reason}")]
    Spawn { server: String, reason: String },

    /// Tool server rejected the initialize handshake
    #[error("MCP server '{server}' initialization failed: {message}")]
    InitializeFailed { server: String, message: String },

    /// No live transport is registered under this server name
    #[error("MCP server '{0}' is not connected")]
    NotConnected(String),

    /// Malformed, mismatched or missing message on the wire
    #[error("Protocol error from MCP server '{server}': {reason}")]
    Protocol { server: String, reason: String },

    /// Writing to the server failed or the transport is closed
    #[error("Transport error for MCP server '{server}': {reason}")]
    Transport { server: String, reason: String },

    /// Server answered `tools/list` with an error descriptor
    #[error("Failed to list tools on MCP server '{server}': {message}")]
    ToolListFailed { server: String, message: String },

    /// No response within the configured request timeout
    #[error("Timeout: MCP server '{server}' did not answer '{method}' within {timeout_ms}ms")]
    Timeout {
        server: String,
        method: String,
        timeout_ms: u64,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Name of the tool server involved, if any
    pub fn server(&self) -> Option<&str> {
        match self {
            Error::Spawn { server, .. }
            | Error::InitializeFailed { server, .. }
            | Error::Protocol { server, .. }
            | Error::Transport { server, .. }
            | Error::ToolListFailed { server, .. }
            | Error::Timeout { server, .. } => Some(server),
            Error::NotConnected(server) => Some(server),
            _ => None,
        }
    }
}

impl From<json5::Error> for Error {
    fn from(err: json5::Error) -> Self {
        Error::Config(format!("Invalid JSON config: {}", err))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(format!("Invalid TOML config: {}", err))
    }
}
