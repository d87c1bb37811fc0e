//! MCP (Model Context Protocol) module
//!
//! Provides integration with MCP servers, allowing skills to call tools
//! hosted by external processes that speak the Model Context Protocol over
//! stdio.
//!
//! ## Architecture
//!
//! - **transport**: one child process, line-framed JSON-RPC over its pipes
//! - **client**: registry of named servers, handshake and tool calls
//! - **protocol**: Wire protocol types (JSON-RPC based)
//! - **bridge**: Adapts one MCP tool into the `Skill` trait
//!
//! ## Usage
//!
//! ```rust,no_run
//! use skillbridge::mcp::{McpClient, ToolCall};
//!
//! # async fn example() -> skillbridge::Result<()> {
//! let client = McpClient::default();
//! client.connect_server("osquery", "npx", &["-y".into(), "@modelcontextprotocol/server-osquery".into()]).await?;
//!
//! let tools = client.list_tools("osquery").await?;
//!
//! let call = ToolCall::new("query_osquery").arg("sql", "SELECT * FROM system_info");
//! let result = client.call_tool("osquery", &call).await?;
//! println!("{}", result.text());
//! # Ok(())
//! # }
//! ```

mod bridge;
mod client;
mod protocol;
mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use bridge::{single_argument, ArgumentBuilder, GoalMatcher, McpToolSkill, NO_CONTENT};
pub use client::{ClientOptions, McpClient, ToolServer};
pub use protocol::{
    McpContent, McpError, McpRequest, McpResponse, McpTool, McpToolResult, ToolCall,
    PROTOCOL_VERSION,
};
pub use transport::StdioTransport;
