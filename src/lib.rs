//! # SkillBridge
//!
//! Routes free-text goals to pluggable skills, some of which are backed by
//! tools living in out-of-process MCP servers.
//!
//! ## Features
//!
//! - **MCP stdio client:** spawn tool servers, handshake, list and call tools
//!   over line-delimited JSON-RPC 2.0
//! - **First-match dispatch:** skills are asked in registration order and the
//!   first to accept a goal runs it
//! - **Built-in skills:** calculator, summarizer, mock weather and search,
//!   plus osquery and config-declared tool skills
//! - **HTTP gateway:** execute goals and inspect skills over JSON

pub mod config;
pub mod error;
pub mod gateway;
pub mod mcp;
pub mod runtime;
pub mod skills;

pub use config::Config;
pub use error::{Error, Result};
pub use runtime::AgentRuntime;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
