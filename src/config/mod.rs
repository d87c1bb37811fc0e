//! Configuration module
//!
//! - types/mod.rs: configuration types (Config, McpConfig, GatewayConfig, ...)
//! - io.rs: loading from files and environment variables
//! - validation.rs: configuration validation
//! - paths.rs: configuration file paths

mod io;
mod paths;
mod types;
mod validation;

pub use types::{
    AgentConfig, Config, GatewayConfig, McpConfig, McpServerConfig, OsqueryConfig, SkillsConfig,
    ToolSkillConfig,
};

pub use io::{apply_env_overrides, load_config, load_config_from_path};
pub use paths::{config_dir, config_path};
pub use validation::{validate_config, ConfigValidationResult, ValidationIssue};
