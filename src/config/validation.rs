//! Configuration validation
//!
//! Validates configuration and reports issues.

use super::types::Config;
use crate::skills::osquery::SERVER_NAME as OSQUERY_SERVER;

/// Result of configuration validation
#[derive(Debug, Clone)]
pub struct ConfigValidationResult {
    /// Whether the config is valid
    pub valid: bool,
    /// Validation errors (critical)
    pub errors: Vec<ValidationIssue>,
    /// Validation warnings (non-critical)
    pub warnings: Vec<ValidationIssue>,
}

impl ConfigValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        ConfigValidationResult {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn with_error(mut self, issue: ValidationIssue) -> Self {
        self.valid = false;
        self.errors.push(issue);
        self
    }

    /// Add a warning
    pub fn with_warning(mut self, issue: ValidationIssue) -> Self {
        self.warnings.push(issue);
        self
    }
}

/// A validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the config field
    pub path: String,
    /// Issue message
    pub message: String,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Validate the configuration
pub fn validate_config(config: &Config) -> ConfigValidationResult {
    let mut result = ConfigValidationResult::valid();

    result = validate_mcp_config(config, result);
    result = validate_osquery_config(config, result);
    result = validate_gateway_config(config, result);

    result
}

fn validate_mcp_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    if config.mcp.request_timeout.is_some_and(|t| t.is_zero()) {
        result = result.with_warning(
            ValidationIssue::new("mcp.request_timeout", "Zero timeout disables the request bound")
                .with_suggestion("Use null to wait forever explicitly, or a duration such as \"30s\""),
        );
    }

    let mut names: Vec<&String> = config.mcp.servers.keys().collect();
    names.sort();

    for name in names {
        let server = &config.mcp.servers[name];
        let path = format!("mcp.servers.{}", name);

        if server.command.trim().is_empty() {
            result = result.with_error(ValidationIssue::new(
                format!("{}.command", path),
                "Server command is empty",
            ));
        } else if server.enabled {
            result = check_command(&format!("{}.command", path), &server.command, result);
        }

        if let Some(skill) = &server.skill {
            if skill.tool.trim().is_empty() {
                result = result.with_error(
                    ValidationIssue::new(format!("{}.skill.tool", path), "Tool skill names no tool")
                        .with_suggestion("Run `skillbridge tools <server>` to see available tools"),
                );
            }
        }
    }

    result
}

fn validate_osquery_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    let osquery = &config.skills.osquery;
    if !osquery.enabled {
        return result;
    }

    if config
        .mcp
        .servers
        .get(OSQUERY_SERVER)
        .is_some_and(|server| server.enabled)
    {
        result = result.with_warning(
            ValidationIssue::new(
                "skills.osquery",
                format!(
                    "mcp.servers.{} is also enabled; the osquery skill starts a second process that replaces it",
                    OSQUERY_SERVER
                ),
            )
            .with_suggestion("Keep only one of skills.osquery and mcp.servers.osquery"),
        );
    }

    if osquery.command.trim().is_empty() {
        result = result.with_error(ValidationIssue::new(
            "skills.osquery.command",
            "Osquery skill is enabled but no command is set",
        ));
    } else {
        result = check_command("skills.osquery.command", &osquery.command, result);
    }

    result
}

fn validate_gateway_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    if config.gateway.port == 0 {
        result = result.with_error(
            ValidationIssue::new("gateway.port", "Gateway port must be non-zero")
                .with_suggestion("Set gateway.port or SKILLBRIDGE_GATEWAY_PORT"),
        );
    }

    result
}

fn check_command(path: &str, command: &str, result: ConfigValidationResult) -> ConfigValidationResult {
    if which::which(command).is_ok() {
        return result;
    }
    result.with_warning(
        ValidationIssue::new(path, format!("Command not found on PATH: {}", command))
            .with_suggestion("Install it or use an absolute path"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{McpServerConfig, ToolSkillConfig};
    use std::collections::HashMap;
    use std::time::Duration;

    fn server(command: &str) -> McpServerConfig {
        McpServerConfig {
            command: command.to_string(),
            args: Vec::new(),
            env: HashMap::new(),
            enabled: true,
            skill: None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        let result = validate_config(&Config::default());
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_empty_command_is_error() {
        let mut config = Config::default();
        config.mcp.servers.insert("broken".to_string(), server("  "));

        let result = validate_config(&config);
        assert!(!result.valid);
        assert_eq!(result.errors[0].path, "mcp.servers.broken.command");
    }

    #[test]
    fn test_missing_command_is_warning() {
        let mut config = Config::default();
        config
            .mcp
            .servers
            .insert("ghost".to_string(), server("skillbridge-no-such-command"));

        let result = validate_config(&config);
        assert!(result.valid);
        assert!(result.warnings[0].message.contains("skillbridge-no-such-command"));
    }

    #[test]
    fn test_empty_tool_and_port_zero() {
        let mut config = Config::default();
        let mut docs = server("/bin/sh");
        docs.skill = Some(ToolSkillConfig {
            tool: String::new(),
            argument: "query".to_string(),
            prefix: None,
            keywords: Vec::new(),
            description: None,
        });
        config.mcp.servers.insert("docs".to_string(), docs);
        config.gateway.port = 0;

        let result = validate_config(&config);
        let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["mcp.servers.docs.skill.tool", "gateway.port"]);
    }

    #[test]
    fn test_zero_timeout_warns() {
        let mut config = Config::default();
        config.mcp.request_timeout = Some(Duration::ZERO);
        let result = validate_config(&config);
        assert!(result.valid);
        assert_eq!(result.warnings[0].path, "mcp.request_timeout");
    }

    #[test]
    fn test_osquery_declared_twice_warns() {
        let mut config = Config::default();
        config.skills.osquery.enabled = true;
        config.skills.osquery.command = "/bin/sh".to_string();
        config.mcp.servers.insert("osquery".to_string(), server("/bin/sh"));

        let result = validate_config(&config);
        assert!(result.valid);
        let paths: Vec<&str> = result.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["skills.osquery"]);

        config.mcp.servers.get_mut("osquery").unwrap().enabled = false;
        assert!(validate_config(&config).warnings.is_empty());

        config.mcp.servers.get_mut("osquery").unwrap().enabled = true;
        config.skills.osquery.enabled = false;
        assert!(validate_config(&config).warnings.is_empty());
    }
}
