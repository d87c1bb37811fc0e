//! Configuration I/O - Loading configuration
//!
//! Handles reading configuration from files and environment variables.

use std::path::Path;
use std::time::Duration;

use super::types::Config;
use crate::error::{Error, Result};

/// Load configuration with layered precedence:
/// 1. Config file (config.json) if it exists, otherwise defaults
/// 2. Environment variable overrides (`.env` is loaded first)
pub fn load_config() -> Result<Config> {
    let config_path = super::paths::config_path();

    let mut config = if config_path.exists() {
        load_config_from_path(&config_path)?
    } else {
        Config::default()
    };

    // Apply environment variable overrides (highest precedence)
    apply_env_overrides(&mut config);

    Ok(config)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    // Detect format by extension
    let config: Config = if path.extension().is_some_and(|ext| ext == "json") {
        json5::from_str(&content)?
    } else if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content)?
    } else {
        // Try JSON5 first, then TOML
        match json5::from_str(&content) {
            Ok(config) => config,
            Err(_) => toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?,
        }
    };

    Ok(config)
}

/// Apply environment variable overrides to an existing config.
///
/// Loads `.env` if present, then overlays any set `SKILLBRIDGE_*`
/// variables. Unparseable values are ignored.
pub fn apply_env_overrides(config: &mut Config) {
    dotenvy::dotenv().ok();
    apply_overrides(config, |key| std::env::var(key).ok());
}

fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(name) = var("SKILLBRIDGE_CLIENT_NAME") {
        config.agent.client_name = name;
    }

    // MCP overrides
    if let Some(secs) = var("SKILLBRIDGE_MCP_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
        config.mcp.request_timeout = Some(Duration::from_secs(secs));
    }

    // Osquery overrides
    if let Some(v) = var("SKILLBRIDGE_OSQUERY_ENABLED") {
        config.skills.osquery.enabled = v == "true" || v == "1";
    }
    if let Some(command) = var("SKILLBRIDGE_OSQUERY_COMMAND") {
        config.skills.osquery.command = command;
    }
    if let Some(args) = var("SKILLBRIDGE_OSQUERY_ARGS") {
        config.skills.osquery.args = args.split_whitespace().map(String::from).collect();
    }

    // Gateway overrides
    if let Some(bind) = var("SKILLBRIDGE_GATEWAY_BIND") {
        config.gateway.bind = bind;
    }
    if let Some(port) = var("SKILLBRIDGE_GATEWAY_PORT").and_then(|v| v.parse().ok()) {
        config.gateway.port = port;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn overrides(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut config = Config::default();
        apply_overrides(&mut config, |key| vars.get(key).cloned());
        config
    }

    #[test]
    fn test_load_json5_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                // comments are allowed
                mcp: {
                    request_timeout: "5s",
                    servers: {
                        docs: { command: "mcp-docs", args: ["--stdio"], skill: { tool: "search", prefix: "docs:" } },
                    },
                },
                gateway: { port: 9000 },
            }"#,
        )
        .unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.mcp.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.mcp.servers["docs"].args, vec!["--stdio"]);
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.bind, "127.0.0.1");
    }

    #[test]
    fn test_load_toml_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[skills.osquery]
enabled = true
command = "python3"
args = ["osquery-mcp-server.py"]

[mcp.servers.fs]
command = "mcp-fs"
enabled = false
"#,
        )
        .unwrap();

        let config = load_config_from_path(&path).unwrap();
        assert!(config.skills.osquery.enabled);
        assert_eq!(config.skills.osquery.args, vec!["osquery-mcp-server.py"]);
        assert!(!config.mcp.servers["fs"].enabled);
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ mcp: ").unwrap();
        assert!(matches!(
            load_config_from_path(&path),
            Err(Error::Config(msg)) if msg.starts_with("Invalid JSON config")
        ));

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[mcp\n").unwrap();
        assert!(matches!(
            load_config_from_path(&path),
            Err(Error::Config(msg)) if msg.starts_with("Invalid TOML config")
        ));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_config_from_path(&missing), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let config = overrides(&[
            ("SKILLBRIDGE_MCP_TIMEOUT_SECS", "12"),
            ("SKILLBRIDGE_OSQUERY_ENABLED", "1"),
            ("SKILLBRIDGE_OSQUERY_ARGS", "  osquery-mcp-server.py   --verbose "),
            ("SKILLBRIDGE_GATEWAY_PORT", "9100"),
            ("SKILLBRIDGE_CLIENT_NAME", "demo"),
        ]);
        assert_eq!(config.mcp.request_timeout, Some(Duration::from_secs(12)));
        assert!(config.skills.osquery.enabled);
        assert_eq!(config.skills.osquery.args, vec!["osquery-mcp-server.py", "--verbose"]);
        assert_eq!(config.gateway.port, 9100);
        assert_eq!(config.agent.client_name, "demo");
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let config = overrides(&[
            ("SKILLBRIDGE_MCP_TIMEOUT_SECS", "soon"),
            ("SKILLBRIDGE_GATEWAY_PORT", "99999"),
        ]);
        assert_eq!(config.mcp.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.gateway.port, 8080);
    }
}
