//! Osquery skill preset
//!
//! Routes system questions to the `query_osquery` tool of an osquery MCP
//! server, translating a few common phrasings into SQL.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::mcp::{McpClient, McpToolSkill};

/// Server name the osquery MCP server is registered under
pub const SERVER_NAME: &str = "osquery";
/// Skill name reported in results
pub const SKILL_NAME: &str = "osquery";
/// The only tool the osquery server exposes
pub const TOOL_NAME: &str = "query_osquery";

const PREFIX: &str = "osquery:";

const KEYWORDS: &[&str] = &[
    "system info",
    "running process",
    "network connection",
    "list users",
    "system query",
    "hostname",
];

/// Build the osquery skill on top of a shared client
pub fn osquery_skill(client: Arc<McpClient>) -> McpToolSkill {
    McpToolSkill::new(SKILL_NAME, client, SERVER_NAME, TOOL_NAME)
        .with_description(
            "Query system information through osquery. Example: 'osquery: list running processes'",
        )
        .with_prefix(PREFIX)
        .with_keywords(KEYWORDS.iter().copied())
        .with_matcher(|g| g.contains("what is the") && (g.contains("system") || g.contains("computer")))
        .with_arguments(sql_arguments)
}

/// SQL for a natural-language query; unrecognized text is passed through as-is
pub fn build_sql(query: &str) -> String {
    let q = query.to_lowercase();
    let sql = if q.contains("process") {
        "SELECT pid, name, path, cmdline FROM processes LIMIT 20"
    } else if q.contains("system info") || q.contains("system_info") {
        "SELECT * FROM system_info"
    } else if q.contains("hostname") {
        "SELECT hostname FROM system_info"
    } else if q.contains("network") || q.contains("connection") {
        "SELECT pid, local_address, local_port, remote_address, remote_port, state \
         FROM process_open_sockets LIMIT 20"
    } else if q.contains("user") {
        "SELECT uid, username, shell FROM users"
    } else {
        return query.to_string();
    };
    sql.to_string()
}

fn sql_arguments(query: &str) -> Map<String, Value> {
    let mut args = Map::new();
    args.insert("sql".to_string(), Value::String(build_sql(query)));
    args
}
