//! MCP-to-Skill bridge
//!
//! Adapts one tool on one MCP server into the dispatcher's `Skill` trait.
//! The skill matches goals by prefix, keyword or custom predicate, turns the
//! goal into tool arguments and reports the tool's text output.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use super::client::McpClient;
use super::protocol::ToolCall;
use crate::config::ToolSkillConfig;
use crate::skills::{ActionResult, Skill};

/// Extra match test, given the lowercased goal
pub type GoalMatcher = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Builds tool arguments from the query text
pub type ArgumentBuilder = Box<dyn Fn(&str) -> Map<String, Value> + Send + Sync>;

/// Output used when a tool answers with no content at all
pub const NO_CONTENT: &str = "No content returned";

/// Skill backed by a single MCP tool
pub struct McpToolSkill {
    name: String,
    description: String,
    client: Arc<McpClient>,
    server: String,
    tool: String,
    prefix: Option<String>,
    keywords: Vec<String>,
    matcher: Option<GoalMatcher>,
    arguments: ArgumentBuilder,
}

impl McpToolSkill {
    /// Skill calling `tool` on `server`, passing the query as `query`
    pub fn new(
        name: impl Into<String>,
        client: Arc<McpClient>,
        server: impl Into<String>,
        tool: impl Into<String>,
    ) -> Self {
        let server = server.into();
        let tool = tool.into();
        McpToolSkill {
            name: name.into(),
            description: format!("Call MCP tool '{}' on server '{}'", tool, server),
            client,
            server,
            tool,
            prefix: None,
            keywords: Vec::new(),
            matcher: None,
            arguments: single_argument("query"),
        }
    }

    /// Skill for a server whose configuration carries a `skill` section
    pub fn from_config(server: &str, config: &ToolSkillConfig, client: Arc<McpClient>) -> Self {
        let mut skill = McpToolSkill::new(server, client, server, &config.tool)
            .with_keywords(config.keywords.iter().cloned())
            .with_arguments(single_argument(&config.argument));
        if let Some(prefix) = &config.prefix {
            skill = skill.with_prefix(prefix);
        }
        if let Some(description) = &config.description {
            skill = skill.with_description(description);
        }
        skill
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Goals starting with `prefix` (case-insensitive) match, and the prefix
    /// is stripped before building arguments
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Goals containing any of these (case-insensitive) match
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.into().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    pub fn with_matcher(mut self, matcher: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    pub fn with_arguments(
        mut self,
        builder: impl Fn(&str) -> Map<String, Value> + Send + Sync + 'static,
    ) -> Self {
        self.arguments = Box::new(builder);
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Remainder after the prefix if the goal carries it, otherwise the goal
    pub fn query<'a>(&self, goal: &'a str) -> &'a str {
        match &self.prefix {
            Some(prefix) if has_prefix(goal, prefix) => goal[prefix.len()..].trim(),
            _ => goal,
        }
    }

    fn triggers(&self, goal: &str) -> bool {
        if let Some(prefix) = &self.prefix {
            if has_prefix(goal, prefix) {
                return true;
            }
        }
        let lower = goal.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
            || self.matcher.as_ref().is_some_and(|m| m(&lower))
    }
}

impl std::fmt::Debug for McpToolSkill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpToolSkill")
            .field("name", &self.name)
            .field("server", &self.server)
            .field("tool", &self.tool)
            .field("prefix", &self.prefix)
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}

fn has_prefix(goal: &str, prefix: &str) -> bool {
    goal.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Argument builder putting the whole query under one key
pub fn single_argument(key: &str) -> ArgumentBuilder {
    let key = key.to_string();
    Box::new(move |query| {
        let mut args = Map::new();
        args.insert(key.clone(), Value::String(query.to_string()));
        args
    })
}

#[async_trait]
impl Skill for McpToolSkill {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn can_handle(&self, goal: &str) -> bool {
        !goal.trim().is_empty() && self.client.is_connected(&self.server) && self.triggers(goal)
    }

    async fn execute(&self, goal: &str) -> ActionResult {
        let query = self.query(goal);
        let call = ToolCall {
            name: self.tool.clone(),
            arguments: (self.arguments)(query),
        };
        debug!(server = %self.server, tool = %self.tool, "Calling MCP tool for goal");

        match self.client.call_tool(&self.server, &call).await {
            Ok(result) => {
                let output = if result.content.is_empty() {
                    NO_CONTENT.to_string()
                } else {
                    result.text()
                };
                if result.is_error {
                    ActionResult::failure(&self.name, output)
                } else {
                    ActionResult::success(&self.name, output)
                }
            }
            Err(e) => {
                warn!(server = %self.server, tool = %self.tool, "MCP tool call failed: {}", e);
                ActionResult::failure(&self.name, format!("Error: {}", e))
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::mcp::test_support::{sh_args, FAKE_SERVER};

    async fn client() -> Arc<McpClient> {
        let client = Arc::new(McpClient::default());
        client
            .connect_server("fake", "sh", &sh_args(FAKE_SERVER))
            .await
            .unwrap();
        client
    }

    #[tokio::test]
    async fn test_prefix_and_keywords_trigger() {
        let skill = McpToolSkill::new("fake", client().await, "fake", "echo")
            .with_prefix("fake:")
            .with_keywords(["Ping Me"]);

        assert!(skill.can_handle("FAKE: anything"));
        assert!(skill.can_handle("please ping me now"));
        assert!(!skill.can_handle("unrelated"));
        assert!(!skill.can_handle("   "));
        assert_eq!(skill.query("Fake:  hello "), "hello");
        assert_eq!(skill.query("ping me"), "ping me");
    }

    #[tokio::test]
    async fn test_matcher_sees_lowercased_goal() {
        let skill = McpToolSkill::new("fake", client().await, "fake", "echo")
            .with_matcher(|g| g.contains("what is the") && g.contains("computer"));
        assert!(skill.can_handle("What is the Computer called?"));
        assert!(!skill.can_handle("what is the time"));
    }

    #[tokio::test]
    async fn test_not_connected_never_handles() {
        let client = Arc::new(McpClient::default());
        let skill = McpToolSkill::new("ghost", client, "ghost", "echo").with_prefix("ghost:");
        assert!(!skill.can_handle("ghost: boo"));

        let result = skill.execute("ghost: boo").await;
        assert!(!result.success);
        assert!(result.output.starts_with("Error: "));
        assert!(result.output.contains("ghost"));
    }

    #[tokio::test]
    async fn test_execute_passes_built_arguments() {
        let skill = McpToolSkill::new("fake", client().await, "fake", "echo")
            .with_prefix("fake:")
            .with_arguments(single_argument("text"));

        let result = skill.execute("fake: hello there").await;
        assert!(result.success);
        assert_eq!(result.skill_name, "fake");
        assert!(result.output.contains(r#""arguments":{"text":"hello there"}"#));
    }

    #[tokio::test]
    async fn test_text_chunks_joined_in_order() {
        let skill = McpToolSkill::new("fake", client().await, "fake", "chunks");
        let result = skill.execute("anything").await;
        assert!(result.success);
        let lines: Vec<&str> = result.output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("reply-"));
        assert_eq!(lines[1], "done");
    }

    #[tokio::test]
    async fn test_tool_error_becomes_failure() {
        let skill = McpToolSkill::new("fake", client().await, "fake", "fail");
        let result = skill.execute("anything").await;
        assert!(!result.success);
        assert_eq!(result.output, "Error: boom");
    }

    #[test]
    fn test_from_config() {
        let config = ToolSkillConfig {
            tool: "search_docs".to_string(),
            argument: "q".to_string(),
            prefix: Some("docs:".to_string()),
            keywords: vec!["documentation".to_string()],
            description: None,
        };
        let skill = McpToolSkill::from_config("docs", &config, Arc::new(McpClient::default()));
        assert_eq!(skill.name(), "docs");
        assert_eq!(skill.tool(), "search_docs");
        assert_eq!(skill.query("DOCS: tokio"), "tokio");
        assert_eq!((skill.arguments)("x")["q"], "x");
    }
}
