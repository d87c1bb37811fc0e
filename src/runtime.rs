//! Agent runtime - wires configuration, tool servers and skills together

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::mcp::{ClientOptions, McpClient, McpToolSkill};
use crate::skills::{
    osquery, CalculatorSkill, ExecutionTrace, MockSearchSkill, SkillDispatcher, SummarizeSkill,
    WeatherSkill,
};

/// A started agent: one shared MCP client and the ordered skill set
pub struct AgentRuntime {
    client: Arc<McpClient>,
    dispatcher: SkillDispatcher,
}

impl AgentRuntime {
    /// Connect configured tool servers and register every skill.
    ///
    /// Servers that fail to start are logged and skipped; their skills stay
    /// registered but never accept a goal.
    pub async fn start(config: &Config) -> Self {
        let client = Arc::new(McpClient::new(ClientOptions::from_config(config)));

        for (name, e) in client.connect_all(&config.mcp.servers).await {
            warn!(server = %name, "Continuing without MCP server: {}", e);
        }

        let osquery_config = &config.skills.osquery;
        if osquery_config.enabled {
            if let Err(e) = client
                .connect_server(osquery::SERVER_NAME, &osquery_config.command, &osquery_config.args)
                .await
            {
                warn!(server = osquery::SERVER_NAME, "Continuing without osquery: {}", e);
            }
        } else {
            info!("Osquery skill is disabled");
        }

        log_tools(&client).await;

        let dispatcher = build_dispatcher(config, &client);
        info!("Registered {} skills: {:?}", dispatcher.count(), dispatcher.names());

        AgentRuntime { client, dispatcher }
    }

    /// Runtime over an already populated client and dispatcher
    pub fn new(client: Arc<McpClient>, dispatcher: SkillDispatcher) -> Self {
        AgentRuntime { client, dispatcher }
    }

    pub async fn execute_goal(&self, goal: &str) -> ExecutionTrace {
        self.dispatcher.execute_goal(goal).await
    }

    /// Skill names in dispatch order
    pub fn skill_names(&self) -> Vec<&str> {
        self.dispatcher.names()
    }

    pub fn dispatcher(&self) -> &SkillDispatcher {
        &self.dispatcher
    }

    pub fn client(&self) -> &Arc<McpClient> {
        &self.client
    }

    /// Disconnect every tool server
    pub async fn shutdown(&self) {
        self.client.disconnect_all().await;
    }
}

/// Skills in dispatch order: config-declared tool skills (by server name),
/// osquery, then the built-in leaf skills
pub fn build_dispatcher(config: &Config, client: &Arc<McpClient>) -> SkillDispatcher {
    let mut dispatcher = SkillDispatcher::new();

    let mut declared: Vec<(&String, _)> = config
        .mcp
        .servers
        .iter()
        .filter(|(_, server)| server.enabled)
        .filter_map(|(name, server)| server.skill.as_ref().map(|skill| (name, skill)))
        .collect();
    declared.sort_by(|a, b| a.0.cmp(b.0));

    for (name, skill) in declared {
        dispatcher.register(McpToolSkill::from_config(name, skill, Arc::clone(client)));
    }

    dispatcher.register(osquery::osquery_skill(Arc::clone(client)));
    dispatcher.register(CalculatorSkill::new());
    dispatcher.register(SummarizeSkill);
    dispatcher.register(WeatherSkill);
    dispatcher.register(MockSearchSkill);

    dispatcher
}

async fn log_tools(client: &McpClient) {
    for name in client.server_names() {
        match client.list_tools(&name).await {
            Ok(tools) => {
                let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
                info!(server = %name, "Available tools: {}", names.join(", "));
            }
            Err(e) => warn!(server = %name, "Failed to list tools: {}", e),
        }
    }
}
