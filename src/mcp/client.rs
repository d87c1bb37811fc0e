//! MCP client for connecting to MCP servers
//!
//! Keeps a registry of named tool servers, each owning one stdio transport.
//! Lookups are lock-free with respect to I/O: the registry lock is never held
//! across an `.await`, so callers on different servers run in parallel while
//! calls to the same server queue on that server's transport.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::protocol::{ListToolsResult, McpRequest, McpResponse, McpTool, McpToolResult, ToolCall};
use super::transport::StdioTransport;
use crate::config::{Config, McpServerConfig};
use crate::error::{Error, Result};

/// Settings shared by every server connection
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// `clientInfo.name` sent during the handshake
    pub client_name: String,
    /// `clientInfo.version` sent during the handshake
    pub client_version: String,
    /// Upper bound for any single request/response turn (`None` waits forever)
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            client_name: crate::NAME.to_string(),
            client_version: crate::VERSION.to_string(),
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl ClientOptions {
    pub fn from_config(config: &Config) -> Self {
        ClientOptions {
            client_name: config.agent.client_name.clone(),
            client_version: crate::VERSION.to_string(),
            request_timeout: config.mcp.effective_timeout(),
        }
    }
}

/// A connected tool server
pub struct ToolServer {
    name: String,
    command: String,
    args: Vec<String>,
    transport: StdioTransport,
    server_info: Option<Value>,
}

impl ToolServer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `serverInfo` from the initialize response, if the server sent one
    pub fn server_info(&self) -> Option<&Value> {
        self.server_info.as_ref()
    }

    /// Liveness flag: transport open and process still running
    pub fn is_alive(&self) -> bool {
        self.transport.is_open()
    }
}

/// MCP client managing any number of named tool servers
pub struct McpClient {
    servers: RwLock<HashMap<String, Arc<ToolServer>>>,
    options: ClientOptions,
}

impl Default for McpClient {
    fn default() -> Self {
        Self::new(ClientOptions::default())
    }
}

impl McpClient {
    pub fn new(options: ClientOptions) -> Self {
        McpClient {
            servers: RwLock::new(HashMap::new()),
            options,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Spawn a server and perform the initialize handshake.
    ///
    /// Connecting under a name that is already registered replaces the old
    /// server: the new one is fully initialized first, then swapped in, then
    /// the old transport is torn down.
    pub async fn connect_server(&self, name: &str, command: &str, args: &[String]) -> Result<()> {
        self.connect_server_with_env(name, command, args, &HashMap::new())
            .await
    }

    /// [`connect_server`](Self::connect_server) with extra environment variables
    pub async fn connect_server_with_env(
        &self,
        name: &str,
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<()> {
        info!(server = %name, "Connecting to MCP server: {} {:?}", command, args);

        let transport = StdioTransport::open(name, command, args, env)?;

        let server_info = match self.initialize(name, &transport).await {
            Ok(info) => info,
            Err(e) => {
                if let Err(close_err) = transport.close().await {
                    warn!(server = %name, "Failed to tear down MCP server after handshake error: {}", close_err);
                }
                return Err(e);
            }
        };

        let server = Arc::new(ToolServer {
            name: name.to_string(),
            command: command.to_string(),
            args: args.to_vec(),
            transport,
            server_info,
        });

        let previous = self.servers.write().insert(name.to_string(), server);
        if let Some(old) = previous {
            info!(server = %name, "Replacing existing MCP server connection");
            if let Err(e) = old.transport.close().await {
                warn!(server = %name, "Error closing replaced MCP server: {}", e);
            }
        }

        info!(server = %name, "Connected to MCP server");
        Ok(())
    }

    /// Connect one server described in configuration
    pub async fn connect_configured(&self, name: &str, config: &McpServerConfig) -> Result<()> {
        self.connect_server_with_env(name, &config.command, &config.args, &config.env)
            .await
    }

    /// Connect every enabled server in `servers`.
    ///
    /// Returns the servers that failed; partial startup is acceptable.
    pub async fn connect_all(
        &self,
        servers: &HashMap<String, McpServerConfig>,
    ) -> Vec<(String, Error)> {
        let mut names: Vec<&String> = servers.keys().collect();
        names.sort();

        let mut failures = Vec::new();
        for name in names {
            let config = &servers[name];
            if !config.enabled {
                debug!(server = %name, "Skipping disabled MCP server");
                continue;
            }
            if let Err(e) = self.connect_configured(name, config).await {
                warn!(server = %name, "Failed to connect to MCP server: {}", e);
                failures.push((name.clone(), e));
            }
        }
        failures
    }

    async fn initialize(&self, name: &str, transport: &StdioTransport) -> Result<Option<Value>> {
        let client_name = self.options.client_name.as_str();
        let client_version = self.options.client_version.as_str();
        let response = self
            .timed(name, "initialize", transport.request(|id| {
                McpRequest::initialize(id, client_name, client_version)
            }))
            .await?;

        if let Some(err) = response.error {
            return Err(Error::InitializeFailed {
                server: name.to_string(),
                message: err.message,
            });
        }

        let server_info = response
            .result
            .as_ref()
            .and_then(|r| r.get("serverInfo"))
            .cloned();
        debug!(server = %name, "MCP server initialized: {:?}", server_info);
        Ok(server_info)
    }

    /// List available tools from a server
    pub async fn list_tools(&self, name: &str) -> Result<Vec<McpTool>> {
        let response = self.request(name, "tools/list", McpRequest::list_tools).await?;

        if let Some(err) = response.error {
            return Err(Error::ToolListFailed {
                server: name.to_string(),
                message: err.message,
            });
        }

        let result = response.result.ok_or_else(|| missing_result(name))?;
        let listed: ListToolsResult =
            serde_json::from_value(result).map_err(|e| Error::Protocol {
                server: name.to_string(),
                reason: format!("failed to parse tools/list result: {}", e),
            })?;

        debug!(server = %name, "MCP server has {} tools", listed.tools.len());
        Ok(listed.tools)
    }

    /// Call a tool on a server.
    ///
    /// A server-reported error is returned as a result with `is_error` set and
    /// a single `Error: <message>` text chunk, never as `Err`.
    pub async fn call_tool(&self, name: &str, call: &ToolCall) -> Result<McpToolResult> {
        let response = self
            .request(name, "tools/call", |id| McpRequest::call_tool(id, call))
            .await?;

        if let Some(err) = response.error {
            warn!(server = %name, tool = %call.name, "MCP tool returned error: {}", err.message);
            return Ok(McpToolResult::error(&err.message));
        }

        let result = response.result.ok_or_else(|| missing_result(name))?;
        let tool_result: McpToolResult =
            serde_json::from_value(result).map_err(|e| Error::Protocol {
                server: name.to_string(),
                reason: format!("failed to parse tool result: {}", e),
            })?;

        if tool_result.is_error {
            warn!(server = %name, tool = %call.name, "MCP tool reported failure");
        }
        Ok(tool_result)
    }

    /// Close a server's transport and forget it. No-op for unknown names.
    pub async fn disconnect_server(&self, name: &str) {
        let removed = self.servers.write().remove(name);
        if let Some(server) = removed {
            shutdown(&server).await;
        }
    }

    /// Disconnect every live server, each independently best-effort
    pub async fn disconnect_all(&self) {
        let drained: Vec<Arc<ToolServer>> =
            self.servers.write().drain().map(|(_, server)| server).collect();
        futures::future::join_all(drained.iter().map(|server| shutdown(server))).await;
    }

    /// Whether a live transport is registered under `name`
    pub fn is_connected(&self, name: &str) -> bool {
        self.servers
            .read()
            .get(name)
            .map(|server| server.is_alive())
            .unwrap_or(false)
    }

    /// Registered server, if any
    pub fn server(&self, name: &str) -> Option<Arc<ToolServer>> {
        self.servers.read().get(name).cloned()
    }

    /// Names of all registered servers, sorted
    pub fn server_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.servers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered servers
    pub fn server_count(&self) -> usize {
        self.servers.read().len()
    }

    async fn request<F>(&self, name: &str, method: &str, build: F) -> Result<McpResponse>
    where
        F: FnOnce(u64) -> McpRequest,
    {
        let server = self
            .server(name)
            .ok_or_else(|| Error::NotConnected(name.to_string()))?;

        let result = self
            .timed(name, method, server.transport.request(build))
            .await;

        if let Err(e) = &result {
            // After a timeout or a bad frame the stream is out of step with
            // the request ids, and a dead process will never answer again.
            if matches!(e, Error::Timeout { .. } | Error::Protocol { .. }) || !server.is_alive() {
                warn!(server = %name, "Evicting MCP server after failure: {}", e);
                self.evict(&server).await;
            }
        }

        result
    }

    async fn timed<T>(
        &self,
        name: &str,
        method: &str,
        turn: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        match self.options.request_timeout {
            None => turn.await,
            Some(limit) => tokio::time::timeout(limit, turn)
                .await
                .map_err(|_| Error::Timeout {
                    server: name.to_string(),
                    method: method.to_string(),
                    timeout_ms: limit.as_millis() as u64,
                })?,
        }
    }

    /// Remove `server` only if it is still the registered instance
    async fn evict(&self, server: &Arc<ToolServer>) {
        let removed = {
            let mut servers = self.servers.write();
            match servers.get(&server.name) {
                Some(current) if Arc::ptr_eq(current, server) => servers.remove(&server.name),
                _ => None,
            }
        };
        if removed.is_some() {
            shutdown(server).await;
        }
    }
}

async fn shutdown(server: &ToolServer) {
    match server.transport.close().await {
        Ok(()) => info!(server = %server.name, "Disconnected from MCP server"),
        Err(e) => warn!(server = %server.name, "Error closing connection to MCP server: {}", e),
    }
}

fn missing_result(name: &str) -> Error {
    Error::Protocol {
        server: name.to_string(),
        reason: "response carries neither result nor error".to_string(),
    }
}
