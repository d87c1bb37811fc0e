//! Gateway module - HTTP front door for goal execution
//!
//! ```text
//! POST /api/agent/execute   { "goal": "..." }  ->  { goal, trace, finalOutput }
//! GET  /api/agent/skills                       ->  [ skill names ]
//! GET  /health                                 ->  { status, version, servers }
//! ```

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::error::Result;
use crate::runtime::AgentRuntime;
use crate::skills::ExecutionTrace;

/// Body of an execute request; a missing goal is treated as empty
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub goal: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub goal: String,
    pub trace: ExecutionTrace,
    pub final_output: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Tool servers with a live transport
    pub servers: Vec<String>,
}

/// Build the gateway router
pub fn router(runtime: Arc<AgentRuntime>) -> Router {
    let api = Router::new()
        .route("/execute", post(execute_goal))
        .route("/skills", get(list_skills));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/agent", api)
        .with_state(runtime)
        .layer(CorsLayer::permissive())
}

/// Serve until `shutdown` resolves, then disconnect every tool server
pub async fn serve<F>(runtime: Arc<AgentRuntime>, listener: TcpListener, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(Arc::clone(&runtime)))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Gateway stopped, disconnecting tool servers");
    runtime.shutdown().await;
    Ok(())
}

async fn execute_goal(
    State(runtime): State<Arc<AgentRuntime>>,
    Json(request): Json<ExecuteRequest>,
) -> Json<ExecuteResponse> {
    debug!(goal = %request.goal, "Executing goal");
    let trace = runtime.execute_goal(&request.goal).await;
    let final_output = trace.final_output().to_string();
    Json(ExecuteResponse {
        goal: request.goal,
        trace,
        final_output,
    })
}

async fn list_skills(State(runtime): State<Arc<AgentRuntime>>) -> Json<Vec<String>> {
    Json(runtime.skill_names().into_iter().map(String::from).collect())
}

async fn health_check(State(runtime): State<Arc<AgentRuntime>>) -> Json<HealthResponse> {
    let client = runtime.client();
    let servers = client
        .server_names()
        .into_iter()
        .filter(|name| client.is_connected(name))
        .collect();
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        servers,
    })
}
