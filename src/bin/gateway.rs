//! SkillBridge HTTP Gateway
//!
//! Starts the agent runtime and serves the goal API until Ctrl-C.

use clap::Parser;
use skillbridge::config::{self, Config};
use skillbridge::{gateway, AgentRuntime};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skillbridge-gateway", version = skillbridge::VERSION, about = "SkillBridge HTTP gateway")]
struct Args {
    /// Bind address (overrides gateway.bind)
    #[arg(long)]
    bind: Option<String>,

    /// Port (overrides gateway.port)
    #[arg(long, short)]
    port: Option<u16>,

    /// Configuration file to load instead of the default location
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skillbridge=info"));
    if args.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("Starting SkillBridge Gateway v{}", skillbridge::VERSION);

    let mut config: Config = match &args.config {
        Some(path) => {
            let mut config = config::load_config_from_path(path)?;
            config::apply_env_overrides(&mut config);
            config
        }
        None => config::load_config()?,
    };
    if let Some(bind) = args.bind {
        config.gateway.bind = bind;
    }
    if let Some(port) = args.port {
        config.gateway.port = port;
    }

    let validation = config::validate_config(&config);
    for issue in &validation.warnings {
        warn!("Config: {}", issue);
    }
    if !validation.valid {
        let errors: Vec<String> = validation.errors.iter().map(|e| e.to_string()).collect();
        anyhow::bail!("Invalid configuration: {}", errors.join("; "));
    }

    let runtime = Arc::new(AgentRuntime::start(&config).await);

    let listener = tokio::net::TcpListener::bind(config.gateway.address()).await?;
    gateway::serve(runtime, listener, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C, serving until killed: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    })
    .await?;

    Ok(())
}
