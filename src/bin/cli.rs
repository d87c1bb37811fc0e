//! SkillBridge CLI
//!
//! Run goals through the skill dispatcher, inspect tool servers and check
//! configuration.

use clap::{Parser, Subcommand};
use console::style;
use skillbridge::config::{self, Config, McpServerConfig};
use skillbridge::mcp::McpClient;
use skillbridge::runtime::build_dispatcher;
use skillbridge::skills::ExecutionTrace;
use skillbridge::{AgentRuntime, Error, Result, VERSION};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "skillbridge",
    author = "SkillBridge Contributors",
    version = VERSION,
    about = "SkillBridge - route goals to skills and MCP tool servers",
    long_about = None
)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file to load instead of the default location
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute one goal and print its trace
    Run {
        /// Goal text (words are joined with spaces)
        #[arg(required = true, trailing_var_arg = true)]
        goal: Vec<String>,
    },

    /// Interactive goal loop
    Chat,

    /// Connect a configured tool server and list its tools
    Tools {
        /// Server name from `mcp.servers`, or `osquery`
        server: String,
    },

    /// List registered skills in dispatch order
    Skills,

    /// Validate the configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { goal } => run_goal(&config, &goal.join(" ")).await,
        Commands::Chat => chat(&config).await,
        Commands::Tools { server } => list_tools(&config, &server).await,
        Commands::Skills => list_skills(&config),
        Commands::CheckConfig => check_config(&config),
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skillbridge=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let mut config = config::load_config_from_path(path)?;
            config::apply_env_overrides(&mut config);
            Ok(config)
        }
        None => config::load_config(),
    }
}

async fn run_goal(config: &Config, goal: &str) -> Result<()> {
    let runtime = AgentRuntime::start(config).await;
    let trace = runtime.execute_goal(goal).await;
    print_trace(&trace);
    runtime.shutdown().await;
    Ok(())
}

async fn chat(config: &Config) -> Result<()> {
    let runtime = AgentRuntime::start(config).await;

    println!();
    println!("{}", style("SkillBridge interactive session").cyan().bold());
    println!(
        "   Skills: {}",
        style(runtime.skill_names().join(", ")).dim()
    );
    println!("   Type {} or {} to leave", style("exit").yellow(), style("quit").yellow());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", style(">").green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let goal = line.trim();
        if goal.eq_ignore_ascii_case("exit") || goal.eq_ignore_ascii_case("quit") {
            break;
        }
        if goal.is_empty() {
            continue;
        }

        let trace = runtime.execute_goal(goal).await;
        print_trace(&trace);
        println!();
    }

    runtime.shutdown().await;
    Ok(())
}

async fn list_tools(config: &Config, server: &str) -> Result<()> {
    let server_config = resolve_server(config, server)?;
    let client = McpClient::new(skillbridge::mcp::ClientOptions::from_config(config));

    client.connect_configured(server, &server_config).await?;
    let launched = client
        .server(server)
        .map(|s| format!("{} {}", s.command(), s.args().join(" ")))
        .unwrap_or_default();
    let tools = client.list_tools(server).await;
    client.disconnect_all().await;
    let tools = tools?;

    println!(
        "{} ({} tools)  {}",
        style(server).cyan().bold(),
        tools.len(),
        style(launched.trim_end()).dim()
    );
    for tool in tools {
        println!("  {}  {}", style(&tool.name).green(), tool.description);
    }
    Ok(())
}

fn resolve_server(config: &Config, server: &str) -> Result<McpServerConfig> {
    if let Some(found) = config.mcp.servers.get(server) {
        return Ok(found.clone());
    }
    if server == skillbridge::skills::osquery::SERVER_NAME {
        let osquery = &config.skills.osquery;
        return Ok(McpServerConfig {
            command: osquery.command.clone(),
            args: osquery.args.clone(),
            env: Default::default(),
            enabled: true,
            skill: None,
        });
    }
    Err(Error::Config(format!("Unknown MCP server: {}", server)))
}

fn list_skills(config: &Config) -> Result<()> {
    // Built without connecting, so nothing is spawned just to list names
    let dispatcher = build_dispatcher(config, &Arc::new(McpClient::default()));
    for (index, name) in dispatcher.names().into_iter().enumerate() {
        let description = dispatcher
            .get(name)
            .map(|skill| skill.description())
            .unwrap_or_default();
        println!("{:>2}. {}  {}", index + 1, style(name).green(), style(description).dim());
    }
    Ok(())
}

fn check_config(config: &Config) -> Result<()> {
    let result = config::validate_config(config);

    for issue in &result.errors {
        println!("{} {}", style("error").red().bold(), issue);
    }
    for issue in &result.warnings {
        println!("{} {}", style("warning").yellow().bold(), issue);
    }

    if result.valid {
        println!("{} Configuration is valid", style("✓").green());
        Ok(())
    } else {
        Err(Error::Config(format!(
            "{} configuration error(s)",
            result.errors.len()
        )))
    }
}

fn print_trace(trace: &ExecutionTrace) {
    for step in trace.steps() {
        let mark = if step.success {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("{} {}", mark, style(&step.skill_name).cyan());
        for line in step.output.lines() {
            println!("  {}", line);
        }
    }
}
