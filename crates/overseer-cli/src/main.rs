use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use overseer_core::{
    AgentId, AnthropicProvider, ChatInput, ChatRequest, Dispatcher, LlmProvider, registry,
};
use overseer_gateway::GatewayServer;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::OverseerConfig;

#[derive(Parser)]
#[command(name = "overseer")]
#[command(version)]
#[command(about = "Project Overseer: chat with six project-lifecycle agents")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the chat page and WebSocket gateway
    Serve {
        /// Address to listen on (overrides gateway.bind)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Send a one-shot message to an agent
    Ask {
        /// Agent to address
        #[arg(short, long, default_value = "conceptualizer")]
        agent: String,

        /// The message to send
        message: String,
    },

    /// List the available agents
    Agents,

    /// Initialize config directory and default config
    Init,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cli.config),
        Commands::Agents => cmd_agents(),
        Commands::Serve { bind } => cmd_serve(&cli.config, bind).await,
        Commands::Ask { agent, message } => cmd_ask(&cli.config, agent, message).await,
    }
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        tokio::fs::write(&config_path, config::DEFAULT_CONFIG).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&config_path, std::fs::Permissions::from_mode(0o600))
                .await?;
        }
        info!("Created default config at {}", config_path.display());
    }

    println!("Project Overseer initialized at {}", config_dir.display());
    println!(
        "Set ANTHROPIC_API_KEY or edit {} to configure the API key.",
        config_path.display()
    );
    Ok(())
}

fn cmd_config(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = OverseerConfig::load(config_path)?;
    println!("{}", toml::to_string_pretty(&cfg.masked())?);
    Ok(())
}

fn cmd_agents() -> Result<()> {
    for profile in registry() {
        println!(
            "{} {:<15} {:<9} {}",
            profile.rune,
            profile.id.as_str(),
            profile.status,
            profile.description
        );
    }
    Ok(())
}

fn build_dispatcher(cfg: &OverseerConfig) -> Result<Dispatcher> {
    let anthropic = &cfg.anthropic;
    if anthropic.api_key.is_empty() {
        warn!("ANTHROPIC_API_KEY is not set; every message will fail until it is");
    }
    let provider = AnthropicProvider::new(
        anthropic.api_key.clone(),
        anthropic.model.clone(),
        anthropic.base_url.clone(),
        anthropic.max_tokens,
    )?;
    info!(
        "Using model {} at {} (max_tokens={})",
        provider.model(),
        provider.base_url(),
        provider.max_tokens()
    );
    Ok(Dispatcher::new(Arc::new(provider)))
}

async fn cmd_serve(config_path: &Option<PathBuf>, bind: Option<SocketAddr>) -> Result<()> {
    let cfg = OverseerConfig::load(config_path)?;
    let dispatcher = build_dispatcher(&cfg)?;
    let bind = bind.unwrap_or(cfg.gateway.bind);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        }
        shutdown.cancel();
    });

    info!("Starting Project Overseer on http://{}", bind);
    GatewayServer::new(bind, dispatcher).run(cancel).await
}

async fn cmd_ask(config_path: &Option<PathBuf>, agent: String, message: String) -> Result<()> {
    let request = ChatRequest::try_from(ChatInput { message, agent })?;

    let cfg = OverseerConfig::load(config_path)?;
    let dispatcher = build_dispatcher(&cfg)?;
    let result = dispatcher.dispatch(&request).await;

    if !result.success {
        anyhow::bail!("{} failed: {}", request.agent().profile().name, result.message);
    }

    let agent: AgentId = result.agent;
    println!("{} {}:", agent.profile().rune, agent.profile().name);
    println!("{}", result.message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from(["overseer", "ask", "--agent", "tester", "write tests"]);
        match cli.command {
            Commands::Ask { agent, message } => {
                assert_eq!(agent, "tester");
                assert_eq!(message, "write tests");
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_ask_default_agent() {
        let cli = Cli::parse_from(["overseer", "ask", "hello"]);
        match cli.command {
            Commands::Ask { agent, .. } => assert_eq!(agent, "conceptualizer"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_serve_with_global_flags() {
        let cli = Cli::parse_from([
            "overseer",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--debug",
            "--config",
            "/tmp/overseer.toml",
        ]);
        assert!(cli.debug);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/overseer.toml")));
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind.map(|b| b.port()), Some(9000)),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_build_dispatcher_without_key() {
        let dispatcher = build_dispatcher(&OverseerConfig::default()).unwrap();
        assert_eq!(dispatcher.provider().provider_name(), "anthropic");
    }

    #[tokio::test]
    async fn test_ask_rejects_before_loading_config() {
        let missing = Some(PathBuf::from("/nonexistent/overseer.toml"));
        let err = cmd_ask(&missing, "architect".into(), "   ".into())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Message cannot be empty");

        let err = cmd_ask(&missing, "janitor".into(), "hi".into())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("janitor"));
    }
}
