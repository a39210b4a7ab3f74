use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use bot_facade::commands::process::{DisconnectedHandler, ProcessCommandHandler};
use bot_facade::commands::CommandHandler;
use bot_facade::config::FacadeConfig;
use bot_facade::{app_router, AppState};

#[derive(Parser)]
#[command(name = "botfacade", about = "Token-gated HTTP control facade for the trading bot")]
struct Cli {
    /// Load config from a specific .env file
    #[arg(long)]
    env_file: Option<String>,

    /// Override the listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = FacadeConfig::from_env_file(cli.env_file.as_deref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    info!("Configuration loaded (port={})", config.port);

    if config.dashboard_token.is_empty() {
        warn!("DASHBOARD_TOKEN is not set: every gated request will be refused");
    }

    let handler: Arc<dyn CommandHandler> = match &config.command_handler_bin {
        Some(bin) => {
            info!("Command handler: {}", bin.display());
            Arc::new(ProcessCommandHandler::new(bin))
        }
        None => {
            warn!("COMMAND_HANDLER_BIN is not set: /status and /command will fail");
            Arc::new(DisconnectedHandler)
        }
    };

    let app = app_router(AppState::new(&config, handler));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Bot facade v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);
    info!("Routes:");
    info!("  GET  /health");
    info!("  GET  /status");
    info!("  GET  /orders");
    info!("  POST /command");
    info!("  GET  /settings");
    info!("  POST /settings");
    info!("  GET  /prompts?file=name");
    info!("  POST /prompts");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
