use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use grocery_assist::token::TokenIssuer;
use grocery_assist::{AppState, Brain, ChatCompletionsClient, Config, SessionStore, router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "grocery-assist")]
#[command(about = "Decision server for the grocery assistant browser extension", version)]
struct Args {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Model name (overrides LLM_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Enable debug logging, including raw model replies
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let directive = if args.verbose {
        "grocery_assist=debug"
    } else {
        "grocery_assist=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    let mut config = Config::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(model) = args.model {
        config.llm.model = model;
    }

    let client = ChatCompletionsClient::new(&config.llm).context("Failed to build model client")?;
    info!(model = client.model(), base_url = %config.llm.base_url, "model client ready");

    let state = AppState {
        brain: Arc::new(Brain::new(
            Arc::new(client),
            Duration::from_secs(config.llm.timeout_secs),
        )),
        sessions: SessionStore::new(),
        tokens: Arc::new(TokenIssuer::new(&config.token)),
    };

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Could not bind to {}", addr))?;
    info!(%addr, "starting API server");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
