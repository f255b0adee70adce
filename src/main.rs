use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use clap::Parser;
use telehub::config::{HubConfig, HEALTH_PATH};
use telehub::hub::Hub;
use telehub::transport::axum::AxumWSJoint;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "telehub")]
#[command(about = "Signaling and room hub for appointment video calls")]
#[command(version)]
struct Cli {
    /// Config file path (optional)
    #[arg(short, long, env = "TELEHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to
    #[arg(short, long, env = "TELEHUB_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TELEHUB_PORT")]
    port: Option<u16>,

    /// Path of the WebSocket endpoint
    #[arg(long, env = "TELEHUB_WS_PATH")]
    ws_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, env = "TELEHUB_VERBOSE")]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "TELEHUB_JSON_LOGS")]
    json_logs: bool,
}

fn init_logging(verbose: bool, json: bool) {
    let default_filter = if verbose {
        "telehub=debug,tower_http=debug"
    } else {
        "telehub=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<HubConfig> {
    let mut config = match &cli.config {
        Some(path) => HubConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => HubConfig::default(),
    };

    if let Some(bind) = &cli.bind {
        config.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(ws_path) = &cli.ws_path {
        config.ws_path = ws_path.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    let hub = Arc::new(Hub::new(load_config(&cli)?));
    let addr = hub.config().socket_addr();
    let ws_path = hub.config().ws_path.clone();
    let joint = AxumWSJoint::new(hub);

    let router = joint.attach_router(&ws_path, Router::new());
    let app = joint
        .attach_health(HEALTH_PATH, router)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("telehub listening on {} (websocket at {})", addr, ws_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
