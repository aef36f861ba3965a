use clap::Parser;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

use standbook_api::{build_router, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "standbook-api", about = "Statement reconciliation API (in-memory)")]
struct Args {
    /// JSON file with statements to load at startup (overrides SEED_FILE)
    #[arg(long)]
    seed: Option<PathBuf>,
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "standbook_api=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting Standbook API server...");

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(seed) = args.seed {
        config.seed_file = Some(seed);
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    info!("Configuration loaded");

    let port = config.port;
    let state = AppState::init(config).await?;
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }
    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
