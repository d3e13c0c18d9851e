//! IRRBB Server - REST backend for the IRRBB dashboard.
//!
//! Serves the banking book and its interest rate risk analytics over HTTP.
//! Configuration comes from CLI flags with environment fallbacks, so the
//! container only needs `PORT` and `DATABASE_URL`.

mod handlers;
mod server;

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::Parser;
use irrbb_core::config::ServerConfig;
use irrbb_core::IrrbbApi;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "irrbb-server")]
#[command(about = "REST API server for the IRRBB dashboard")]
struct Args {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = ServerConfig::DEFAULT_HOST)]
    host: String,

    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, env = "PORT", default_value_t = ServerConfig::DEFAULT_PORT)]
    port: u16,

    /// postgres://, postgresql:// or sqlite: connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    #[arg(default_value = ServerConfig::DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Comma separated CORS origins
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    /// Skip populating empty tables with the demo book
    #[arg(long, env = "IRRBB_NO_SEED", value_parser = FalseyValueParser::new())]
    no_seed: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
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
    info!("Shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging; RUST_LOG wins over --debug
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting {}", ServerConfig::APP_NAME);

    let api = IrrbbApi::connect(&args.database_url)
        .await
        .context("Failed to open database")?;

    if args.no_seed {
        info!("Demo data seeding disabled");
    } else {
        let seeded = api.seed_demo_data().await.context("Failed to seed demo data")?;
        if seeded.loans + seeded.deposits > 0 {
            info!(
                "Seeded demo book: {} loans, {} deposits",
                seeded.loans, seeded.deposits
            );
        }
    }

    let allowed_origins: Vec<String> = if args.allowed_origins.is_empty() {
        ServerConfig::DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        args.allowed_origins
    };

    let (addr, server) = server::start_server(
        api,
        &args.host,
        args.port,
        &allowed_origins,
        shutdown_signal(),
    )
    .await
    .with_context(|| format!("Failed to bind {}:{}", args.host, args.port))?;

    info!("IRRBB server running on {}", addr);

    server.await.context("Server task panicked")??;
    info!("Server stopped");

    Ok(())
}
