//! Rescale every deposit balance so the book sums to a target total.

use anyhow::{Context, Result};
use clap::Parser;
use irrbb_core::config::{MaintenanceConfig, ServerConfig};
use irrbb_core::{IrrbbApi, ScaleOutcome};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "irrbb-scale-deposits")]
#[command(about = "Scale deposit balances to a target total")]
struct Args {
    /// Target total of all deposit balances
    #[arg(long, default_value_t = MaintenanceConfig::DEPOSIT_TARGET_TOTAL)]
    target: f64,

    /// postgres://, postgresql:// or sqlite: connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    #[arg(default_value = ServerConfig::DEFAULT_DATABASE_URL)]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let api = IrrbbApi::connect(&args.database_url)
        .await
        .context("Failed to open database")?;

    match api.scale_deposits(args.target).await? {
        ScaleOutcome::NothingToScale => {
            info!("No deposit balances to scale");
        }
        ScaleOutcome::Scaled {
            previous_total,
            target_total,
            factor,
            rows_updated,
        } => {
            info!(
                "Updated {} deposits: {:.2} -> {:.2} (factor {:.6})",
                rows_updated, previous_total, target_total, factor
            );
        }
    }

    Ok(())
}
