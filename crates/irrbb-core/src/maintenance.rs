//! Bulk maintenance operations on stored instruments.

use crate::error::{IrrbbError, Result};
use crate::store::InstrumentStore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Result of rescaling deposit balances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScaleOutcome {
    /// No deposits, or every balance is zero.
    NothingToScale,
    Scaled {
        previous_total: f64,
        target_total: f64,
        factor: f64,
        rows_updated: usize,
    },
}

/// Multiply every deposit balance so the book sums to `target_total`.
pub async fn scale_deposits_to_target(
    store: &dyn InstrumentStore,
    target_total: f64,
) -> Result<ScaleOutcome> {
    if !target_total.is_finite() || target_total < 0.0 {
        return Err(IrrbbError::validation(
            "target",
            "must be a finite, non-negative amount",
        ));
    }

    let previous_total: f64 = store
        .all_deposits()
        .await?
        .iter()
        .map(|deposit| deposit.terms.balance)
        .sum();

    if previous_total == 0.0 {
        warn!("Total deposit balance is zero, nothing to scale");
        return Ok(ScaleOutcome::NothingToScale);
    }

    let factor = target_total / previous_total;
    let rows_updated = store.scale_deposit_balances(factor).await?;
    info!(
        "Scaled {} deposits by {:.6} ({:.2} -> {:.2})",
        rows_updated, factor, previous_total, target_total
    );

    Ok(ScaleOutcome::Scaled {
        previous_total,
        target_total,
        factor,
        rows_updated,
    })
}
