//! Interest rate risk analytics over the banking book.
//!
//! All functions here are pure: they take instrument terms, a reference date
//! and (where simulation is involved) an injected random source.

pub mod buckets;
pub mod composition;
pub mod dashboard;
pub mod gap;
pub mod metrics;
pub mod snapshot;

pub use buckets::{
    BucketScheme, EVE_MATURITY, EVE_NON_MATURITY, NII_NON_SENSITIVE, NII_REPRICING,
};
pub use composition::portfolio_composition;
pub use dashboard::{
    build_dashboard, simulate_scenario_point, simulate_yield_curve, ScenarioHistory,
};
pub use gap::calculate_gap_analysis;
pub use metrics::{calculate_nii_and_eve, effective_loan_rate};
pub use snapshot::{metric_row, snapshot_records};

/// Round to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Round to cents / basis-point hundredths.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}
