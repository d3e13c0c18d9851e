//! Point-in-time snapshot of the book for later comparison.

use super::buckets::NII_REPRICING;
use super::composition::portfolio_composition;
use super::gap::{calculate_gap_analysis, deposit_repricing_bucket, loan_repricing_bucket};
use super::metrics::{deposit_interest_expense, loan_interest_income};
use crate::config::AnalyticsConfig;
use crate::models::{
    CoreMetrics, DepositTerms, GapBucket, LoanTerms, NewDashboardMetric, NiiDriver, Position,
    RepricingBucketEntry, RepricingNetPosition, SnapshotRecords,
};
use chrono::NaiveDate;

const BREAKDOWN_INSTRUMENT: &str = "instrument";

/// Share of the one-year earnings horizon left after a bucket's midpoint.
///
/// Positions repricing beyond a year, or never, do not move this year's NII.
pub fn horizon_factor(bucket: &str) -> f64 {
    match NII_REPRICING.index_of(bucket) {
        Some(0) => 0.875,
        Some(1) => 0.625,
        Some(2) => 0.25,
        _ => 0.0,
    }
}

/// Earnings impact of a bucket's net position, base and shocked.
pub fn net_position(scenario: &str, bucket: &GapBucket) -> RepricingNetPosition {
    let h = horizon_factor(&bucket.bucket);
    let base_rate = AnalyticsConfig::BENCHMARK_RATE;
    let shocked_rate = base_rate + AnalyticsConfig::RATE_SHOCK;
    RepricingNetPosition {
        scenario: scenario.to_string(),
        bucket: bucket.bucket.clone(),
        total_assets: bucket.assets,
        total_liabilities: bucket.liabilities,
        net_position: bucket.gap,
        nii_base: bucket.gap * base_rate * h,
        nii_shocked: bucket.gap * shocked_rate * h,
    }
}

/// Headline metric row for a snapshot.
pub fn metric_row(scenario: &str, today: NaiveDate, metrics: &CoreMetrics) -> NewDashboardMetric {
    NewDashboardMetric {
        timestamp: today,
        scenario: scenario.to_string(),
        eve_value: metrics.economic_value_of_equity,
        nii_value: metrics.net_interest_income,
        eve_sensitivity: metrics.eve_sensitivity,
        nii_sensitivity: metrics.nii_sensitivity,
        total_assets_value: metrics.total_assets_value,
        total_liabilities_value: metrics.total_liabilities_value,
        portfolio_value: metrics.total_assets_value,
    }
}

/// Detail rows for a snapshot: per-instrument buckets and NII drivers,
/// per-bucket net positions, and the composition breakdown.
pub fn snapshot_records(
    scenario: &str,
    loans: &[LoanTerms],
    deposits: &[DepositTerms],
    today: NaiveDate,
) -> SnapshotRecords {
    let mut records = SnapshotRecords::default();

    for loan in loans {
        records.repricing_buckets.push(RepricingBucketEntry {
            scenario: scenario.to_string(),
            bucket: loan_repricing_bucket(loan, today).to_string(),
            instrument_id: loan.instrument_id.clone(),
            instrument_type: loan.loan_type.as_str().to_string(),
            notional: loan.notional,
            position: Position::Asset,
        });
        records.nii_drivers.push(NiiDriver {
            scenario: scenario.to_string(),
            instrument_id: Some(loan.instrument_id.clone()),
            instrument_type: Some(loan.loan_type.as_str().to_string()),
            nii_contribution: loan_interest_income(loan),
            breakdown_type: Some(BREAKDOWN_INSTRUMENT.to_string()),
            breakdown_value: Some(loan.instrument_id.clone()),
        });
    }

    for deposit in deposits {
        records.repricing_buckets.push(RepricingBucketEntry {
            scenario: scenario.to_string(),
            bucket: deposit_repricing_bucket(deposit, today).to_string(),
            instrument_id: deposit.instrument_id.clone(),
            instrument_type: deposit.deposit_type.as_str().to_string(),
            notional: deposit.balance,
            position: Position::Liability,
        });
        records.nii_drivers.push(NiiDriver {
            scenario: scenario.to_string(),
            instrument_id: Some(deposit.instrument_id.clone()),
            instrument_type: Some(deposit.deposit_type.as_str().to_string()),
            nii_contribution: -deposit_interest_expense(deposit),
            breakdown_type: Some(BREAKDOWN_INSTRUMENT.to_string()),
            breakdown_value: Some(deposit.instrument_id.clone()),
        });
    }

    let gap = calculate_gap_analysis(loans, deposits, today);
    records.net_positions = gap
        .nii_repricing_gap
        .iter()
        .map(|bucket| net_position(scenario, bucket))
        .collect();
    records.composition = portfolio_composition(loans, deposits, today);

    records
}
