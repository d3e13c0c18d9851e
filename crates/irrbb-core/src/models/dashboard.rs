//! Analytics results and persisted snapshot records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Assets, liabilities and their difference within one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapBucket {
    pub bucket: String,
    pub assets: f64,
    pub liabilities: f64,
    /// `assets - liabilities`
    pub gap: f64,
}

impl GapBucket {
    pub fn new(bucket: impl Into<String>, assets: f64, liabilities: f64) -> Self {
        Self {
            bucket: bucket.into(),
            assets,
            liabilities,
            gap: assets - liabilities,
        }
    }
}

/// NII repricing gap and EVE maturity gap, in bucket order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub nii_repricing_gap: Vec<GapBucket>,
    pub eve_maturity_gap: Vec<GapBucket>,
}

/// Headline NII/EVE figures for the whole book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreMetrics {
    pub net_interest_income: f64,
    pub economic_value_of_equity: f64,
    pub total_assets_value: f64,
    pub total_liabilities_value: f64,
    pub eve_sensitivity: f64,
    pub nii_sensitivity: f64,
    pub total_loans: usize,
    pub total_deposits: usize,
}

/// One tenor on the yield curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldPoint {
    pub name: String,
    #[serde(rename = "yield")]
    pub yield_pct: f64,
}

/// One point of the rolling rate-scenario chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPoint {
    /// Wall-clock time formatted `HH:MM:SS`.
    pub time: String,
    pub base_case: f64,
    pub plus_100bps: f64,
    pub minus_100bps: f64,
}

/// Payload of the live dashboard endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub eve_sensitivity: f64,
    pub nii_sensitivity: f64,
    pub portfolio_value: f64,
    pub yield_curve_data: Vec<YieldPoint>,
    pub scenario_data: Vec<ScenarioPoint>,
    pub total_loans: usize,
    pub total_deposits: usize,
    pub total_assets_value: f64,
    pub total_liabilities_value: f64,
    pub net_interest_income: f64,
    pub economic_value_of_equity: f64,
    pub nii_repricing_gap: Vec<GapBucket>,
    pub eve_maturity_gap: Vec<GapBucket>,
}

/// Headline metrics to be recorded for a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDashboardMetric {
    pub timestamp: NaiveDate,
    pub scenario: String,
    pub eve_value: f64,
    pub nii_value: f64,
    pub eve_sensitivity: f64,
    pub nii_sensitivity: f64,
    pub total_assets_value: f64,
    pub total_liabilities_value: f64,
    pub portfolio_value: f64,
}

/// A recorded dashboard metric row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetric {
    pub id: i64,
    #[serde(flatten)]
    pub metric: NewDashboardMetric,
}

/// Balance-sheet side of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Asset,
    Liability,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Asset => "asset",
            Position::Liability => "liability",
        }
    }
}

/// Which NII bucket a single instrument landed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepricingBucketEntry {
    pub scenario: String,
    pub bucket: String,
    pub instrument_id: String,
    pub instrument_type: String,
    pub notional: f64,
    pub position: Position,
}

/// Net repricing position of one bucket with its earnings impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepricingNetPosition {
    pub scenario: String,
    pub bucket: String,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_position: f64,
    pub nii_base: f64,
    pub nii_shocked: f64,
}

/// Aggregate of instruments sharing a type, category and subcategory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioComposition {
    pub timestamp: NaiveDate,
    /// `Loan` or `Deposit`.
    pub instrument_type: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub volume_count: usize,
    pub total_amount: f64,
    pub average_interest_rate: Option<f64>,
}

/// Contribution of one instrument to net interest income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NiiDriver {
    pub scenario: String,
    pub instrument_id: Option<String>,
    pub instrument_type: Option<String>,
    pub nii_contribution: f64,
    pub breakdown_type: Option<String>,
    pub breakdown_value: Option<String>,
}

/// Everything a snapshot writes besides its headline metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotRecords {
    pub repricing_buckets: Vec<RepricingBucketEntry>,
    pub net_positions: Vec<RepricingNetPosition>,
    pub composition: Vec<PortfolioComposition>,
    pub nii_drivers: Vec<NiiDriver>,
}

/// Response returned after recording a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub metric: DashboardMetric,
    pub net_positions: Vec<RepricingNetPosition>,
    pub composition: Vec<PortfolioComposition>,
    pub instruments_bucketed: usize,
    pub nii_drivers_recorded: usize,
}
