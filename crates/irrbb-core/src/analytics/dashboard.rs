//! Live dashboard assembly.
//!
//! The yield curve and rate scenarios are simulated; the book figures and
//! gaps come from stored instruments.

use super::round2;
use crate::config::AnalyticsConfig;
use crate::models::{CoreMetrics, DashboardData, GapAnalysis, ScenarioPoint, YieldPoint};
use chrono::NaiveTime;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Tenors of the simulated curve with their yield ranges (percent).
const YIELD_CURVE_TENORS: [(&str, f64, f64); 7] = [
    ("1M", 0.5, 0.7),
    ("3M", 0.7, 1.0),
    ("6M", 1.0, 1.4),
    ("1Y", 1.5, 2.0),
    ("2Y", 2.0, 2.6),
    ("5Y", 2.5, 3.2),
    ("10Y", 3.0, 3.8),
];

pub fn simulate_yield_curve<R: Rng>(rng: &mut R) -> Vec<YieldPoint> {
    YIELD_CURVE_TENORS
        .iter()
        .map(|&(name, lo, hi)| YieldPoint {
            name: name.to_string(),
            yield_pct: round2(rng.random_range(lo..=hi)),
        })
        .collect()
}

/// Portfolio value index under base and ±100bps scenarios.
pub fn simulate_scenario_point<R: Rng>(rng: &mut R, time: NaiveTime) -> ScenarioPoint {
    ScenarioPoint {
        time: time.format("%H:%M:%S").to_string(),
        base_case: round2(rng.random_range(97.5..=102.5)),
        plus_100bps: round2(rng.random_range(92.5..=97.5)),
        minus_100bps: round2(rng.random_range(102.5..=107.5)),
    }
}

/// Rolling window of the most recent scenario points.
pub struct ScenarioHistory {
    points: Mutex<VecDeque<ScenarioPoint>>,
    capacity: usize,
}

impl Default for ScenarioHistory {
    fn default() -> Self {
        Self::with_capacity(AnalyticsConfig::MAX_SCENARIO_HISTORY)
    }
}

impl ScenarioHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a point, dropping the oldest beyond capacity, and return the
    /// window oldest first.
    pub fn push(&self, point: ScenarioPoint) -> Vec<ScenarioPoint> {
        let mut points = self
            .points
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        points.push_back(point);
        while points.len() > self.capacity {
            points.pop_front();
        }
        points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points
            .lock()
            .map(|points| points.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Combine book metrics, gaps and market simulation into the dashboard payload.
pub fn build_dashboard(
    metrics: CoreMetrics,
    gap: GapAnalysis,
    yield_curve_data: Vec<YieldPoint>,
    scenario_data: Vec<ScenarioPoint>,
) -> DashboardData {
    DashboardData {
        eve_sensitivity: metrics.eve_sensitivity,
        nii_sensitivity: metrics.nii_sensitivity,
        portfolio_value: metrics.total_assets_value,
        yield_curve_data,
        scenario_data,
        total_loans: metrics.total_loans,
        total_deposits: metrics.total_deposits,
        total_assets_value: metrics.total_assets_value,
        total_liabilities_value: metrics.total_liabilities_value,
        net_interest_income: metrics.net_interest_income,
        economic_value_of_equity: metrics.economic_value_of_equity,
        nii_repricing_gap: gap.nii_repricing_gap,
        eve_maturity_gap: gap.eve_maturity_gap,
    }
}
