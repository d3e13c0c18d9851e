//! IRRBB Core - Interest rate risk in the banking book.
//!
//! This crate holds the banking book (loans and deposits), the analytics
//! computed over it (net interest income, economic value of equity, repricing
//! and maturity gaps, portfolio composition) and the persistence behind them.
//! It has no HTTP layer; `irrbb-server` exposes it over REST.
//!
//! # Example
//!
//! ```rust,ignore
//! use irrbb_core::IrrbbApi;
//!
//! #[tokio::main]
//! async fn main() -> irrbb_core::Result<()> {
//!     let api = IrrbbApi::connect("sqlite::memory:").await?;
//!     api.seed_demo_data().await?;
//!
//!     let dashboard = api.live_dashboard().await?;
//!     println!("NII: {:.2}", dashboard.net_interest_income);
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod maintenance;
pub mod models;
pub mod seed;
pub mod store;

pub use error::{IrrbbError, Result};
pub use maintenance::ScaleOutcome;
pub use models::{
    DashboardData, DashboardMetric, Deposit, DepositTerms, Loan, LoanTerms, PortfolioComposition,
    SnapshotSummary,
};
pub use seed::SeedOutcome;
pub use store::{open_store, DatabaseUrl, InstrumentStore, PostgresStore, SqliteStore};

use analytics::ScenarioHistory;
use chrono::{Local, NaiveDate};
use config::AnalyticsConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, info};

/// Main entry point for the IRRBB backend.
///
/// Owns the instrument store and the rolling scenario history shown on the
/// live dashboard. Cheap to share behind an `Arc`.
pub struct IrrbbApi {
    store: Arc<dyn InstrumentStore>,
    history: ScenarioHistory,
}

impl IrrbbApi {
    pub fn new(store: Arc<dyn InstrumentStore>) -> Self {
        Self {
            store,
            history: ScenarioHistory::default(),
        }
    }

    /// Open the store named by `database_url` and wrap it.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let store = open_store(database_url).await?;
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &Arc<dyn InstrumentStore> {
        &self.store
    }

    /// Confirm the store answers queries.
    pub async fn check_database(&self) -> Result<()> {
        self.store.ping().await
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn rng() -> StdRng {
        StdRng::from_os_rng()
    }

    // ========================================
    // Loans
    // ========================================

    pub async fn list_loans(&self, skip: u32, limit: u32) -> Result<Vec<Loan>> {
        self.store.list_loans(skip, limit).await
    }

    pub async fn get_loan(&self, id: i64) -> Result<Loan> {
        self.store
            .get_loan(id)
            .await?
            .ok_or(IrrbbError::NotFound { kind: "Loan", id })
    }

    /// Validate and store a new loan.
    pub async fn create_loan(&self, terms: LoanTerms) -> Result<Loan> {
        terms.validate()?;
        let loan = self.store.create_loan(&terms).await?;
        info!("Created loan {} ({})", loan.terms.instrument_id, loan.id);
        Ok(loan)
    }

    // ========================================
    // Deposits
    // ========================================

    pub async fn list_deposits(&self, skip: u32, limit: u32) -> Result<Vec<Deposit>> {
        self.store.list_deposits(skip, limit).await
    }

    pub async fn get_deposit(&self, id: i64) -> Result<Deposit> {
        self.store
            .get_deposit(id)
            .await?
            .ok_or(IrrbbError::NotFound { kind: "Deposit", id })
    }

    /// Validate and store a new deposit.
    pub async fn create_deposit(&self, terms: DepositTerms) -> Result<Deposit> {
        terms.validate()?;
        let deposit = self.store.create_deposit(&terms).await?;
        info!(
            "Created deposit {} ({})",
            deposit.terms.instrument_id, deposit.id
        );
        Ok(deposit)
    }

    // ========================================
    // Analytics
    // ========================================

    async fn book(&self) -> Result<(Vec<LoanTerms>, Vec<DepositTerms>)> {
        let loans = self.store.all_loans().await?;
        let deposits = self.store.all_deposits().await?;
        Ok((
            loans.into_iter().map(|l| l.terms).collect(),
            deposits.into_iter().map(|d| d.terms).collect(),
        ))
    }

    /// Current metrics, gaps, simulated curve and scenario history.
    ///
    /// Each call appends one scenario point to the rolling history.
    pub async fn live_dashboard(&self) -> Result<DashboardData> {
        let (loans, deposits) = self.book().await?;
        let today = Self::today();
        let mut rng = Self::rng();

        let metrics = analytics::calculate_nii_and_eve(&loans, &deposits, &mut rng);
        let gap = analytics::calculate_gap_analysis(&loans, &deposits, today);
        let yield_curve = analytics::simulate_yield_curve(&mut rng);
        let point = analytics::simulate_scenario_point(&mut rng, Local::now().time());
        let scenarios = self.history.push(point);

        debug!(
            "Dashboard over {} loans / {} deposits",
            metrics.total_loans, metrics.total_deposits
        );
        Ok(analytics::build_dashboard(metrics, gap, yield_curve, scenarios))
    }

    pub async fn portfolio_composition(&self) -> Result<Vec<PortfolioComposition>> {
        let (loans, deposits) = self.book().await?;
        Ok(analytics::portfolio_composition(
            &loans,
            &deposits,
            Self::today(),
        ))
    }

    /// Compute and persist a snapshot of the book under `scenario`.
    pub async fn record_snapshot(&self, scenario: Option<String>) -> Result<SnapshotSummary> {
        let scenario = scenario
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| AnalyticsConfig::DEFAULT_SCENARIO.to_string());
        let (loans, deposits) = self.book().await?;
        let today = Self::today();

        let metrics = {
            let mut rng = Self::rng();
            analytics::calculate_nii_and_eve(&loans, &deposits, &mut rng)
        };
        let records = analytics::snapshot_records(&scenario, &loans, &deposits, today);
        let metric = self
            .store
            .save_snapshot(&analytics::metric_row(&scenario, today, &metrics), &records)
            .await?;

        info!(
            "Recorded snapshot '{}' ({} instruments)",
            scenario,
            records.repricing_buckets.len()
        );
        Ok(SnapshotSummary {
            metric,
            instruments_bucketed: records.repricing_buckets.len(),
            nii_drivers_recorded: records.nii_drivers.len(),
            net_positions: records.net_positions,
            composition: records.composition,
        })
    }

    /// Recorded metrics, newest first.
    pub async fn list_metrics(&self, limit: u32) -> Result<Vec<DashboardMetric>> {
        self.store.list_dashboard_metrics(limit).await
    }

    // ========================================
    // Maintenance
    // ========================================

    /// Fill empty instrument tables with the demo book.
    pub async fn seed_demo_data(&self) -> Result<SeedOutcome> {
        let mut rng = Self::rng();
        seed::seed_if_empty(self.store.as_ref(), &mut rng, Self::today()).await
    }

    /// Rescale deposit balances to sum to `target_total`.
    pub async fn scale_deposits(&self, target_total: f64) -> Result<ScaleOutcome> {
        maintenance::scale_deposits_to_target(self.store.as_ref(), target_total).await
    }
}
