//! Instrument store trait.

use crate::error::Result;
use crate::models::{
    DashboardMetric, Deposit, DepositTerms, Loan, LoanTerms, NewDashboardMetric, SnapshotRecords,
};
use async_trait::async_trait;

/// Persistence backend for the banking book and recorded analytics.
///
/// Implementations create their schema on open. Listings are ordered by
/// `id` ascending; recorded metrics are returned newest first.
#[async_trait]
pub trait InstrumentStore: Send + Sync {
    /// Short name of the backend, used in logs.
    fn backend_name(&self) -> &'static str;

    /// Round-trip a trivial query to confirm the database is reachable.
    async fn ping(&self) -> Result<()>;

    async fn count_loans(&self) -> Result<usize>;

    async fn get_loan(&self, id: i64) -> Result<Option<Loan>>;

    /// Page through loans by id.
    async fn list_loans(&self, skip: u32, limit: u32) -> Result<Vec<Loan>>;

    async fn all_loans(&self) -> Result<Vec<Loan>>;

    /// Insert one loan and return it with its assigned id.
    ///
    /// A duplicate `instrument_id` yields `IrrbbError::Conflict`.
    async fn create_loan(&self, terms: &LoanTerms) -> Result<Loan>;

    /// Insert many loans in a single transaction.
    async fn insert_loans(&self, loans: &[LoanTerms]) -> Result<usize>;

    async fn count_deposits(&self) -> Result<usize>;

    async fn get_deposit(&self, id: i64) -> Result<Option<Deposit>>;

    /// Page through deposits by id.
    async fn list_deposits(&self, skip: u32, limit: u32) -> Result<Vec<Deposit>>;

    async fn all_deposits(&self) -> Result<Vec<Deposit>>;

    /// Insert one deposit and return it with its assigned id.
    ///
    /// A duplicate `instrument_id` yields `IrrbbError::Conflict`.
    async fn create_deposit(&self, terms: &DepositTerms) -> Result<Deposit>;

    /// Insert many deposits in a single transaction.
    async fn insert_deposits(&self, deposits: &[DepositTerms]) -> Result<usize>;

    /// Multiply every deposit balance by `factor`.
    ///
    /// Returns the number of rows updated.
    async fn scale_deposit_balances(&self, factor: f64) -> Result<usize>;

    /// Most recently recorded metrics first.
    async fn list_dashboard_metrics(&self, limit: u32) -> Result<Vec<DashboardMetric>>;

    /// Persist a snapshot's metric row and its detail rows in one transaction.
    ///
    /// Nothing is written if any insert fails.
    async fn save_snapshot(
        &self,
        metric: &NewDashboardMetric,
        records: &SnapshotRecords,
    ) -> Result<DashboardMetric>;
}
