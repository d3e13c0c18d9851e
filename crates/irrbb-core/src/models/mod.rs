//! Data models for instruments and analytics results.

pub mod dashboard;
pub mod instrument;

pub use dashboard::{
    CoreMetrics, DashboardData, DashboardMetric, GapAnalysis, GapBucket, NewDashboardMetric,
    NiiDriver, PortfolioComposition, Position, RepricingBucketEntry, RepricingNetPosition,
    ScenarioPoint, SnapshotRecords, SnapshotSummary, YieldPoint,
};
pub use instrument::{
    Deposit, DepositTerms, DepositType, Loan, LoanTerms, LoanType, RepricingFrequency,
};
