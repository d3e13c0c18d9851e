//! SQLite-backed instrument store.

use super::traits::InstrumentStore;
use crate::error::{IrrbbError, Result};
use crate::models::{
    DashboardMetric, Deposit, DepositTerms, DepositType, Loan, LoanTerms, LoanType,
    NewDashboardMetric, RepricingFrequency, SnapshotRecords,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS loans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    instrument_id TEXT NOT NULL UNIQUE,
    type TEXT NOT NULL,
    notional REAL NOT NULL,
    interest_rate REAL,
    maturity_date TEXT NOT NULL,
    origination_date TEXT NOT NULL,
    benchmark_rate_type TEXT,
    spread REAL,
    repricing_frequency TEXT,
    next_repricing_date TEXT
);

CREATE TABLE IF NOT EXISTS deposits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    instrument_id TEXT NOT NULL UNIQUE,
    type TEXT NOT NULL,
    balance REAL NOT NULL,
    interest_rate REAL NOT NULL,
    open_date TEXT NOT NULL,
    maturity_date TEXT,
    repricing_frequency TEXT,
    next_repricing_date TEXT
);

CREATE TABLE IF NOT EXISTS dashboard_metrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    scenario TEXT NOT NULL,
    eve_value REAL NOT NULL,
    nii_value REAL NOT NULL,
    eve_sensitivity REAL NOT NULL,
    nii_sensitivity REAL NOT NULL,
    total_assets_value REAL NOT NULL,
    total_liabilities_value REAL NOT NULL,
    portfolio_value REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS repricing_buckets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scenario TEXT NOT NULL,
    bucket TEXT NOT NULL,
    instrument_id TEXT NOT NULL,
    instrument_type TEXT NOT NULL,
    notional REAL NOT NULL,
    position TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS repricing_net_positions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scenario TEXT NOT NULL,
    bucket TEXT NOT NULL,
    total_assets REAL NOT NULL,
    total_liabilities REAL NOT NULL,
    net_position REAL NOT NULL,
    nii_base REAL NOT NULL,
    nii_shocked REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS portfolio_composition (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    instrument_type TEXT NOT NULL,
    category TEXT NOT NULL,
    subcategory TEXT,
    volume_count INTEGER NOT NULL,
    total_amount REAL NOT NULL,
    average_interest_rate REAL
);

CREATE TABLE IF NOT EXISTS nii_drivers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scenario TEXT NOT NULL,
    instrument_id TEXT,
    instrument_type TEXT,
    nii_contribution REAL NOT NULL,
    breakdown_type TEXT,
    breakdown_value TEXT
);
"#;

const LOAN_COLUMNS: &str = "id, instrument_id, type, notional, interest_rate, maturity_date, \
     origination_date, benchmark_rate_type, spread, repricing_frequency, next_repricing_date";

const DEPOSIT_COLUMNS: &str = "id, instrument_id, type, balance, interest_rate, open_date, \
     maturity_date, repricing_frequency, next_repricing_date";

const METRIC_COLUMNS: &str = "id, timestamp, scenario, eve_value, nii_value, eve_sensitivity, \
     nii_sensitivity, total_assets_value, total_liabilities_value, portfolio_value";

/// SQLite instrument store.
///
/// Thread-safe via an internal mutex on the connection.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| IrrbbError::Io {
                    message: format!("Failed to create directory {}", parent.display()),
                    path: Some(parent.to_path_buf()),
                    source: Some(e),
                })?;
            }
        }

        let conn = Connection::open(db_path).map_err(|e| IrrbbError::Database {
            message: format!("Failed to open database {}: {}", db_path.display(), e),
            source: Some(e),
        })?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA busy_timeout=30000;
            PRAGMA synchronous=NORMAL;
            ",
        )?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(|e| IrrbbError::Database {
            message: format!("Failed to initialize schema: {}", e),
            source: Some(e),
        })?;
        debug!("SQLite schema ready");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| IrrbbError::Database {
            message: "Failed to acquire connection lock".to_string(),
            source: None,
        })
    }

    fn row_to_loan(row: &Row) -> rusqlite::Result<Loan> {
        let loan_type: String = row.get(2)?;
        let frequency: Option<String> = row.get(9)?;
        Ok(Loan {
            id: row.get(0)?,
            terms: LoanTerms {
                instrument_id: row.get(1)?,
                loan_type: parse_column(2, &loan_type, LoanType::parse)?,
                notional: row.get(3)?,
                interest_rate: row.get(4)?,
                maturity_date: row.get(5)?,
                origination_date: row.get(6)?,
                benchmark_rate_type: row.get(7)?,
                spread: row.get(8)?,
                repricing_frequency: frequency
                    .map(|f| parse_column(9, &f, RepricingFrequency::parse))
                    .transpose()?,
                next_repricing_date: row.get(10)?,
            },
        })
    }

    fn row_to_deposit(row: &Row) -> rusqlite::Result<Deposit> {
        let deposit_type: String = row.get(2)?;
        let frequency: Option<String> = row.get(7)?;
        Ok(Deposit {
            id: row.get(0)?,
            terms: DepositTerms {
                instrument_id: row.get(1)?,
                deposit_type: parse_column(2, &deposit_type, DepositType::parse)?,
                balance: row.get(3)?,
                interest_rate: row.get(4)?,
                open_date: row.get(5)?,
                maturity_date: row.get(6)?,
                repricing_frequency: frequency
                    .map(|f| parse_column(7, &f, RepricingFrequency::parse))
                    .transpose()?,
                next_repricing_date: row.get(8)?,
            },
        })
    }

    fn row_to_metric(row: &Row) -> rusqlite::Result<DashboardMetric> {
        Ok(DashboardMetric {
            id: row.get(0)?,
            metric: NewDashboardMetric {
                timestamp: row.get(1)?,
                scenario: row.get(2)?,
                eve_value: row.get(3)?,
                nii_value: row.get(4)?,
                eve_sensitivity: row.get(5)?,
                nii_sensitivity: row.get(6)?,
                total_assets_value: row.get(7)?,
                total_liabilities_value: row.get(8)?,
                portfolio_value: row.get(9)?,
            },
        })
    }

    fn insert_loan(conn: &Connection, terms: &LoanTerms) -> Result<i64> {
        conn.execute(
            "INSERT INTO loans (instrument_id, type, notional, interest_rate, maturity_date,
                                origination_date, benchmark_rate_type, spread,
                                repricing_frequency, next_repricing_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                terms.instrument_id,
                terms.loan_type.as_str(),
                terms.notional,
                terms.interest_rate,
                terms.maturity_date,
                terms.origination_date,
                terms.benchmark_rate_type,
                terms.spread,
                terms.repricing_frequency.map(|f| f.as_str()),
                terms.next_repricing_date,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_deposit(conn: &Connection, terms: &DepositTerms) -> Result<i64> {
        conn.execute(
            "INSERT INTO deposits (instrument_id, type, balance, interest_rate, open_date,
                                   maturity_date, repricing_frequency, next_repricing_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                terms.instrument_id,
                terms.deposit_type.as_str(),
                terms.balance,
                terms.interest_rate,
                terms.open_date,
                terms.maturity_date,
                terms.repricing_frequency.map(|f| f.as_str()),
                terms.next_repricing_date,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_metric(conn: &Connection, metric: &NewDashboardMetric) -> Result<i64> {
        conn.execute(
            "INSERT INTO dashboard_metrics (timestamp, scenario, eve_value, nii_value,
                                            eve_sensitivity, nii_sensitivity,
                                            total_assets_value, total_liabilities_value,
                                            portfolio_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                metric.timestamp,
                metric.scenario,
                metric.eve_value,
                metric.nii_value,
                metric.eve_sensitivity,
                metric.nii_sensitivity,
                metric.total_assets_value,
                metric.total_liabilities_value,
                metric.portfolio_value,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn count(&self, table: &str) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }
}

fn parse_column<T>(idx: usize, raw: &str, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unexpected value '{}'", raw).into(),
        )
    })
}

#[async_trait]
impl InstrumentStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn ping(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    async fn count_loans(&self) -> Result<usize> {
        self.count("loans")
    }

    async fn get_loan(&self, id: i64) -> Result<Option<Loan>> {
        let conn = self.lock()?;
        let loan = conn
            .query_row(
                &format!("SELECT {} FROM loans WHERE id = ?1", LOAN_COLUMNS),
                params![id],
                Self::row_to_loan,
            )
            .optional()?;
        Ok(loan)
    }

    async fn list_loans(&self, skip: u32, limit: u32) -> Result<Vec<Loan>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM loans ORDER BY id LIMIT ?1 OFFSET ?2",
            LOAN_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit, skip], Self::row_to_loan)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn all_loans(&self) -> Result<Vec<Loan>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM loans ORDER BY id", LOAN_COLUMNS))?;
        let rows = stmt.query_map([], Self::row_to_loan)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn create_loan(&self, terms: &LoanTerms) -> Result<Loan> {
        let conn = self.lock()?;
        let id = Self::insert_loan(&conn, terms)?;
        debug!("Created loan {} ({})", id, terms.instrument_id);
        Ok(Loan {
            id,
            terms: terms.clone(),
        })
    }

    async fn insert_loans(&self, loans: &[LoanTerms]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for terms in loans {
            Self::insert_loan(&tx, terms)?;
        }
        tx.commit()?;
        Ok(loans.len())
    }

    async fn count_deposits(&self) -> Result<usize> {
        self.count("deposits")
    }

    async fn get_deposit(&self, id: i64) -> Result<Option<Deposit>> {
        let conn = self.lock()?;
        let deposit = conn
            .query_row(
                &format!("SELECT {} FROM deposits WHERE id = ?1", DEPOSIT_COLUMNS),
                params![id],
                Self::row_to_deposit,
            )
            .optional()?;
        Ok(deposit)
    }

    async fn list_deposits(&self, skip: u32, limit: u32) -> Result<Vec<Deposit>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM deposits ORDER BY id LIMIT ?1 OFFSET ?2",
            DEPOSIT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit, skip], Self::row_to_deposit)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn all_deposits(&self) -> Result<Vec<Deposit>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM deposits ORDER BY id",
            DEPOSIT_COLUMNS
        ))?;
        let rows = stmt.query_map([], Self::row_to_deposit)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn create_deposit(&self, terms: &DepositTerms) -> Result<Deposit> {
        let conn = self.lock()?;
        let id = Self::insert_deposit(&conn, terms)?;
        debug!("Created deposit {} ({})", id, terms.instrument_id);
        Ok(Deposit {
            id,
            terms: terms.clone(),
        })
    }

    async fn insert_deposits(&self, deposits: &[DepositTerms]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for terms in deposits {
            Self::insert_deposit(&tx, terms)?;
        }
        tx.commit()?;
        Ok(deposits.len())
    }

    async fn scale_deposit_balances(&self, factor: f64) -> Result<usize> {
        let conn = self.lock()?;
        let updated = conn.execute("UPDATE deposits SET balance = balance * ?1", params![factor])?;
        Ok(updated)
    }

    async fn list_dashboard_metrics(&self, limit: u32) -> Result<Vec<DashboardMetric>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM dashboard_metrics ORDER BY id DESC LIMIT ?1",
            METRIC_COLUMNS
        ))?;
        let rows = stmt.query_map(params![limit], Self::row_to_metric)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    async fn save_snapshot(
        &self,
        metric: &NewDashboardMetric,
        records: &SnapshotRecords,
    ) -> Result<DashboardMetric> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let id = Self::insert_metric(&tx, metric)?;

        for entry in &records.repricing_buckets {
            tx.execute(
                "INSERT INTO repricing_buckets (scenario, bucket, instrument_id, instrument_type,
                                                notional, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.scenario,
                    entry.bucket,
                    entry.instrument_id,
                    entry.instrument_type,
                    entry.notional,
                    entry.position.as_str(),
                ],
            )?;
        }

        for net in &records.net_positions {
            tx.execute(
                "INSERT INTO repricing_net_positions (scenario, bucket, total_assets,
                                                      total_liabilities, net_position,
                                                      nii_base, nii_shocked)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    net.scenario,
                    net.bucket,
                    net.total_assets,
                    net.total_liabilities,
                    net.net_position,
                    net.nii_base,
                    net.nii_shocked,
                ],
            )?;
        }

        for row in &records.composition {
            tx.execute(
                "INSERT INTO portfolio_composition (timestamp, instrument_type, category,
                                                    subcategory, volume_count, total_amount,
                                                    average_interest_rate)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.timestamp,
                    row.instrument_type,
                    row.category,
                    row.subcategory,
                    row.volume_count as i64,
                    row.total_amount,
                    row.average_interest_rate,
                ],
            )?;
        }

        for driver in &records.nii_drivers {
            tx.execute(
                "INSERT INTO nii_drivers (scenario, instrument_id, instrument_type,
                                          nii_contribution, breakdown_type, breakdown_value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    driver.scenario,
                    driver.instrument_id,
                    driver.instrument_type,
                    driver.nii_contribution,
                    driver.breakdown_type,
                    driver.breakdown_value,
                ],
            )?;
        }

        tx.commit()?;
        debug!(
            "Saved snapshot rows: {} buckets, {} net positions, {} composition, {} drivers",
            records.repricing_buckets.len(),
            records.net_positions.len(),
            records.composition.len(),
            records.nii_drivers.len()
        );
        Ok(DashboardMetric {
            id,
            metric: metric.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NiiDriver, Position, RepricingBucketEntry};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn floating_loan(id: &str) -> LoanTerms {
        LoanTerms {
            instrument_id: id.into(),
            loan_type: LoanType::FloatingRate,
            notional: 250_000.0,
            interest_rate: None,
            maturity_date: date(2031, 6, 30),
            origination_date: date(2024, 6, 30),
            benchmark_rate_type: Some("SOFR".into()),
            spread: Some(0.0125),
            repricing_frequency: Some(RepricingFrequency::Quarterly),
            next_repricing_date: Some(date(2025, 9, 30)),
        }
    }

    fn savings(id: &str, balance: f64) -> DepositTerms {
        DepositTerms {
            instrument_id: id.into(),
            deposit_type: DepositType::Savings,
            balance,
            interest_rate: 0.01,
            open_date: date(2024, 1, 15),
            maturity_date: None,
            repricing_frequency: Some(RepricingFrequency::Monthly),
            next_repricing_date: Some(date(2025, 2, 15)),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_loan() {
        let store = SqliteStore::open_in_memory().unwrap();
        let created = store.create_loan(&floating_loan("LOAN001")).await.unwrap();
        assert_eq!(created.id, 1);

        let fetched = store.get_loan(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(store.get_loan(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_instrument_id_conflicts() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_loan(&floating_loan("LOAN001")).await.unwrap();
        let err = store.create_loan(&floating_loan("LOAN001")).await.unwrap_err();
        assert!(matches!(err, IrrbbError::Conflict { .. }));
        assert_eq!(store.count_loans().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_pagination_orders_by_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        let deposits: Vec<_> = (1..=5)
            .map(|i| savings(&format!("DEP{:03}", i), 100.0 * i as f64))
            .collect();
        assert_eq!(store.insert_deposits(&deposits).await.unwrap(), 5);

        let page = store.list_deposits(1, 2).await.unwrap();
        let ids: Vec<_> = page.iter().map(|d| d.terms.instrument_id.as_str()).collect();
        assert_eq!(ids, vec!["DEP002", "DEP003"]);
        assert!(store.list_deposits(10, 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scale_deposit_balances() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_deposits(&[savings("DEP001", 100.0), savings("DEP002", 300.0)])
            .await
            .unwrap();

        assert_eq!(store.scale_deposit_balances(2.5).await.unwrap(), 2);
        let balances: Vec<f64> = store
            .all_deposits()
            .await
            .unwrap()
            .iter()
            .map(|d| d.terms.balance)
            .collect();
        assert_eq!(balances, vec![250.0, 750.0]);
    }

    fn metric(scenario: &str) -> NewDashboardMetric {
        NewDashboardMetric {
            timestamp: date(2025, 1, 2),
            scenario: scenario.into(),
            eve_value: 1.0,
            nii_value: 2.0,
            eve_sensitivity: 0.1,
            nii_sensitivity: -0.1,
            total_assets_value: 3.0,
            total_liabilities_value: 2.0,
            portfolio_value: 3.0,
        }
    }

    fn single_instrument_records() -> SnapshotRecords {
        SnapshotRecords {
            repricing_buckets: vec![RepricingBucketEntry {
                scenario: "Base Case".into(),
                bucket: "0-3 Months".into(),
                instrument_id: "LOAN001".into(),
                instrument_type: "Loan".into(),
                notional: 10.0,
                position: Position::Asset,
            }],
            net_positions: vec![],
            composition: vec![],
            nii_drivers: vec![NiiDriver {
                scenario: "Base Case".into(),
                instrument_id: Some("LOAN001".into()),
                instrument_type: Some("Loan".into()),
                nii_contribution: 0.5,
                breakdown_type: Some("instrument".into()),
                breakdown_value: Some("LOAN001".into()),
            }],
        }
    }

    #[tokio::test]
    async fn test_metrics_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let empty = SnapshotRecords::default();
        for scenario in ["Base Case", "Parallel Up +200bps"] {
            store.save_snapshot(&metric(scenario), &empty).await.unwrap();
        }
        let metrics = store.list_dashboard_metrics(10).await.unwrap();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].metric.scenario, "Parallel Up +200bps");
        assert!(metrics[0].id > metrics[1].id);
        assert_eq!(store.list_dashboard_metrics(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_snapshot_writes_all_tables() {
        let store = SqliteStore::open_in_memory().unwrap();
        let saved = store
            .save_snapshot(&metric("Base Case"), &single_instrument_records())
            .await
            .unwrap();
        assert_eq!(saved.id, 1);
        assert_eq!(saved.metric.scenario, "Base Case");

        assert_eq!(store.count("dashboard_metrics").unwrap(), 1);
        assert_eq!(store.count("repricing_buckets").unwrap(), 1);
        assert_eq!(store.count("nii_drivers").unwrap(), 1);
        assert_eq!(store.count("repricing_net_positions").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_detail_insert_rolls_back_metric() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_drivers BEFORE INSERT ON nii_drivers
                 BEGIN SELECT RAISE(ABORT, 'drivers unavailable'); END;",
            )
            .unwrap();

        let result = store
            .save_snapshot(&metric("Base Case"), &single_instrument_records())
            .await;
        assert!(result.is_err());
        assert_eq!(store.count("dashboard_metrics").unwrap(), 0);
        assert_eq!(store.count("repricing_buckets").unwrap(), 0);
        assert!(store.list_dashboard_metrics(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ping() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("data").join("irrbb.sqlite");

        {
            let store = SqliteStore::open(&db_path).unwrap();
            store.create_loan(&floating_loan("LOAN001")).await.unwrap();
        }

        let reopened = SqliteStore::open(&db_path).unwrap();
        assert_eq!(reopened.count_loans().await.unwrap(), 1);
        let loan = reopened.all_loans().await.unwrap().remove(0);
        assert_eq!(loan.terms.repricing_frequency, Some(RepricingFrequency::Quarterly));
    }
}
