//! PostgreSQL-backed instrument store.

use super::traits::InstrumentStore;
use crate::error::{IrrbbError, Result};
use crate::models::{
    DashboardMetric, Deposit, DepositTerms, DepositType, Loan, LoanTerms, LoanType,
    NewDashboardMetric, RepricingFrequency, SnapshotRecords,
};
use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tokio_postgres::{Client, Config, GenericClient, NoTls, Row};
use tracing::{debug, error, info, warn};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS loans (
    id BIGSERIAL PRIMARY KEY,
    instrument_id TEXT NOT NULL UNIQUE,
    type TEXT NOT NULL,
    notional DOUBLE PRECISION NOT NULL,
    interest_rate DOUBLE PRECISION,
    maturity_date DATE NOT NULL,
    origination_date DATE NOT NULL,
    benchmark_rate_type TEXT,
    spread DOUBLE PRECISION,
    repricing_frequency TEXT,
    next_repricing_date DATE
);

CREATE TABLE IF NOT EXISTS deposits (
    id BIGSERIAL PRIMARY KEY,
    instrument_id TEXT NOT NULL UNIQUE,
    type TEXT NOT NULL,
    balance DOUBLE PRECISION NOT NULL,
    interest_rate DOUBLE PRECISION NOT NULL,
    open_date DATE NOT NULL,
    maturity_date DATE,
    repricing_frequency TEXT,
    next_repricing_date DATE
);

CREATE TABLE IF NOT EXISTS dashboard_metrics (
    id BIGSERIAL PRIMARY KEY,
    timestamp DATE NOT NULL,
    scenario TEXT NOT NULL,
    eve_value DOUBLE PRECISION NOT NULL,
    nii_value DOUBLE PRECISION NOT NULL,
    eve_sensitivity DOUBLE PRECISION NOT NULL,
    nii_sensitivity DOUBLE PRECISION NOT NULL,
    total_assets_value DOUBLE PRECISION NOT NULL,
    total_liabilities_value DOUBLE PRECISION NOT NULL,
    portfolio_value DOUBLE PRECISION NOT NULL
);

CREATE TABLE IF NOT EXISTS repricing_buckets (
    id BIGSERIAL PRIMARY KEY,
    scenario TEXT NOT NULL,
    bucket TEXT NOT NULL,
    instrument_id TEXT NOT NULL,
    instrument_type TEXT NOT NULL,
    notional DOUBLE PRECISION NOT NULL,
    position TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS repricing_net_positions (
    id BIGSERIAL PRIMARY KEY,
    scenario TEXT NOT NULL,
    bucket TEXT NOT NULL,
    total_assets DOUBLE PRECISION NOT NULL,
    total_liabilities DOUBLE PRECISION NOT NULL,
    net_position DOUBLE PRECISION NOT NULL,
    nii_base DOUBLE PRECISION NOT NULL,
    nii_shocked DOUBLE PRECISION NOT NULL
);

CREATE TABLE IF NOT EXISTS portfolio_composition (
    id BIGSERIAL PRIMARY KEY,
    timestamp DATE NOT NULL,
    instrument_type TEXT NOT NULL,
    category TEXT NOT NULL,
    subcategory TEXT,
    volume_count BIGINT NOT NULL,
    total_amount DOUBLE PRECISION NOT NULL,
    average_interest_rate DOUBLE PRECISION
);

CREATE TABLE IF NOT EXISTS nii_drivers (
    id BIGSERIAL PRIMARY KEY,
    scenario TEXT NOT NULL,
    instrument_id TEXT,
    instrument_type TEXT,
    nii_contribution DOUBLE PRECISION NOT NULL,
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

const INSERT_LOAN: &str = "INSERT INTO loans (instrument_id, type, notional, interest_rate,
                                              maturity_date, origination_date,
                                              benchmark_rate_type, spread,
                                              repricing_frequency, next_repricing_date)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
     RETURNING id";

const INSERT_DEPOSIT: &str = "INSERT INTO deposits (instrument_id, type, balance, interest_rate,
                                                    open_date, maturity_date,
                                                    repricing_frequency, next_repricing_date)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
     RETURNING id";

/// PostgreSQL instrument store.
///
/// Holds a single client; the connection task runs on the tokio runtime.
/// A client whose connection has dropped is replaced on next use.
pub struct PostgresStore {
    config: Config,
    client: Mutex<Client>,
}

impl PostgresStore {
    /// Connect using a libpq-style URL and create the schema if missing.
    pub async fn connect(url: &str) -> Result<Self> {
        let config = url.parse::<Config>().map_err(|e| IrrbbError::Postgres {
            message: format!("Invalid PostgreSQL URL: {}", e),
            source: Some(e),
        })?;
        Self::connect_with(config).await
    }

    /// Connect with an already parsed configuration.
    pub async fn connect_with(config: Config) -> Result<Self> {
        let client = Self::open_client(&config).await?;
        client
            .batch_execute(SCHEMA)
            .await
            .map_err(|e| IrrbbError::Postgres {
                message: format!("Failed to initialize schema: {}", e),
                source: Some(e),
            })?;
        debug!("PostgreSQL schema ready");

        Ok(Self {
            config,
            client: Mutex::new(client),
        })
    }

    async fn open_client(config: &Config) -> Result<Client> {
        let (client, connection) =
            config
                .connect(NoTls)
                .await
                .map_err(|e| IrrbbError::Postgres {
                    message: format!("Failed to connect to PostgreSQL: {}", e),
                    source: Some(e),
                })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {}", e);
            }
        });

        Ok(client)
    }

    /// Lock the client, reconnecting first if its connection has closed.
    async fn client(&self) -> Result<MutexGuard<'_, Client>> {
        let mut client = self.client.lock().await;
        if client.is_closed() {
            warn!("PostgreSQL connection closed, reconnecting");
            *client = Self::open_client(&self.config).await?;
            info!("PostgreSQL connection re-established");
        }
        Ok(client)
    }

    fn row_to_loan(row: &Row) -> Result<Loan> {
        let loan_type: String = row.try_get(2)?;
        let frequency: Option<String> = row.try_get(9)?;
        Ok(Loan {
            id: row.try_get(0)?,
            terms: LoanTerms {
                instrument_id: row.try_get(1)?,
                loan_type: parse_column("loans.type", &loan_type, LoanType::parse)?,
                notional: row.try_get(3)?,
                interest_rate: row.try_get(4)?,
                maturity_date: row.try_get(5)?,
                origination_date: row.try_get(6)?,
                benchmark_rate_type: row.try_get(7)?,
                spread: row.try_get(8)?,
                repricing_frequency: frequency
                    .map(|f| {
                        parse_column("loans.repricing_frequency", &f, RepricingFrequency::parse)
                    })
                    .transpose()?,
                next_repricing_date: row.try_get(10)?,
            },
        })
    }

    fn row_to_deposit(row: &Row) -> Result<Deposit> {
        let deposit_type: String = row.try_get(2)?;
        let frequency: Option<String> = row.try_get(7)?;
        Ok(Deposit {
            id: row.try_get(0)?,
            terms: DepositTerms {
                instrument_id: row.try_get(1)?,
                deposit_type: parse_column("deposits.type", &deposit_type, DepositType::parse)?,
                balance: row.try_get(3)?,
                interest_rate: row.try_get(4)?,
                open_date: row.try_get(5)?,
                maturity_date: row.try_get(6)?,
                repricing_frequency: frequency
                    .map(|f| {
                        parse_column(
                            "deposits.repricing_frequency",
                            &f,
                            RepricingFrequency::parse,
                        )
                    })
                    .transpose()?,
                next_repricing_date: row.try_get(8)?,
            },
        })
    }

    fn row_to_metric(row: &Row) -> Result<DashboardMetric> {
        Ok(DashboardMetric {
            id: row.try_get(0)?,
            metric: NewDashboardMetric {
                timestamp: row.try_get(1)?,
                scenario: row.try_get(2)?,
                eve_value: row.try_get(3)?,
                nii_value: row.try_get(4)?,
                eve_sensitivity: row.try_get(5)?,
                nii_sensitivity: row.try_get(6)?,
                total_assets_value: row.try_get(7)?,
                total_liabilities_value: row.try_get(8)?,
                portfolio_value: row.try_get(9)?,
            },
        })
    }

    async fn insert_loan<C: GenericClient + Sync>(client: &C, terms: &LoanTerms) -> Result<i64> {
        let row = client
            .query_one(
                INSERT_LOAN,
                &[
                    &terms.instrument_id,
                    &terms.loan_type.as_str(),
                    &terms.notional,
                    &terms.interest_rate,
                    &terms.maturity_date,
                    &terms.origination_date,
                    &terms.benchmark_rate_type,
                    &terms.spread,
                    &terms.repricing_frequency.map(|f| f.as_str()),
                    &terms.next_repricing_date,
                ],
            )
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn insert_deposit<C: GenericClient + Sync>(
        client: &C,
        terms: &DepositTerms,
    ) -> Result<i64> {
        let row = client
            .query_one(
                INSERT_DEPOSIT,
                &[
                    &terms.instrument_id,
                    &terms.deposit_type.as_str(),
                    &terms.balance,
                    &terms.interest_rate,
                    &terms.open_date,
                    &terms.maturity_date,
                    &terms.repricing_frequency.map(|f| f.as_str()),
                    &terms.next_repricing_date,
                ],
            )
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn insert_metric<C: GenericClient + Sync>(
        client: &C,
        metric: &NewDashboardMetric,
    ) -> Result<i64> {
        let row = client
            .query_one(
                "INSERT INTO dashboard_metrics (timestamp, scenario, eve_value, nii_value,
                                                eve_sensitivity, nii_sensitivity,
                                                total_assets_value, total_liabilities_value,
                                                portfolio_value)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 RETURNING id",
                &[
                    &metric.timestamp,
                    &metric.scenario,
                    &metric.eve_value,
                    &metric.nii_value,
                    &metric.eve_sensitivity,
                    &metric.nii_sensitivity,
                    &metric.total_assets_value,
                    &metric.total_liabilities_value,
                    &metric.portfolio_value,
                ],
            )
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn count(&self, table: &str) -> Result<usize> {
        let client = self.client().await?;
        let row = client
            .query_one(format!("SELECT COUNT(*) FROM {}", table).as_str(), &[])
            .await?;
        let count: i64 = row.try_get(0)?;
        Ok(count as usize)
    }
}

fn parse_column<T>(column: &str, raw: &str, parse: fn(&str) -> Option<T>) -> Result<T> {
    parse(raw).ok_or_else(|| IrrbbError::Other(format!("Unexpected value '{}' in {}", raw, column)))
}

#[async_trait]
impl InstrumentStore for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<()> {
        let client = self.client().await?;
        client.batch_execute("SELECT 1").await?;
        Ok(())
    }

    async fn count_loans(&self) -> Result<usize> {
        self.count("loans").await
    }

    async fn get_loan(&self, id: i64) -> Result<Option<Loan>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                format!("SELECT {} FROM loans WHERE id = $1", LOAN_COLUMNS).as_str(),
                &[&id],
            )
            .await?;
        row.as_ref().map(Self::row_to_loan).transpose()
    }

    async fn list_loans(&self, skip: u32, limit: u32) -> Result<Vec<Loan>> {
        let sql = format!("SELECT {} FROM loans ORDER BY id LIMIT $1 OFFSET $2", LOAN_COLUMNS);
        let client = self.client().await?;
        let rows = client.query(sql.as_str(), &[&i64::from(limit), &i64::from(skip)]).await?;
        rows.iter().map(Self::row_to_loan).collect()
    }

    async fn all_loans(&self) -> Result<Vec<Loan>> {
        let client = self.client().await?;
        let rows = client
            .query(format!("SELECT {} FROM loans ORDER BY id", LOAN_COLUMNS).as_str(), &[])
            .await?;
        rows.iter().map(Self::row_to_loan).collect()
    }

    async fn create_loan(&self, terms: &LoanTerms) -> Result<Loan> {
        let client = self.client().await?;
        let id = Self::insert_loan(&*client, terms).await?;
        debug!("Created loan {} ({})", id, terms.instrument_id);
        Ok(Loan {
            id,
            terms: terms.clone(),
        })
    }

    async fn insert_loans(&self, loans: &[LoanTerms]) -> Result<usize> {
        let mut client = self.client().await?;
        let tx = client.transaction().await?;
        for terms in loans {
            Self::insert_loan(&tx, terms).await?;
        }
        tx.commit().await?;
        Ok(loans.len())
    }

    async fn count_deposits(&self) -> Result<usize> {
        self.count("deposits").await
    }

    async fn get_deposit(&self, id: i64) -> Result<Option<Deposit>> {
        let client = self.client().await?;
        let row = client
            .query_opt(
                format!("SELECT {} FROM deposits WHERE id = $1", DEPOSIT_COLUMNS).as_str(),
                &[&id],
            )
            .await?;
        row.as_ref().map(Self::row_to_deposit).transpose()
    }

    async fn list_deposits(&self, skip: u32, limit: u32) -> Result<Vec<Deposit>> {
        let sql = format!(
            "SELECT {} FROM deposits ORDER BY id LIMIT $1 OFFSET $2",
            DEPOSIT_COLUMNS
        );
        let client = self.client().await?;
        let rows = client.query(sql.as_str(), &[&i64::from(limit), &i64::from(skip)]).await?;
        rows.iter().map(Self::row_to_deposit).collect()
    }

    async fn all_deposits(&self) -> Result<Vec<Deposit>> {
        let client = self.client().await?;
        let rows = client
            .query(
                format!("SELECT {} FROM deposits ORDER BY id", DEPOSIT_COLUMNS).as_str(),
                &[],
            )
            .await?;
        rows.iter().map(Self::row_to_deposit).collect()
    }

    async fn create_deposit(&self, terms: &DepositTerms) -> Result<Deposit> {
        let client = self.client().await?;
        let id = Self::insert_deposit(&*client, terms).await?;
        debug!("Created deposit {} ({})", id, terms.instrument_id);
        Ok(Deposit {
            id,
            terms: terms.clone(),
        })
    }

    async fn insert_deposits(&self, deposits: &[DepositTerms]) -> Result<usize> {
        let mut client = self.client().await?;
        let tx = client.transaction().await?;
        for terms in deposits {
            Self::insert_deposit(&tx, terms).await?;
        }
        tx.commit().await?;
        Ok(deposits.len())
    }

    async fn scale_deposit_balances(&self, factor: f64) -> Result<usize> {
        let client = self.client().await?;
        let updated = client
            .execute("UPDATE deposits SET balance = balance * $1", &[&factor])
            .await?;
        Ok(updated as usize)
    }

    async fn list_dashboard_metrics(&self, limit: u32) -> Result<Vec<DashboardMetric>> {
        let sql = format!(
            "SELECT {} FROM dashboard_metrics ORDER BY id DESC LIMIT $1",
            METRIC_COLUMNS
        );
        let client = self.client().await?;
        let rows = client.query(sql.as_str(), &[&i64::from(limit)]).await?;
        rows.iter().map(Self::row_to_metric).collect()
    }

    async fn save_snapshot(
        &self,
        metric: &NewDashboardMetric,
        records: &SnapshotRecords,
    ) -> Result<DashboardMetric> {
        let mut client = self.client().await?;
        let tx = client.transaction().await?;
        let id = Self::insert_metric(&tx, metric).await?;

        for entry in &records.repricing_buckets {
            tx.execute(
                "INSERT INTO repricing_buckets (scenario, bucket, instrument_id, instrument_type,
                                                notional, position)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &entry.scenario,
                    &entry.bucket,
                    &entry.instrument_id,
                    &entry.instrument_type,
                    &entry.notional,
                    &entry.position.as_str(),
                ],
            )
            .await?;
        }

        for net in &records.net_positions {
            tx.execute(
                "INSERT INTO repricing_net_positions (scenario, bucket, total_assets,
                                                      total_liabilities, net_position,
                                                      nii_base, nii_shocked)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    &net.scenario,
                    &net.bucket,
                    &net.total_assets,
                    &net.total_liabilities,
                    &net.net_position,
                    &net.nii_base,
                    &net.nii_shocked,
                ],
            )
            .await?;
        }

        for row in &records.composition {
            tx.execute(
                "INSERT INTO portfolio_composition (timestamp, instrument_type, category,
                                                    subcategory, volume_count, total_amount,
                                                    average_interest_rate)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    &row.timestamp,
                    &row.instrument_type,
                    &row.category,
                    &row.subcategory,
                    &(row.volume_count as i64),
                    &row.total_amount,
                    &row.average_interest_rate,
                ],
            )
            .await?;
        }

        for driver in &records.nii_drivers {
            tx.execute(
                "INSERT INTO nii_drivers (scenario, instrument_id, instrument_type,
                                          nii_contribution, breakdown_type, breakdown_value)
                 VALUES ($1, $2, $3, $4, $5, $6)",
                &[
                    &driver.scenario,
                    &driver.instrument_id,
                    &driver.instrument_type,
                    &driver.nii_contribution,
                    &driver.breakdown_type,
                    &driver.breakdown_value,
                ],
            )
            .await?;
        }

        tx.commit().await?;
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
