//! Demo banking book for empty databases.

use crate::analytics::{round2, round_to};
use crate::config::SeedConfig;
use crate::error::Result;
use crate::models::{DepositTerms, DepositType, LoanTerms, LoanType, RepricingFrequency};
use crate::store::InstrumentStore;
use chrono::{Duration, NaiveDate};
use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, info};

const LOAN_TYPES: [LoanType; 2] = [LoanType::FixedRate, LoanType::FloatingRate];
const DEPOSIT_TYPES: [DepositType; 3] = [
    DepositType::Checking,
    DepositType::Savings,
    DepositType::Cd,
];
const LOAN_FREQUENCIES: [RepricingFrequency; 3] = [
    RepricingFrequency::Monthly,
    RepricingFrequency::Quarterly,
    RepricingFrequency::Annually,
];
const DEPOSIT_FREQUENCIES: [RepricingFrequency; 2] =
    [RepricingFrequency::Monthly, RepricingFrequency::Quarterly];

/// How many rows each table received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    pub loans: usize,
    pub deposits: usize,
}

fn uniform<R: Rng>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    rng.random_range(lo..=hi)
}

fn pick<T: Copy, R: Rng>(rng: &mut R, items: &[T]) -> T {
    // every slice passed here is a non-empty const
    *items.choose(rng).unwrap_or(&items[0])
}

/// Generate `LOAN001..` with random terms relative to `today`.
pub fn generate_demo_loans<R: Rng>(rng: &mut R, today: NaiveDate, count: usize) -> Vec<LoanTerms> {
    (1..=count)
        .map(|n| {
            let loan_type = pick(rng, &LOAN_TYPES);
            let notional = round2(uniform(rng, SeedConfig::LOAN_NOTIONAL_RANGE));
            let rate = round_to(uniform(rng, SeedConfig::LOAN_RATE_RANGE), 4);
            let origination_date = today - Duration::days(rng.random_range(30..=1000));
            let maturity_date = origination_date + Duration::days(rng.random_range(365..=3650));

            let mut terms = LoanTerms {
                instrument_id: format!("LOAN{n:03}"),
                loan_type,
                notional,
                interest_rate: Some(rate),
                maturity_date,
                origination_date,
                benchmark_rate_type: None,
                spread: None,
                repricing_frequency: None,
                next_repricing_date: None,
            };

            if loan_type == LoanType::FloatingRate {
                let frequency = pick(rng, &LOAN_FREQUENCIES);
                terms.interest_rate = None;
                terms.benchmark_rate_type = Some(pick(rng, &SeedConfig::BENCHMARKS).to_string());
                terms.spread = Some(round_to(uniform(rng, SeedConfig::LOAN_SPREAD_RANGE), 4));
                terms.repricing_frequency = Some(frequency);
                terms.next_repricing_date =
                    Some(today + Duration::days(rng.random_range(0..=frequency.period_days())));
            }
            terms
        })
        .collect()
}

/// Generate `DEP001..` with random terms relative to `today`.
///
/// CDs carry a maturity and never a reset date; checking and savings
/// accounts reprice monthly or quarterly.
pub fn generate_demo_deposits<R: Rng>(
    rng: &mut R,
    today: NaiveDate,
    count: usize,
) -> Vec<DepositTerms> {
    (1..=count)
        .map(|n| {
            let deposit_type = pick(rng, &DEPOSIT_TYPES);
            let balance = round2(uniform(rng, SeedConfig::DEPOSIT_BALANCE_RANGE));
            let interest_rate = round_to(uniform(rng, SeedConfig::DEPOSIT_RATE_RANGE), 4);
            let open_date = today - Duration::days(rng.random_range(10..=500));

            let mut terms = DepositTerms {
                instrument_id: format!("DEP{n:03}"),
                deposit_type,
                balance,
                interest_rate,
                open_date,
                maturity_date: None,
                repricing_frequency: None,
                next_repricing_date: None,
            };

            if deposit_type == DepositType::Cd {
                terms.maturity_date = Some(open_date + Duration::days(rng.random_range(90..=730)));
            } else {
                let frequency = pick(rng, &DEPOSIT_FREQUENCIES);
                terms.repricing_frequency = Some(frequency);
                terms.next_repricing_date =
                    Some(today + Duration::days(rng.random_range(0..=frequency.period_days())));
            }
            terms
        })
        .collect()
}

/// Populate empty instrument tables with the demo book.
///
/// Tables that already hold rows are left alone.
pub async fn seed_if_empty<R: Rng + Send>(
    store: &dyn InstrumentStore,
    rng: &mut R,
    today: NaiveDate,
) -> Result<SeedOutcome> {
    let mut outcome = SeedOutcome::default();

    if store.count_loans().await? == 0 {
        let loans = generate_demo_loans(rng, today, SeedConfig::LOAN_COUNT);
        outcome.loans = store.insert_loans(&loans).await?;
        info!("Seeded {} demo loans", outcome.loans);
    } else {
        debug!("Loans table not empty, skipping seed");
    }

    if store.count_deposits().await? == 0 {
        let deposits = generate_demo_deposits(rng, today, SeedConfig::DEPOSIT_COUNT);
        outcome.deposits = store.insert_deposits(&deposits).await?;
        info!("Seeded {} demo deposits", outcome.deposits);
    } else {
        debug!("Deposits table not empty, skipping seed");
    }

    Ok(outcome)
}
