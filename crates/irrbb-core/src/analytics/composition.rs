//! Portfolio composition by instrument type, category and subcategory.

use super::metrics::effective_loan_rate;
use crate::models::{DepositTerms, LoanTerms, PortfolioComposition};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const LOAN: &str = "Loan";
pub const DEPOSIT: &str = "Deposit";

#[derive(Default)]
struct Group {
    count: usize,
    amount: f64,
    rate_sum: f64,
}

impl Group {
    fn add(&mut self, amount: f64, rate: f64) {
        self.count += 1;
        self.amount += amount;
        self.rate_sum += rate;
    }
}

/// Group the book for composition charts.
///
/// Loans are grouped by rate type and benchmark, with their effective rate
/// averaged; deposits by product and repricing frequency, with their stated
/// rate averaged.
pub fn portfolio_composition(
    loans: &[LoanTerms],
    deposits: &[DepositTerms],
    as_of: NaiveDate,
) -> Vec<PortfolioComposition> {
    let mut groups: BTreeMap<(&'static str, String, Option<String>), Group> = BTreeMap::new();

    for loan in loans {
        let key = (
            LOAN,
            loan.loan_type.as_str().to_string(),
            loan.benchmark_rate_type.clone(),
        );
        groups
            .entry(key)
            .or_default()
            .add(loan.notional, effective_loan_rate(loan));
    }

    for deposit in deposits {
        let key = (
            DEPOSIT,
            deposit.deposit_type.as_str().to_string(),
            deposit.repricing_frequency.map(|f| f.as_str().to_string()),
        );
        groups
            .entry(key)
            .or_default()
            .add(deposit.balance, deposit.interest_rate);
    }

    groups
        .into_iter()
        .map(|((instrument_type, category, subcategory), group)| PortfolioComposition {
            timestamp: as_of,
            instrument_type: instrument_type.to_string(),
            category,
            subcategory,
            volume_count: group.count,
            total_amount: group.amount,
            average_interest_rate: Some(group.rate_sum / group.count as f64),
        })
        .collect()
}
