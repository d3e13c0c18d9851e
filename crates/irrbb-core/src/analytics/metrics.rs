//! Net interest income and economic value of equity.
//!
//! Simplified book-level measures: NII is one year of contractual interest,
//! EVE is the book value of assets less liabilities. The rate sensitivities
//! are simulated until a proper shock model exists.

use super::round2;
use crate::config::AnalyticsConfig;
use crate::models::{CoreMetrics, DepositTerms, LoanTerms};
use rand::Rng;

/// Annual rate a loan earns under the current benchmark assumption.
///
/// Fixed loans use their contractual rate (missing counts as zero); floating
/// loans earn the benchmark plus spread.
pub fn effective_loan_rate(loan: &LoanTerms) -> f64 {
    if loan.is_fixed() {
        loan.interest_rate.unwrap_or(0.0)
    } else {
        AnalyticsConfig::BENCHMARK_RATE + loan.spread.unwrap_or(0.0)
    }
}

/// Annual interest earned on a loan.
pub fn loan_interest_income(loan: &LoanTerms) -> f64 {
    loan.notional * effective_loan_rate(loan)
}

/// Annual interest paid on a deposit.
pub fn deposit_interest_expense(deposit: &DepositTerms) -> f64 {
    deposit.balance * deposit.interest_rate
}

/// Deterministic part of [`CoreMetrics`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookTotals {
    pub interest_income: f64,
    pub interest_expense: f64,
    pub total_assets_value: f64,
    pub total_liabilities_value: f64,
}

impl BookTotals {
    pub fn net_interest_income(&self) -> f64 {
        self.interest_income - self.interest_expense
    }

    pub fn economic_value_of_equity(&self) -> f64 {
        self.total_assets_value - self.total_liabilities_value
    }
}

pub fn book_totals<'a, L, D>(loans: L, deposits: D) -> BookTotals
where
    L: IntoIterator<Item = &'a LoanTerms>,
    D: IntoIterator<Item = &'a DepositTerms>,
{
    let mut totals = BookTotals {
        interest_income: 0.0,
        interest_expense: 0.0,
        total_assets_value: 0.0,
        total_liabilities_value: 0.0,
    };
    for loan in loans {
        totals.interest_income += loan_interest_income(loan);
        totals.total_assets_value += loan.notional;
    }
    for deposit in deposits {
        totals.interest_expense += deposit_interest_expense(deposit);
        totals.total_liabilities_value += deposit.balance;
    }
    totals
}

/// Compute headline NII/EVE figures for the book.
pub fn calculate_nii_and_eve<R: Rng>(
    loans: &[LoanTerms],
    deposits: &[DepositTerms],
    rng: &mut R,
) -> CoreMetrics {
    let totals = book_totals(loans, deposits);

    let (eve_lo, eve_hi) = AnalyticsConfig::EVE_SENSITIVITY_RANGE;
    let (nii_lo, nii_hi) = AnalyticsConfig::NII_SENSITIVITY_RANGE;

    CoreMetrics {
        net_interest_income: totals.net_interest_income(),
        economic_value_of_equity: totals.economic_value_of_equity(),
        total_assets_value: totals.total_assets_value,
        total_liabilities_value: totals.total_liabilities_value,
        eve_sensitivity: round2(rng.random_range(eve_lo..=eve_hi)),
        nii_sensitivity: round2(rng.random_range(nii_lo..=nii_hi)),
        total_loans: loans.len(),
        total_deposits: deposits.len(),
    }
}
