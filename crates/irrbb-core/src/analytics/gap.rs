//! NII repricing gap and EVE maturity gap.

use super::buckets::{
    BucketScheme, EVE_MATURITY, EVE_NON_MATURITY, NII_NON_SENSITIVE, NII_REPRICING,
};
use crate::models::{DepositTerms, DepositType, GapAnalysis, GapBucket, LoanTerms};
use chrono::NaiveDate;

/// NII bucket of a loan: fixed loans and loans with no reset date never reprice.
pub fn loan_repricing_bucket(loan: &LoanTerms, today: NaiveDate) -> &'static str {
    match loan.next_repricing_date {
        Some(date) if !loan.is_fixed() => NII_REPRICING.assign(Some(date), today),
        _ => NII_NON_SENSITIVE,
    }
}

/// NII bucket of a deposit: CDs reprice at maturity, others at their reset date.
pub fn deposit_repricing_bucket(deposit: &DepositTerms, today: NaiveDate) -> &'static str {
    match (deposit.deposit_type, deposit.maturity_date, deposit.next_repricing_date) {
        (_, None, None) => NII_NON_SENSITIVE,
        (DepositType::Cd, Some(maturity), _) => NII_REPRICING.assign(Some(maturity), today),
        (_, _, Some(next)) => NII_REPRICING.assign(Some(next), today),
        _ => NII_NON_SENSITIVE,
    }
}

/// EVE bucket of a loan, by contractual maturity.
pub fn loan_maturity_bucket(loan: &LoanTerms, today: NaiveDate) -> &'static str {
    EVE_MATURITY.assign(Some(loan.maturity_date), today)
}

/// EVE bucket of a deposit: only CDs have a contractual maturity.
pub fn deposit_maturity_bucket(deposit: &DepositTerms, today: NaiveDate) -> &'static str {
    match (deposit.deposit_type, deposit.maturity_date) {
        (DepositType::Cd, Some(maturity)) => EVE_MATURITY.assign(Some(maturity), today),
        _ => EVE_NON_MATURITY,
    }
}

/// Running assets/liabilities per bucket, in scheme order.
struct GapAccumulator {
    scheme: BucketScheme,
    totals: Vec<(f64, f64)>,
}

impl GapAccumulator {
    fn new(scheme: BucketScheme) -> Self {
        Self {
            scheme,
            totals: vec![(0.0, 0.0); scheme.buckets.len()],
        }
    }

    fn slot(&mut self, label: &str) -> &mut (f64, f64) {
        let idx = self
            .scheme
            .index_of(label)
            .or_else(|| self.scheme.index_of(self.scheme.fallback))
            .unwrap_or(self.totals.len() - 1);
        &mut self.totals[idx]
    }

    fn add_asset(&mut self, label: &str, amount: f64) {
        self.slot(label).0 += amount;
    }

    fn add_liability(&mut self, label: &str, amount: f64) {
        self.slot(label).1 += amount;
    }

    fn finish(self) -> Vec<GapBucket> {
        self.scheme
            .labels()
            .zip(self.totals)
            .map(|(label, (assets, liabilities))| GapBucket::new(label, assets, liabilities))
            .collect()
    }
}

/// Bucket the book into the NII repricing gap and EVE maturity gap.
///
/// Every bucket of both schemes is present in the output, empty or not.
pub fn calculate_gap_analysis(
    loans: &[LoanTerms],
    deposits: &[DepositTerms],
    today: NaiveDate,
) -> GapAnalysis {
    let mut nii = GapAccumulator::new(NII_REPRICING);
    let mut eve = GapAccumulator::new(EVE_MATURITY);

    for loan in loans {
        nii.add_asset(loan_repricing_bucket(loan, today), loan.notional);
        eve.add_asset(loan_maturity_bucket(loan, today), loan.notional);
    }
    for deposit in deposits {
        nii.add_liability(deposit_repricing_bucket(deposit, today), deposit.balance);
        eve.add_liability(deposit_maturity_bucket(deposit, today), deposit.balance);
    }

    GapAnalysis {
        nii_repricing_gap: nii.finish(),
        eve_maturity_gap: eve.finish(),
    }
}
