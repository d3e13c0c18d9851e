//! Banking book instruments: loans (assets) and deposits (liabilities).

use crate::error::{IrrbbError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rate behaviour of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LoanType {
    #[serde(rename = "Fixed Rate Loan")]
    FixedRate,
    #[serde(rename = "Floating Rate Loan")]
    FloatingRate,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::FixedRate => "Fixed Rate Loan",
            LoanType::FloatingRate => "Floating Rate Loan",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Fixed Rate Loan" => Some(LoanType::FixedRate),
            "Floating Rate Loan" => Some(LoanType::FloatingRate),
            _ => None,
        }
    }
}

/// Product type of a deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DepositType {
    Checking,
    Savings,
    /// Certificate of deposit; reprices at maturity.
    #[serde(rename = "CD")]
    Cd,
}

impl DepositType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DepositType::Checking => "Checking",
            DepositType::Savings => "Savings",
            DepositType::Cd => "CD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Checking" => Some(DepositType::Checking),
            "Savings" => Some(DepositType::Savings),
            "CD" => Some(DepositType::Cd),
            _ => None,
        }
    }
}

/// How often an instrument's rate resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RepricingFrequency {
    Monthly,
    Quarterly,
    Annually,
}

impl RepricingFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepricingFrequency::Monthly => "Monthly",
            RepricingFrequency::Quarterly => "Quarterly",
            RepricingFrequency::Annually => "Annually",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Monthly" => Some(RepricingFrequency::Monthly),
            "Quarterly" => Some(RepricingFrequency::Quarterly),
            "Annually" => Some(RepricingFrequency::Annually),
            _ => None,
        }
    }

    /// Longest gap in days until the next reset.
    pub fn period_days(&self) -> i64 {
        match self {
            RepricingFrequency::Monthly => 30,
            RepricingFrequency::Quarterly => 90,
            RepricingFrequency::Annually => 365,
        }
    }
}

/// Contractual terms of a loan, as submitted by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub instrument_id: String,
    #[serde(rename = "type")]
    pub loan_type: LoanType,
    pub notional: f64,
    /// Annual rate; null for floating loans.
    #[serde(default)]
    pub interest_rate: Option<f64>,
    pub maturity_date: NaiveDate,
    pub origination_date: NaiveDate,
    #[serde(default)]
    pub benchmark_rate_type: Option<String>,
    /// Spread over the benchmark for floating loans.
    #[serde(default)]
    pub spread: Option<f64>,
    #[serde(default)]
    pub repricing_frequency: Option<RepricingFrequency>,
    #[serde(default)]
    pub next_repricing_date: Option<NaiveDate>,
}

impl LoanTerms {
    /// Reject terms that cannot be stored or analysed.
    pub fn validate(&self) -> Result<()> {
        validate_instrument_id(&self.instrument_id)?;
        validate_amount("notional", self.notional)?;
        validate_optional_rate("interest_rate", self.interest_rate)?;
        validate_optional_rate("spread", self.spread)?;
        if self.maturity_date < self.origination_date {
            return Err(IrrbbError::validation(
                "maturity_date",
                "must not precede origination_date",
            ));
        }
        Ok(())
    }

    pub fn is_fixed(&self) -> bool {
        self.loan_type == LoanType::FixedRate
    }
}

/// A stored loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    #[serde(flatten)]
    pub terms: LoanTerms,
}

/// Contractual terms of a deposit, as submitted by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositTerms {
    pub instrument_id: String,
    #[serde(rename = "type")]
    pub deposit_type: DepositType,
    pub balance: f64,
    pub interest_rate: f64,
    pub open_date: NaiveDate,
    /// Set for CDs; null for checking and savings.
    #[serde(default)]
    pub maturity_date: Option<NaiveDate>,
    #[serde(default)]
    pub repricing_frequency: Option<RepricingFrequency>,
    #[serde(default)]
    pub next_repricing_date: Option<NaiveDate>,
}

impl DepositTerms {
    /// Reject terms that cannot be stored or analysed.
    pub fn validate(&self) -> Result<()> {
        validate_instrument_id(&self.instrument_id)?;
        validate_amount("balance", self.balance)?;
        validate_optional_rate("interest_rate", Some(self.interest_rate))?;
        if let Some(maturity) = self.maturity_date {
            if maturity < self.open_date {
                return Err(IrrbbError::validation(
                    "maturity_date",
                    "must not precede open_date",
                ));
            }
        }
        Ok(())
    }
}

/// A stored deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: i64,
    #[serde(flatten)]
    pub terms: DepositTerms,
}

fn validate_instrument_id(instrument_id: &str) -> Result<()> {
    if instrument_id.trim().is_empty() {
        return Err(IrrbbError::validation("instrument_id", "must not be empty"));
    }
    Ok(())
}

fn validate_amount(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(IrrbbError::validation(
            field,
            "must be a finite, non-negative amount",
        ));
    }
    Ok(())
}

fn validate_optional_rate(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() => Err(IrrbbError::validation(field, "must be finite")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixed_loan() -> LoanTerms {
        LoanTerms {
            instrument_id: "LOAN001".into(),
            loan_type: LoanType::FixedRate,
            notional: 1_000_000.0,
            interest_rate: Some(0.05),
            maturity_date: date(2030, 1, 1),
            origination_date: date(2024, 1, 1),
            benchmark_rate_type: None,
            spread: None,
            repricing_frequency: None,
            next_repricing_date: None,
        }
    }

    #[test]
    fn test_loan_json_shape() {
        let loan = Loan {
            id: 3,
            terms: fixed_loan(),
        };
        let value = serde_json::to_value(&loan).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["type"], "Fixed Rate Loan");
        assert_eq!(value["maturity_date"], "2030-01-01");
        assert!(value["spread"].is_null());
    }

    #[test]
    fn test_deposit_accepts_missing_optionals() {
        let terms: DepositTerms = serde_json::from_value(json!({
            "instrument_id": "DEP001",
            "type": "CD",
            "balance": 2500.0,
            "interest_rate": 0.015,
            "open_date": "2024-03-01",
            "maturity_date": "2025-03-01"
        }))
        .unwrap();
        assert_eq!(terms.deposit_type, DepositType::Cd);
        assert_eq!(terms.repricing_frequency, None);
        assert!(terms.validate().is_ok());
    }

    #[test]
    fn test_unknown_loan_type_rejected() {
        let result: std::result::Result<LoanTerms, _> = serde_json::from_value(json!({
            "instrument_id": "LOAN009",
            "type": "Balloon Loan",
            "notional": 10.0,
            "maturity_date": "2030-01-01",
            "origination_date": "2024-01-01"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rules() {
        assert!(fixed_loan().validate().is_ok());

        let mut blank = fixed_loan();
        blank.instrument_id = "  ".into();
        assert!(matches!(
            blank.validate(),
            Err(IrrbbError::Validation { ref field, .. }) if field == "instrument_id"
        ));

        let mut negative = fixed_loan();
        negative.notional = -1.0;
        assert!(negative.validate().is_err());

        let mut backwards = fixed_loan();
        backwards.maturity_date = date(2023, 1, 1);
        assert!(matches!(
            backwards.validate(),
            Err(IrrbbError::Validation { ref field, .. }) if field == "maturity_date"
        ));
    }

    #[test]
    fn test_enum_string_round_trip() {
        for t in [DepositType::Checking, DepositType::Savings, DepositType::Cd] {
            assert_eq!(DepositType::parse(t.as_str()), Some(t));
        }
        assert_eq!(RepricingFrequency::parse("Weekly"), None);
        assert_eq!(RepricingFrequency::Quarterly.period_days(), 90);
    }
}
