//! Time buckets for repricing and maturity gap analysis.

use crate::config::BucketConfig;
use chrono::NaiveDate;

/// One bucket of a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketDef {
    pub label: &'static str,
    /// Inclusive upper bound in days from today; `None` means "beyond the
    /// previous bucket".
    pub upper_days: Option<i64>,
}

const fn bucket(label: &'static str, upper_days: Option<i64>) -> BucketDef {
    BucketDef { label, upper_days }
}

/// An ordered set of buckets, shortest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketScheme {
    pub buckets: &'static [BucketDef],
    /// Bucket for missing dates and dates no bucket accepts.
    pub fallback: &'static str,
}

const YEAR: i64 = BucketConfig::DAYS_PER_YEAR;

pub const NII_NON_SENSITIVE: &str = "Fixed Rate / Non-Sensitive";
pub const EVE_NON_MATURITY: &str = "Non-Maturity";

/// Buckets by next repricing date.
pub const NII_REPRICING: BucketScheme = BucketScheme {
    buckets: &[
        bucket("0-3 Months", Some(90)),
        bucket("3-6 Months", Some(180)),
        bucket("6-12 Months", Some(YEAR)),
        bucket("1-5 Years", Some(YEAR * 5)),
        bucket(">5 Years", Some(BucketConfig::LONGEST_BUCKET_DAYS)),
        bucket(NII_NON_SENSITIVE, None),
    ],
    fallback: NII_NON_SENSITIVE,
};

/// Buckets by maturity date.
pub const EVE_MATURITY: BucketScheme = BucketScheme {
    buckets: &[
        bucket("0-1 Year", Some(YEAR)),
        bucket("1-3 Years", Some(YEAR * 3)),
        bucket("3-5 Years", Some(YEAR * 5)),
        bucket("5-10 Years", Some(YEAR * 10)),
        bucket(">10 Years", Some(BucketConfig::LONGEST_BUCKET_DAYS)),
        bucket(EVE_NON_MATURITY, None),
    ],
    fallback: EVE_NON_MATURITY,
};

impl BucketScheme {
    /// Labels in scheme order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.buckets.iter().map(|b| b.label)
    }

    /// Position of a label within the scheme.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.buckets.iter().position(|b| b.label == label)
    }

    /// Assign a date to a bucket relative to `today`.
    ///
    /// Dates in the past count as due now and land in the first bucket.
    pub fn assign(&self, date: Option<NaiveDate>, today: NaiveDate) -> &'static str {
        let Some(date) = date else {
            return self.fallback;
        };
        let days = (date - today).num_days();

        let mut previous_upper = 0;
        for bucket in self.buckets {
            match bucket.upper_days {
                Some(upper) if days <= upper => return bucket.label,
                Some(upper) => previous_upper = upper,
                None if days > previous_upper => return bucket.label,
                None => {}
            }
        }
        self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    fn in_days(days: i64) -> Option<NaiveDate> {
        Some(today() + Duration::days(days))
    }

    #[test]
    fn test_nii_boundaries_are_inclusive() {
        assert_eq!(NII_REPRICING.assign(in_days(0), today()), "0-3 Months");
        assert_eq!(NII_REPRICING.assign(in_days(90), today()), "0-3 Months");
        assert_eq!(NII_REPRICING.assign(in_days(91), today()), "3-6 Months");
        assert_eq!(NII_REPRICING.assign(in_days(365), today()), "6-12 Months");
        assert_eq!(NII_REPRICING.assign(in_days(366), today()), "1-5 Years");
        assert_eq!(NII_REPRICING.assign(in_days(2000), today()), ">5 Years");
    }

    #[test]
    fn test_past_dates_land_in_first_bucket() {
        assert_eq!(NII_REPRICING.assign(in_days(-45), today()), "0-3 Months");
        assert_eq!(EVE_MATURITY.assign(in_days(-1), today()), "0-1 Year");
    }

    #[test]
    fn test_open_ended_bucket_beyond_longest() {
        assert_eq!(
            NII_REPRICING.assign(in_days(365 * 100 + 1), today()),
            NII_NON_SENSITIVE
        );
        assert_eq!(
            EVE_MATURITY.assign(in_days(365 * 100 + 1), today()),
            EVE_NON_MATURITY
        );
    }

    #[test]
    fn test_missing_date_uses_fallback() {
        assert_eq!(NII_REPRICING.assign(None, today()), NII_NON_SENSITIVE);
        assert_eq!(EVE_MATURITY.assign(None, today()), EVE_NON_MATURITY);
    }

    #[test]
    fn test_eve_maturity_buckets() {
        assert_eq!(EVE_MATURITY.assign(in_days(400), today()), "1-3 Years");
        assert_eq!(EVE_MATURITY.assign(in_days(365 * 5), today()), "3-5 Years");
        assert_eq!(EVE_MATURITY.assign(in_days(365 * 7), today()), "5-10 Years");
        assert_eq!(EVE_MATURITY.assign(in_days(365 * 20), today()), ">10 Years");
    }

    #[test]
    fn test_labels_in_order() {
        let labels: Vec<_> = EVE_MATURITY.labels().collect();
        assert_eq!(labels.first(), Some(&"0-1 Year"));
        assert_eq!(labels.last(), Some(&EVE_NON_MATURITY));
        assert_eq!(NII_REPRICING.index_of("6-12 Months"), Some(2));
        assert_eq!(NII_REPRICING.index_of("nope"), None);
    }
}
