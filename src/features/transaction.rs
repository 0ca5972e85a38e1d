//! Raw transaction record and derived time fields.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// One row of the transaction export. Field names follow the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    pub transaction_id: String,
    pub batch_id: String,
    pub account_id: String,
    pub subscription_id: String,
    pub customer_id: String,
    pub currency_code: String,
    pub country_code: String,
    pub provider_id: String,
    pub product_id: String,
    pub product_category: String,
    pub channel_id: String,
    pub amount: f64,
    pub value: f64,
    pub transaction_start_time: DateTime<Utc>,
    pub pricing_strategy: String,
    pub fraud_result: u8,
}

/// Calendar fields extracted from `TransactionStartTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFeatures {
    pub hour: u32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl TimeFeatures {
    pub fn from_timestamp(ts: &DateTime<Utc>) -> Self {
        Self {
            hour: ts.hour(),
            day: ts.day(),
            month: ts.month(),
            year: ts.year(),
        }
    }
}

pub fn extract_time_features(transactions: &[Transaction]) -> Vec<TimeFeatures> {
    transactions
        .iter()
        .map(|t| TimeFeatures::from_timestamp(&t.transaction_start_time))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_features_follow_utc_timestamp() {
        let ts = Utc.with_ymd_and_hms(2018, 11, 15, 2, 18, 49).unwrap();
        let tf = TimeFeatures::from_timestamp(&ts);
        assert_eq!(tf, TimeFeatures { hour: 2, day: 15, month: 11, year: 2018 });
    }
}
