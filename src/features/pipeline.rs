//! Transaction table → numeric feature matrix.

use tracing::debug;

use crate::domain::FeatureMatrix;
use crate::error::EstimatorError;

use super::aggregate::aggregate_customers;
use super::encode::{MinMaxScaler, OneHotEncoder};
use super::transaction::{Transaction, extract_time_features};

/// Numeric columns, in output order, before the one-hot block.
pub const NUMERIC_COLUMNS: [&str; 6] = [
    "Amount",
    "Value",
    "TotalTransactionAmount",
    "AverageTransactionAmount",
    "TransactionCount",
    "StdTransactionAmount",
];

/// Categorical columns encoded drop-first, in output order.
pub const CATEGORICAL_COLUMNS: [&str; 9] = [
    "ProviderId",
    "ProductId",
    "ProductCategory",
    "ChannelId",
    "PricingStrategy",
    "TransactionHour",
    "TransactionDay",
    "TransactionMonth",
    "TransactionYear",
];

/// Engineered matrix plus the columns kept aside from it.
#[derive(Debug, Clone)]
pub struct EngineeredFeatures {
    pub matrix: FeatureMatrix,
    /// `FraudResult` per row.
    pub target: Vec<u8>,
    pub customer_ids: Vec<String>,
    pub transaction_ids: Vec<String>,
}

/// Aggregate, encode and scale `transactions` into one row per transaction.
///
/// Identifier columns (TransactionId, BatchId, AccountId, SubscriptionId,
/// CustomerId, CurrencyCode, CountryCode) never reach the matrix.
pub fn build_feature_matrix(transactions: &[Transaction]) -> Result<EngineeredFeatures, EstimatorError> {
    if transactions.is_empty() {
        return Err(EstimatorError::invalid("no transactions to engineer"));
    }

    let aggregates = aggregate_customers(transactions);
    let times = extract_time_features(transactions);

    let mut numeric: Vec<Vec<f64>> = vec![Vec::with_capacity(transactions.len()); NUMERIC_COLUMNS.len()];
    for t in transactions {
        let agg = aggregates
            .get(&t.customer_id)
            .ok_or_else(|| EstimatorError::invalid(format!("missing aggregate for customer {}", t.customer_id)))?;
        let row = [
            t.amount,
            t.value,
            agg.total_amount,
            agg.average_amount,
            agg.transaction_count as f64,
            agg.std_amount,
        ];
        for (col, v) in numeric.iter_mut().zip(row) {
            col.push(v);
        }
    }

    let categorical: Vec<[String; 9]> = transactions
        .iter()
        .zip(&times)
        .map(|(t, tf)| {
            [
                t.provider_id.clone(),
                t.product_id.clone(),
                t.product_category.clone(),
                t.channel_id.clone(),
                t.pricing_strategy.clone(),
                tf.hour.to_string(),
                tf.day.to_string(),
                tf.month.to_string(),
                tf.year.to_string(),
            ]
        })
        .collect();

    let encoder_input: Vec<(&str, Vec<String>)> = CATEGORICAL_COLUMNS
        .iter()
        .enumerate()
        .map(|(j, name)| (*name, categorical.iter().map(|row| row[j].clone()).collect()))
        .collect();
    let encoder = OneHotEncoder::fit(&encoder_input);
    let scaler = MinMaxScaler::fit(&numeric);

    let mut names: Vec<String> = NUMERIC_COLUMNS.iter().map(|s| s.to_string()).collect();
    names.extend(encoder.feature_names());

    let rows: Vec<Vec<f64>> = (0..transactions.len())
        .map(|i| {
            let mut row: Vec<f64> = (0..NUMERIC_COLUMNS.len())
                .map(|j| scaler.transform(j, numeric[j][i]))
                .collect();
            let cats: Vec<&str> = categorical[i].iter().map(String::as_str).collect();
            row.extend(encoder.transform_row(&cats));
            row
        })
        .collect();

    let matrix = FeatureMatrix::with_names(&rows, names)?;
    debug!(
        rows = matrix.nrows(),
        cols = matrix.ncols(),
        customers = aggregates.len(),
        "engineered feature matrix"
    );

    Ok(EngineeredFeatures {
        matrix,
        target: transactions.iter().map(|t| t.fraud_result).collect(),
        customer_ids: transactions.iter().map(|t| t.customer_id.clone()).collect(),
        transaction_ids: transactions.iter().map(|t| t.transaction_id.clone()).collect(),
    })
}
