//! Per-customer behavioral aggregates.

use std::collections::BTreeMap;

use super::transaction::Transaction;

/// Transaction amount statistics for one customer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerAggregate {
    pub total_amount: f64,
    pub average_amount: f64,
    pub transaction_count: usize,
    /// Sample standard deviation (n − 1). `0.0` for a single transaction.
    pub std_amount: f64,
}

/// Aggregate amounts by `CustomerId`.
pub fn aggregate_customers(transactions: &[Transaction]) -> BTreeMap<String, CustomerAggregate> {
    let mut amounts: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for t in transactions {
        amounts.entry(t.customer_id.clone()).or_default().push(t.amount);
    }

    amounts
        .into_iter()
        .map(|(customer, values)| (customer, summarize(&values)))
        .collect()
}

fn summarize(values: &[f64]) -> CustomerAggregate {
    let n = values.len();
    let total: f64 = values.iter().sum();
    let mean = total / n as f64;
    let std = if n < 2 {
        0.0
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    };
    CustomerAggregate {
        total_amount: total,
        average_amount: mean,
        transaction_count: n,
        std_amount: std,
    }
}
