//! Synthetic transaction generation.
//!
//! Produces a Xente-shaped transaction table so the pipeline can be run end to
//! end without access to the real export. Output is a pure function of the
//! config (seeded `StdRng`).

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::LogNormal;

use crate::error::AppError;
use crate::features::Transaction;

const PROVIDERS: [&str; 6] = [
    "ProviderId_1",
    "ProviderId_3",
    "ProviderId_4",
    "ProviderId_5",
    "ProviderId_6",
    "ProviderId_2",
];
const CATEGORIES: [&str; 5] = ["airtime", "financial_services", "utility_bill", "data_bundles", "tv"];
const CHANNELS: [&str; 3] = ["ChannelId_3", "ChannelId_2", "ChannelId_1"];
const PRICING: [&str; 4] = ["2", "4", "1", "0"];

/// Window the timestamps are drawn from (90 days).
const WINDOW_SECONDS: i64 = 90 * 24 * 3600;
/// Share of transactions that are refunds/credits (negative amount).
const CREDIT_SHARE: f64 = 0.4;
/// Base fraud rate; amounts in the top tail are flagged more often.
const FRAUD_RATE: f64 = 0.002;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleConfig {
    pub count: usize,
    pub customers: usize,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 1_000,
            customers: 100,
            seed: 42,
        }
    }
}

pub fn generate_transactions(config: &SampleConfig) -> Result<Vec<Transaction>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    if config.customers == 0 {
        return Err(AppError::new(2, "Customer count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let amount_dist = LogNormal::<f64>::new(7.0, 1.5)
        .map_err(|e| AppError::new(4, format!("Amount distribution error: {e}")))?;
    let start = window_start()?;

    let mut out = Vec::with_capacity(config.count);
    for i in 0..config.count {
        let customer = rng.gen_range(1..=config.customers);
        let magnitude = amount_dist.sample(&mut rng).round().max(1.0);
        let amount = if rng.gen_bool(CREDIT_SHARE) { -magnitude } else { magnitude };
        let offset = rng.gen_range(0..WINDOW_SECONDS);

        // Large debits carry most of the fraud mass.
        let fraud_p = if magnitude > 200_000.0 { 0.25 } else { FRAUD_RATE };
        let fraud_result = u8::from(amount > 0.0 && rng.gen_bool(fraud_p));

        let product = rng.gen_range(1..=15);
        out.push(Transaction {
            transaction_id: format!("TransactionId_{}", 1000 + i),
            batch_id: format!("BatchId_{}", rng.gen_range(1..=config.count.max(2))),
            account_id: format!("AccountId_{customer}"),
            subscription_id: format!("SubscriptionId_{customer}"),
            customer_id: format!("CustomerId_{customer}"),
            currency_code: "UGX".to_string(),
            country_code: "256".to_string(),
            provider_id: pick(&mut rng, &PROVIDERS),
            product_id: format!("ProductId_{product}"),
            product_category: pick(&mut rng, &CATEGORIES),
            channel_id: pick(&mut rng, &CHANNELS),
            amount,
            value: magnitude,
            transaction_start_time: start + Duration::seconds(offset),
            pricing_strategy: pick(&mut rng, &PRICING),
            fraud_result,
        });
    }

    out.sort_by_key(|t| t.transaction_start_time);
    Ok(out)
}

fn pick(rng: &mut StdRng, options: &[&str]) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

fn window_start() -> Result<DateTime<Utc>, AppError> {
    Utc.with_ymd_and_hms(2018, 11, 15, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::new(4, "Invalid sample window start."))
}
