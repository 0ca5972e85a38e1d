//! CSV exports.
//!
//! Everything here is meant to be easy to consume in spreadsheets or downstream
//! scripts: one header row, plain numbers, empty cells for missing values.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{FeatureMatrix, ScoredRecord, WoeTable};
use crate::error::AppError;
use crate::features::Transaction;

/// Write the per-bin WoE table.
pub fn write_woe_csv(path: &Path, table: &WoeTable) -> Result<(), AppError> {
    let mut file = create(path, "WoE CSV")?;

    writeln!(
        file,
        "bin,lower,upper,count,default_count,non_default_count,bad_rate,good_rate,woe"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write WoE CSV header: {e}")))?;

    for s in &table.bins {
        writeln!(
            file,
            "{},{:.10},{:.10},{},{},{},{:.10},{:.10},{:.10}",
            s.bin.index,
            s.bin.lower,
            s.bin.upper,
            s.count,
            s.default_count,
            s.non_default_count,
            s.bad_rate,
            s.good_rate,
            s.woe,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write WoE CSV row: {e}")))?;
    }

    Ok(())
}

/// Write one scored row per record, in input order.
pub fn write_predictions_csv(path: &Path, records: &[ScoredRecord]) -> Result<(), AppError> {
    let mut file = create(path, "predictions CSV")?;

    writeln!(file, "row,rfms_score,proxy_label,predicted_bad,p_bad,bin,woe")
        .map_err(|e| AppError::new(2, format!("Failed to write predictions CSV header: {e}")))?;

    for (i, r) in records.iter().enumerate() {
        writeln!(
            file,
            "{},{},{},{},{:.6},{},{}",
            i,
            fmt_opt_f64(Some(r.score).filter(|s| s.is_finite())),
            r.label,
            r.predicted,
            r.p_bad,
            r.bin.map(|b| b.to_string()).unwrap_or_default(),
            fmt_opt_f64(r.woe),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write predictions CSV row: {e}")))?;
    }

    Ok(())
}

/// Write an engineered feature matrix with its column names as the header.
pub fn write_features_csv(path: &Path, matrix: &FeatureMatrix) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create features CSV '{}': {e}", path.display())))?;
    writer
        .write_record(matrix.names())
        .map_err(|e| AppError::new(2, format!("Failed to write features CSV header: {e}")))?;
    for i in 0..matrix.nrows() {
        // Shortest round-trip representation; non-finite values become empty cells.
        let row: Vec<String> = matrix
            .row(i)
            .iter()
            .map(|v| if v.is_finite() { v.to_string() } else { String::new() })
            .collect();
        writer
            .write_record(&row)
            .map_err(|e| AppError::new(2, format!("Failed to write features CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush features CSV: {e}")))?;
    Ok(())
}

/// Write transactions in the export's own column layout.
pub fn write_transactions_csv(path: &Path, transactions: &[Transaction]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create transactions CSV '{}': {e}", path.display())))?;
    for t in transactions {
        writer
            .serialize(t)
            .map_err(|e| AppError::new(2, format!("Failed to write transaction {}: {e}", t.transaction_id)))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush transactions CSV: {e}")))?;
    Ok(())
}

fn create(path: &Path, what: &str) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::new(2, format!("Failed to create {what} '{}': {e}", path.display())))
}

fn fmt_opt_f64(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.10}")).unwrap_or_default()
}
