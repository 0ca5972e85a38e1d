//! CSV ingest.
//!
//! Two inputs are supported:
//!
//! - the raw transaction export (header-mapped onto [`Transaction`])
//! - an engineered feature table (every column numeric)
//!
//! Rows that fail to parse are skipped and reported as [`RowError`]s; a file
//! with no usable rows is an error (exit code 2).

use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, warn};

use crate::domain::FeatureMatrix;
use crate::error::AppError;
use crate::features::Transaction;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct IngestedTransactions {
    pub transactions: Vec<Transaction>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

#[derive(Debug, Clone)]
pub struct IngestedFeatures {
    pub matrix: FeatureMatrix,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

pub fn read_transactions_csv(path: &Path) -> Result<IngestedTransactions, AppError> {
    let mut reader = open_reader(path)?;
    let mut headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    headers = clean_headers(&headers);
    reader.set_headers(headers.clone());

    let mut transactions = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match record.deserialize::<Transaction>(Some(&headers)) {
            Ok(t) => transactions.push(t),
            Err(e) => row_errors.push(RowError {
                line,
                id: record_id(&record, &headers, "TransactionId"),
                message: e.to_string(),
            }),
        }
    }

    log_row_errors(path, &row_errors);
    if transactions.is_empty() {
        return Err(AppError::new(
            2,
            format!("No valid transactions in '{}'.", path.display()),
        ));
    }
    debug!(path = %path.display(), rows_read, rows_used = transactions.len(), "read transactions");

    Ok(IngestedTransactions {
        transactions,
        row_errors,
        rows_read,
    })
}

/// Read a numeric feature table. Empty cells read as NaN.
pub fn read_features_csv(path: &Path) -> Result<IngestedFeatures, AppError> {
    let mut reader = open_reader(path)?;
    let headers = clean_headers(
        reader
            .headers()
            .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?,
    );
    if headers.is_empty() {
        return Err(AppError::new(2, format!("'{}' has no columns.", path.display())));
    }
    let names: Vec<String> = headers.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_numeric_row(&record, &names));
        match parsed {
            Ok(row) => rows.push(row),
            Err(message) => row_errors.push(RowError {
                line,
                id: None,
                message,
            }),
        }
    }

    log_row_errors(path, &row_errors);
    if rows.is_empty() {
        return Err(AppError::new(
            2,
            format!("No valid feature rows in '{}'.", path.display()),
        ));
    }

    let matrix = FeatureMatrix::with_names(&rows, names)?;
    debug!(path = %path.display(), rows = matrix.nrows(), cols = matrix.ncols(), "read features");

    Ok(IngestedFeatures {
        matrix,
        row_errors,
        rows_read,
    })
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

fn clean_headers(headers: &StringRecord) -> StringRecord {
    // Strip a UTF-8 BOM some spreadsheet exports prepend to the first header.
    headers
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}'))
        .collect()
}

fn record_id(record: &StringRecord, headers: &StringRecord, column: &str) -> Option<String> {
    let idx = headers.iter().position(|h| h == column)?;
    record
        .get(idx)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_numeric_row(record: &StringRecord, names: &[String]) -> Result<Vec<f64>, String> {
    if record.len() != names.len() {
        return Err(format!("expected {} fields, found {}", names.len(), record.len()));
    }
    record
        .iter()
        .zip(names)
        .map(|(cell, name)| {
            if cell.is_empty() {
                Ok(f64::NAN)
            } else {
                cell.parse::<f64>()
                    .map_err(|_| format!("Invalid number '{cell}' in column `{name}`."))
            }
        })
        .collect()
}

fn log_row_errors(path: &Path, row_errors: &[RowError]) {
    if row_errors.is_empty() {
        return;
    }
    warn!(path = %path.display(), skipped = row_errors.len(), "skipped malformed rows");
    for e in row_errors.iter().take(5) {
        debug!(line = e.line, id = ?e.id, "{}", e.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const TX_HEADER: &str = "TransactionId,BatchId,AccountId,SubscriptionId,CustomerId,CurrencyCode,CountryCode,ProviderId,ProductId,ProductCategory,ChannelId,Amount,Value,TransactionStartTime,PricingStrategy,FraudResult";

    #[test]
    fn reads_transactions_and_reports_bad_rows() {
        let csv = format!(
            "\u{feff}{TX_HEADER}\n\
             TransactionId_1,BatchId_1,AccountId_1,SubscriptionId_1,CustomerId_1,UGX,256,ProviderId_6,ProductId_10,airtime,ChannelId_3,1000.0,1000,2018-11-15T02:18:49Z,2,0\n\
             TransactionId_2,BatchId_2,AccountId_2,SubscriptionId_2,CustomerId_2,UGX,256,ProviderId_4,ProductId_6,financial_services,ChannelId_2,not-a-number,20,2018-11-15T02:19:08Z,2,0\n\
             TransactionId_3,BatchId_3,AccountId_1,SubscriptionId_1,CustomerId_1,UGX,256,ProviderId_6,ProductId_1,airtime,ChannelId_3,-20.0,20,2018-11-15T02:44:21Z,2,1\n"
        );
        let file = write_temp(&csv);
        let out = read_transactions_csv(file.path()).unwrap();

        assert_eq!(out.rows_read, 3);
        assert_eq!(out.transactions.len(), 2);
        assert_eq!(out.transactions[1].amount, -20.0);
        assert_eq!(out.transactions[1].fraud_result, 1);
        assert_eq!(out.row_errors.len(), 1);
        assert_eq!(out.row_errors[0].line, 3);
        assert_eq!(out.row_errors[0].id.as_deref(), Some("TransactionId_2"));
    }

    #[test]
    fn reads_numeric_features_with_blank_as_nan() {
        let file = write_temp("Amount,Value\n0.1,0.2\n,0.4\nabc,1\n");
        let out = read_features_csv(file.path()).unwrap();
        assert_eq!(out.matrix.nrows(), 2);
        assert_eq!(out.matrix.names(), &["Amount".to_string(), "Value".to_string()]);
        assert!(out.matrix.get(1, 0).is_nan());
        assert_eq!(out.row_errors.len(), 1);
        assert_eq!(out.row_errors[0].line, 4);
    }

    #[test]
    fn missing_file_is_exit_code_2() {
        let err = read_features_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn header_only_file_is_rejected() {
        let file = write_temp("Amount,Value\n");
        assert_eq!(read_features_csv(file.path()).unwrap_err().exit_code(), 2);
    }
}
