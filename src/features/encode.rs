//! Categorical encoding and min-max normalization.

use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Drop-first one-hot encoder.
///
/// Categories are ordered numerically when every value of a column parses as a
/// number, otherwise lexicographically. The first category of each column is
/// the dropped reference level. Values not seen during `fit` encode as all
/// zeros, the same as the reference level.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotEncoder {
    columns: Vec<EncodedColumn>,
}

#[derive(Debug, Clone, PartialEq)]
struct EncodedColumn {
    name: String,
    /// Categories that get an indicator column (reference level excluded).
    kept: Vec<String>,
}

impl OneHotEncoder {
    /// Learn categories from `(column name, values)` pairs.
    pub fn fit(columns: &[(&str, Vec<String>)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, values)| {
                let unique: BTreeSet<&str> = values.iter().map(String::as_str).collect();
                let mut categories: Vec<&str> = unique.into_iter().collect();
                let numeric = categories.iter().all(|c| c.parse::<f64>().is_ok());
                if numeric {
                    categories.sort_by(|a, b| numeric_cmp(a, b));
                }
                EncodedColumn {
                    name: (*name).to_string(),
                    kept: categories.iter().skip(1).map(|c| (*c).to_string()).collect(),
                }
            })
            .collect();
        Self { columns }
    }

    /// Output column names, `<column>_<category>`.
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|c| c.kept.iter().map(move |cat| format!("{}_{cat}", c.name)))
            .collect()
    }

    pub fn width(&self) -> usize {
        self.columns.iter().map(|c| c.kept.len()).sum()
    }

    /// Encode one record; `values` is in the column order given to `fit`.
    pub fn transform_row(&self, values: &[&str]) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width());
        for (col, value) in self.columns.iter().zip(values) {
            out.extend(col.kept.iter().map(|cat| if cat == value { 1.0 } else { 0.0 }));
        }
        out
    }
}

fn numeric_cmp(a: &str, b: &str) -> Ordering {
    let (x, y) = (a.parse::<f64>().unwrap_or(f64::NAN), b.parse::<f64>().unwrap_or(f64::NAN));
    x.total_cmp(&y)
}

/// Scales each column into `[0, 1]` using the range seen in `fit`.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    ranges: Vec<(f64, f64)>,
}

impl MinMaxScaler {
    /// Learn per-column `(min, max)`, ignoring non-finite values.
    pub fn fit(columns: &[Vec<f64>]) -> Self {
        let ranges = columns
            .iter()
            .map(|col| {
                col.iter()
                    .copied()
                    .filter(|v| v.is_finite())
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
            })
            .collect();
        Self { ranges }
    }

    /// Scale `value` of column `col`. A constant column maps to `0.0`.
    pub fn transform(&self, col: usize, value: f64) -> f64 {
        let (lo, hi) = self.ranges[col];
        let span = hi - lo;
        if !(span.is_finite() && span > 0.0) {
            return 0.0;
        }
        (value - lo) / span
    }
}
