//! Descriptive statistics over the canonical table.
//!
//! Every operation is a pure, deterministic function of the table and its
//! parameters. Missing values are excluded from central tendency, dispersion
//! and grouping, and counted only where missingness itself is measured.

pub mod describe;
pub mod groups;

pub use describe::{
    CentralTendency, OutlierReport, central_tendency, outlier_threshold, percentile,
};
pub use groups::{
    count_distinct, counts_by_month, counts_by_year, duplicate_row_count, group_counts,
    grouped_mean, rank_by, repeated_key_count, time_range, top_k,
};

use crate::table::{Table, Value};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("column '{0}' has no non-missing values")]
    EmptyColumn(String),
    #[error("percentile must be within 0..=1, got {0}")]
    InvalidPercentile(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingColumn {
    pub column: String,
    pub missing: usize,
    pub percent: f64,
}

/// Per-column count and percentage of missing cells across all rows.
pub fn missing_report(table: &Table) -> Vec<MissingColumn> {
    let rows = table.row_count();
    table
        .columns()
        .iter()
        .map(|name| {
            let missing = table
                .column(name)
                .map(|cells| cells.filter(|v| v.is_missing()).count())
                .unwrap_or(0);
            let percent = if rows == 0 {
                0.0
            } else {
                missing as f64 / rows as f64 * 100.0
            };
            MissingColumn {
                column: name.clone(),
                missing,
                percent,
            }
        })
        .collect()
}

fn column<'t>(
    table: &'t Table,
    name: &str,
) -> Result<impl Iterator<Item = &'t Value>, StatsError> {
    table
        .column(name)
        .ok_or_else(|| StatsError::UnknownColumn(name.to_string()))
}

/// Non-missing numeric values of a column, in row order.
fn numeric_values(table: &Table, name: &str) -> Result<Vec<f64>, StatsError> {
    Ok(column(table, name)?.filter_map(Value::as_number).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_report_counts_per_column() {
        let t = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec![Value::Number(1.0), Value::Missing],
                vec![Value::Missing, Value::Missing],
                vec![Value::Number(3.0), Value::Text("x".to_string())],
                vec![Value::Number(4.0), Value::Text("y".to_string())],
            ],
        );
        let report = missing_report(&t);
        assert_eq!(report[0].missing, 1);
        assert_eq!(report[0].percent, 25.0);
        assert_eq!(report[1].missing, 2);
        assert_eq!(report[1].percent, 50.0);
    }
}
