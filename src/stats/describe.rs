//! Central tendency, dispersion, percentiles and the outlier threshold.

use super::{StatsError, numeric_values};
use crate::table::Table;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralTendency {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub std_dev: f64,
}

/// Mean, median, mode and sample standard deviation over the non-missing
/// numeric values of a column.
pub fn central_tendency(table: &Table, name: &str) -> Result<CentralTendency, StatsError> {
    let values = numeric_values(table, name)?;
    if values.is_empty() {
        return Err(StatsError::EmptyColumn(name.to_string()));
    }

    let mean = mean(&values);
    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Ok(CentralTendency {
        count: values.len(),
        mean,
        median: interpolated(&sorted, 0.5),
        mode: mode(&values),
        std_dev: sample_std(&values, mean),
    })
}

/// p-th percentile (p in 0..=1) with linear interpolation between order
/// statistics.
pub fn percentile(table: &Table, name: &str, p: f64) -> Result<f64, StatsError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(StatsError::InvalidPercentile(p));
    }
    let mut values = numeric_values(table, name)?;
    if values.is_empty() {
        return Err(StatsError::EmptyColumn(name.to_string()));
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    Ok(interpolated(&values, p))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub threshold: f64,
    pub count: usize,
}

/// Threshold at mean + 3 standard deviations, plus the count of rows above
/// it.
pub fn outlier_threshold(table: &Table, name: &str) -> Result<OutlierReport, StatsError> {
    let values = numeric_values(table, name)?;
    if values.is_empty() {
        return Err(StatsError::EmptyColumn(name.to_string()));
    }
    let mean = mean(&values);
    let threshold = mean + 3.0 * sample_std(&values, mean);
    let count = values.iter().filter(|v| **v > threshold).count();
    Ok(OutlierReport { threshold, count })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); 0.0 for a single value.
fn sample_std(values: &[f64], mean: f64) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    (sum_sq / (n - 1) as f64).sqrt()
}

/// Most frequent value; ties resolve to the smallest value.
fn mode(values: &[f64]) -> f64 {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for v in values {
        match counts.iter_mut().find(|(seen, _)| seen == v) {
            Some(slot) => slot.1 += 1,
            None => counts.push((*v, 1)),
        }
    }
    let best = counts
        .iter()
        .map(|(_, c)| *c)
        .max()
        .unwrap_or(0);
    counts
        .iter()
        .filter(|(_, c)| *c == best)
        .map(|(v, _)| *v)
        .fold(f64::INFINITY, f64::min)
}

/// Linear interpolation at rank p * (n - 1) over sorted values.
fn interpolated(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}
