//! Group-sensitive operations: distinct counts, group counts, rankings,
//! grouped means, duplicate reports and the per-year series.

use super::{StatsError, column};
use crate::table::{Key, Table, Value};
use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Count of distinct non-missing values in a column.
pub fn count_distinct(table: &Table, name: &str) -> Result<usize, StatsError> {
    let keys: BTreeSet<Key> = column(table, name)?.filter_map(|v| v.key()).collect();
    Ok(keys.len())
}

/// Rows per distinct value, in first-encountered order. Missing is skipped.
pub fn group_counts(table: &Table, name: &str) -> Result<Vec<(Value, usize)>, StatsError> {
    let mut order: Vec<(Value, usize)> = Vec::new();
    let mut index: BTreeMap<Key, usize> = BTreeMap::new();
    for value in column(table, name)? {
        let Some(key) = value.key() else { continue };
        match index.get(&key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key, order.len());
                order.push((value.clone(), 1));
            }
        }
    }
    Ok(order)
}

/// The k most frequent values of a column, count-descending. Ties keep
/// first-encountered order.
pub fn top_k(table: &Table, name: &str, k: usize) -> Result<Vec<(Value, usize)>, StatsError> {
    let mut counts = group_counts(table, name)?;
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(k);
    Ok(counts)
}

/// Mean of a value column per distinct group value, groups in
/// first-encountered order. Rows missing in either column are excluded from
/// that group's mean.
pub fn grouped_mean(
    table: &Table,
    group_name: &str,
    value_name: &str,
) -> Result<Vec<(Value, f64)>, StatsError> {
    let group_idx = table
        .column_index(group_name)
        .ok_or_else(|| StatsError::UnknownColumn(group_name.to_string()))?;
    let value_idx = table
        .column_index(value_name)
        .ok_or_else(|| StatsError::UnknownColumn(value_name.to_string()))?;

    let mut order: Vec<(Value, f64, usize)> = Vec::new();
    let mut index: BTreeMap<Key, usize> = BTreeMap::new();
    for row in table.rows() {
        let Some(key) = row[group_idx].key() else {
            continue;
        };
        let Some(value) = row[value_idx].as_number() else {
            continue;
        };
        match index.get(&key) {
            Some(&i) => {
                order[i].1 += value;
                order[i].2 += 1;
            }
            None => {
                index.insert(key, order.len());
                order.push((row[group_idx].clone(), value, 1));
            }
        }
    }
    Ok(order
        .into_iter()
        .map(|(group, sum, n)| (group, sum / n as f64))
        .collect())
}

/// Rows that repeat an earlier row's values across the key columns
/// (first occurrences not counted). Missing compares equal to missing.
pub fn duplicate_row_count(table: &Table, keys: &[&str]) -> Result<usize, StatsError> {
    let tuples = key_tuples(table, keys)?;
    let distinct: BTreeSet<&Vec<Option<Key>>> = tuples.iter().collect();
    Ok(tuples.len() - distinct.len())
}

/// All members of any key group of size greater than one. Two rows sharing
/// one (user, product) pair report 2.
pub fn repeated_key_count(table: &Table, keys: &[&str]) -> Result<usize, StatsError> {
    let tuples = key_tuples(table, keys)?;
    let mut counts: BTreeMap<&Vec<Option<Key>>, usize> = BTreeMap::new();
    for tuple in &tuples {
        *counts.entry(tuple).or_default() += 1;
    }
    Ok(counts.values().filter(|&&n| n > 1).sum())
}

/// Row count per calendar year of a timestamp column, ascending by year.
/// Rows with a missing timestamp are excluded.
pub fn counts_by_year(table: &Table, name: &str) -> Result<Vec<(i32, usize)>, StatsError> {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for value in column(table, name)? {
        if let Some(t) = value.as_time() {
            *years.entry(t.year()).or_default() += 1;
        }
    }
    Ok(years.into_iter().collect())
}

/// Row count per calendar month (1..=12) of a timestamp column, ascending
/// by month across all years. Rows with a missing timestamp are excluded.
pub fn counts_by_month(table: &Table, name: &str) -> Result<Vec<(u32, usize)>, StatsError> {
    let mut months: BTreeMap<u32, usize> = BTreeMap::new();
    for value in column(table, name)? {
        if let Some(t) = value.as_time() {
            *months.entry(t.month()).or_default() += 1;
        }
    }
    Ok(months.into_iter().collect())
}

/// Earliest and latest non-missing timestamps of a column.
pub fn time_range(
    table: &Table,
    name: &str,
) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>, StatsError> {
    let mut range: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
    for value in column(table, name)? {
        if let Some(t) = value.as_time() {
            range = match range {
                None => Some((t, t)),
                Some((min, max)) => Some((min.min(t), max.max(t))),
            };
        }
    }
    Ok(range)
}

/// Indices of the k rows with the largest values of a column. Missing is
/// excluded; ties keep original row order.
pub fn rank_by(table: &Table, name: &str, k: usize) -> Result<Vec<usize>, StatsError> {
    let mut ranked: Vec<(usize, f64)> = column(table, name)?
        .enumerate()
        .filter_map(|(i, v)| v.as_number().map(|n| (i, n)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(k);
    Ok(ranked.into_iter().map(|(i, _)| i).collect())
}

fn key_tuples(table: &Table, keys: &[&str]) -> Result<Vec<Vec<Option<Key>>>, StatsError> {
    let mut indices = Vec::with_capacity(keys.len());
    for key in keys {
        indices.push(
            table
                .column_index(key)
                .ok_or_else(|| StatsError::UnknownColumn(key.to_string()))?,
        );
    }
    Ok(table
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].key()).collect())
        .collect())
}
