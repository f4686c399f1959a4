//! The summary battery: named results assembled from the aggregation
//! operations, serialized for the external presentation layer.
//!
//! Sections follow the exploration sequence: totals, rating statistics,
//! missing values, duplicates, per-product and per-user activity, text
//! length analysis, votes, per-year series and per-style-attribute
//! analysis. How the results are rendered is out of scope here.

use crate::normalize::flatten::STYLE_PREFIX;
use crate::normalize::{
    DATE_COL, RATING_COL, REVIEW_LEN_COL, SUMMARY_LEN_COL, VOTE_COL, WORD_COUNT_COL,
};
use crate::stats::{self, CentralTendency, MissingColumn, OutlierReport, StatsError};
use crate::table::{Table, Value};
use chrono::{DateTime, Utc};
use serde::Serialize;

const PRODUCT_COL: &str = "asin";
const USER_COL: &str = "reviewerID";
const VERIFIED_COL: &str = "verified";
const USER_NAME_COL: &str = "reviewerName";
const TEXT_COL: &str = "reviewText";

const TOP_K: usize = 5;
const EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub label: String,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingBucket {
    pub rating: f64,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCount {
    pub month: u32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalSummary {
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
    pub window_days: i64,
    pub per_year: Vec<YearCount>,
    /// Calendar months pooled across years, for seasonality.
    pub per_month: Vec<MonthCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub reviews: usize,
    pub unique_products: Option<usize>,
    pub unique_users: Option<usize>,
    pub verified_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub tendency: CentralTendency,
    /// Counts and percentages per rating, ascending. Percentages are over
    /// rows with a valid rating.
    pub distribution: Vec<RatingBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateSummary {
    /// Rows identical across every column (first occurrences not counted).
    pub identical_rows: usize,
    /// Rows sharing a (user, product) pair, all members counted.
    pub repeated_reviewer_product: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivitySummary {
    pub distinct: usize,
    pub average_reviews: f64,
    pub top: Vec<GroupCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub single_review_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongestReview {
    pub length: f64,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthSummary {
    pub tendency: CentralTendency,
    pub p01: f64,
    pub p99: f64,
    pub outliers: OutlierReport,
    pub mean_by_rating: Vec<GroupMean>,
    pub longest: Option<LongestReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopReview {
    pub reviewer: Option<String>,
    pub product: Option<String>,
    pub rating: Option<f64>,
    pub votes: f64,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteSummary {
    pub with_votes: usize,
    pub with_votes_percent: f64,
    pub tendency: Option<CentralTendency>,
    pub mean_by_rating: Vec<GroupMean>,
    pub top_voted: Vec<TopReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleSummary {
    pub column: String,
    pub with_value: usize,
    pub coverage_percent: f64,
    pub distinct: usize,
    pub top: Vec<GroupCount>,
    /// Mean rating per style value, best first.
    pub mean_rating_top: Vec<GroupMean>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub totals: Totals,
    pub rating: Option<RatingSummary>,
    /// Columns with at least one missing cell.
    pub missing: Vec<MissingColumn>,
    pub duplicates: DuplicateSummary,
    pub products: Option<ActivitySummary>,
    pub reviewers: Option<ActivitySummary>,
    pub review_length: Option<LengthSummary>,
    pub word_count: Option<CentralTendency>,
    pub summary_length: Option<CentralTendency>,
    pub votes: Option<VoteSummary>,
    pub temporal: Option<TemporalSummary>,
    pub styles: Vec<StyleSummary>,
}

/// Compute the whole battery. Read-only over the table; sections whose
/// backing columns the dataset never produced come back as `None`.
pub fn build_summary(table: &Table) -> Result<Summary, StatsError> {
    let rows = table.row_count();

    let totals = Totals {
        reviews: rows,
        unique_products: distinct_opt(table, PRODUCT_COL)?,
        unique_users: distinct_opt(table, USER_COL)?,
        verified_percent: verified_percent(table),
    };

    let rating = match stats::central_tendency(table, RATING_COL) {
        Ok(tendency) => Some(RatingSummary {
            distribution: rating_distribution(table, tendency.count)?,
            tendency,
        }),
        Err(StatsError::EmptyColumn(_)) | Err(StatsError::UnknownColumn(_)) => None,
        Err(e) => return Err(e),
    };

    let missing = stats::missing_report(table)
        .into_iter()
        .filter(|c| c.missing > 0)
        .collect();

    // Columns holding nested values (image arrays and the like) are left
    // out of the identical-row subset; only scalar fields decide sameness.
    let scalar_columns: Vec<&str> = table
        .columns()
        .iter()
        .filter(|name| {
            table
                .column(name.as_str())
                .map(|mut cells| cells.all(|v| !v.is_complex()))
                .unwrap_or(true)
        })
        .map(String::as_str)
        .collect();
    let duplicates = DuplicateSummary {
        identical_rows: stats::duplicate_row_count(table, &scalar_columns)?,
        repeated_reviewer_product: if has(table, USER_COL) && has(table, PRODUCT_COL) {
            Some(stats::repeated_key_count(table, &[USER_COL, PRODUCT_COL])?)
        } else {
            None
        },
    };

    let products = activity(table, PRODUCT_COL, false)?;
    let reviewers = activity(table, USER_COL, true)?;

    let review_length = if has(table, REVIEW_LEN_COL) {
        let mean_by_rating = if has(table, RATING_COL) {
            sorted_by_group(stats::grouped_mean(table, RATING_COL, REVIEW_LEN_COL)?)
        } else {
            vec![]
        };
        let longest = stats::rank_by(table, REVIEW_LEN_COL, 1)?
            .first()
            .map(|&row| LongestReview {
                length: table
                    .cell(row, REVIEW_LEN_COL)
                    .and_then(Value::as_number)
                    .unwrap_or(0.0),
                excerpt: text_cell(table, row, TEXT_COL)
                    .map(|t| t.chars().take(EXCERPT_CHARS).collect())
                    .unwrap_or_default(),
            });
        Some(LengthSummary {
            tendency: stats::central_tendency(table, REVIEW_LEN_COL)?,
            p01: stats::percentile(table, REVIEW_LEN_COL, 0.01)?,
            p99: stats::percentile(table, REVIEW_LEN_COL, 0.99)?,
            outliers: stats::outlier_threshold(table, REVIEW_LEN_COL)?,
            mean_by_rating,
            longest,
        })
    } else {
        None
    };

    let word_count = tendency_opt(table, WORD_COUNT_COL)?;
    let summary_length = tendency_opt(table, SUMMARY_LEN_COL)?;

    let votes = vote_summary(table)?;

    let temporal = temporal_summary(table)?;

    let style_columns: Vec<String> = table
        .columns()
        .iter()
        .filter(|c| c.starts_with(STYLE_PREFIX))
        .cloned()
        .collect();
    let mut styles = Vec::with_capacity(style_columns.len());
    for column in &style_columns {
        styles.push(style_summary(table, column)?);
    }

    Ok(Summary {
        totals,
        rating,
        missing,
        duplicates,
        products,
        reviewers,
        review_length,
        word_count,
        summary_length,
        votes,
        temporal,
        styles,
    })
}

fn temporal_summary(table: &Table) -> Result<Option<TemporalSummary>, StatsError> {
    if !has(table, DATE_COL) {
        return Ok(None);
    }
    let Some((first, last)) = stats::time_range(table, DATE_COL)? else {
        return Ok(None);
    };
    Ok(Some(TemporalSummary {
        window_days: (last - first).num_days(),
        first,
        last,
        per_year: stats::counts_by_year(table, DATE_COL)?
            .into_iter()
            .map(|(year, count)| YearCount { year, count })
            .collect(),
        per_month: stats::counts_by_month(table, DATE_COL)?
            .into_iter()
            .map(|(month, count)| MonthCount { month, count })
            .collect(),
    }))
}

fn has(table: &Table, name: &str) -> bool {
    table.column_index(name).is_some()
}

fn distinct_opt(table: &Table, name: &str) -> Result<Option<usize>, StatsError> {
    if has(table, name) {
        Ok(Some(stats::count_distinct(table, name)?))
    } else {
        Ok(None)
    }
}

fn tendency_opt(table: &Table, name: &str) -> Result<Option<CentralTendency>, StatsError> {
    match stats::central_tendency(table, name) {
        Ok(t) => Ok(Some(t)),
        Err(StatsError::EmptyColumn(_)) | Err(StatsError::UnknownColumn(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Share of verified purchases among rows with a verified flag.
fn verified_percent(table: &Table) -> Option<f64> {
    let cells = table.column(VERIFIED_COL)?;
    let mut seen = 0usize;
    let mut verified = 0usize;
    for cell in cells {
        match cell {
            Value::Bool(true) => {
                seen += 1;
                verified += 1;
            }
            Value::Bool(false) => seen += 1,
            _ => {}
        }
    }
    (seen > 0).then(|| verified as f64 / seen as f64 * 100.0)
}

fn rating_distribution(table: &Table, rated: usize) -> Result<Vec<RatingBucket>, StatsError> {
    let mut counts = stats::group_counts(table, RATING_COL)?;
    counts.sort_by(|a, b| {
        let (a, b) = (a.0.as_number(), b.0.as_number());
        a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(counts
        .into_iter()
        .filter_map(|(value, count)| {
            value.as_number().map(|rating| RatingBucket {
                rating,
                count,
                percent: count as f64 / rated as f64 * 100.0,
            })
        })
        .collect())
}

fn activity(
    table: &Table,
    name: &str,
    with_singles: bool,
) -> Result<Option<ActivitySummary>, StatsError> {
    if !has(table, name) {
        return Ok(None);
    }
    let groups = stats::group_counts(table, name)?;
    if groups.is_empty() {
        return Ok(None);
    }
    let total: usize = groups.iter().map(|(_, n)| n).sum();
    let singles = with_singles.then(|| groups.iter().filter(|(_, n)| *n == 1).count());
    Ok(Some(ActivitySummary {
        distinct: groups.len(),
        average_reviews: total as f64 / groups.len() as f64,
        top: labeled(stats::top_k(table, name, TOP_K)?),
        single_review_count: singles,
    }))
}

fn vote_summary(table: &Table) -> Result<Option<VoteSummary>, StatsError> {
    if !has(table, VOTE_COL) {
        return Ok(None);
    }
    let rows = table.row_count();
    let with_votes = table
        .column(VOTE_COL)
        .map(|cells| cells.filter(|v| !v.is_missing()).count())
        .unwrap_or(0);

    let mean_by_rating = if has(table, RATING_COL) {
        sorted_by_group(stats::grouped_mean(table, RATING_COL, VOTE_COL)?)
    } else {
        vec![]
    };

    let top_voted = stats::rank_by(table, VOTE_COL, TOP_K)?
        .into_iter()
        .map(|row| TopReview {
            reviewer: text_cell(table, row, USER_NAME_COL),
            product: text_cell(table, row, PRODUCT_COL),
            rating: table.cell(row, RATING_COL).and_then(Value::as_number),
            votes: table
                .cell(row, VOTE_COL)
                .and_then(Value::as_number)
                .unwrap_or(0.0),
            excerpt: text_cell(table, row, TEXT_COL)
                .map(|t| t.chars().take(EXCERPT_CHARS).collect())
                .unwrap_or_default(),
        })
        .collect();

    Ok(Some(VoteSummary {
        with_votes,
        with_votes_percent: if rows == 0 {
            0.0
        } else {
            with_votes as f64 / rows as f64 * 100.0
        },
        tendency: tendency_opt(table, VOTE_COL)?,
        mean_by_rating,
        top_voted,
    }))
}

fn style_summary(table: &Table, column: &str) -> Result<StyleSummary, StatsError> {
    let rows = table.row_count();
    let with_value = table
        .column(column)
        .map(|cells| cells.filter(|v| !v.is_missing()).count())
        .unwrap_or(0);

    let mut mean_rating_top = if has(table, RATING_COL) {
        stats::grouped_mean(table, column, RATING_COL)?
            .into_iter()
            .map(|(value, mean)| GroupMean {
                label: value.label(),
                mean,
            })
            .collect()
    } else {
        vec![]
    };
    mean_rating_top.sort_by(|a: &GroupMean, b: &GroupMean| {
        b.mean.partial_cmp(&a.mean).unwrap_or(std::cmp::Ordering::Equal)
    });
    mean_rating_top.truncate(TOP_K);

    Ok(StyleSummary {
        column: column.to_string(),
        with_value,
        coverage_percent: if rows == 0 {
            0.0
        } else {
            with_value as f64 / rows as f64 * 100.0
        },
        distinct: stats::count_distinct(table, column)?,
        top: labeled(stats::top_k(table, column, TOP_K)?),
        mean_rating_top,
    })
}

fn labeled(counts: Vec<(Value, usize)>) -> Vec<GroupCount> {
    counts
        .into_iter()
        .map(|(value, count)| GroupCount {
            label: value.label(),
            count,
        })
        .collect()
}

/// Grouped means ordered by the group value (ascending), for numeric groups
/// like the rating.
fn sorted_by_group(mut means: Vec<(Value, f64)>) -> Vec<GroupMean> {
    means.sort_by(|a, b| {
        let (a, b) = (a.0.as_number(), b.0.as_number());
        a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
    });
    means
        .into_iter()
        .map(|(value, mean)| GroupMean {
            label: value.label(),
            mean,
        })
        .collect()
}

fn text_cell(table: &Table, row: usize, column: &str) -> Option<String> {
    match table.cell(row, column) {
        Some(Value::Text(s)) => Some(s.clone()),
        _ => None,
    }
}
