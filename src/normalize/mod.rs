//! The normalizer: raw heterogeneous records in, one canonical table out.
//!
//! Two passes, per the schema-on-read design: the first coerces each record
//! into a sparse row while discovering the column union, the second
//! materializes rows padded with the missing marker. No row is ever dropped;
//! a coercion that cannot produce a value leaves a missing cell behind.

pub mod coerce;
pub mod flatten;

use crate::record::RawRecord;
use crate::table::{Table, Value};
use regex::Regex;
use std::collections::BTreeMap;

pub const RATING_COL: &str = "overall";
pub const DATE_COL: &str = "reviewDate";
pub const REVIEW_LEN_COL: &str = "reviewLen";
pub const WORD_COUNT_COL: &str = "wordCount";
pub const SUMMARY_LEN_COL: &str = "summaryLen";
pub const VOTE_COL: &str = "vote";

const EPOCH_FIELD: &str = "unixReviewTime";
const TEXT_FIELD: &str = "reviewText";
const SUMMARY_FIELD: &str = "summary";
const STYLE_FIELD: &str = "style";

/// Build the canonical table. Row order follows record order; the column
/// set is the union of fields observed across all records.
pub fn normalize(records: &[RawRecord]) -> crate::Result<Table> {
    let separators = Regex::new(r"[,\s]")?;

    let mut raw_columns: Vec<String> = Vec::new();
    let mut style_columns: Vec<String> = Vec::new();
    let mut sparse: Vec<BTreeMap<String, Value>> = Vec::with_capacity(records.len());

    let mut saw_epoch = false;
    let mut saw_text = false;
    let mut saw_summary = false;

    for record in records {
        let mut cells: BTreeMap<String, Value> = BTreeMap::new();

        for (field, value) in record {
            // The style object is consumed by flattening below.
            if field == STYLE_FIELD {
                continue;
            }
            push_unique(&mut raw_columns, field);
            cells.insert(field.clone(), coerce::from_json(value));
        }

        // Coerced and derived fields overwrite their raw cells in place.
        cells.insert(
            RATING_COL.to_string(),
            coerce::coerce_rating(record.get(RATING_COL)),
        );

        saw_epoch |= record.contains_key(EPOCH_FIELD);
        cells.insert(
            DATE_COL.to_string(),
            coerce::coerce_timestamp(record.get(EPOCH_FIELD)),
        );

        saw_text |= record.contains_key(TEXT_FIELD);
        let (len, words) = coerce::text_metrics(record.get(TEXT_FIELD));
        cells.insert(REVIEW_LEN_COL.to_string(), Value::Number(len as f64));
        cells.insert(WORD_COUNT_COL.to_string(), Value::Number(words as f64));

        saw_summary |= record.contains_key(SUMMARY_FIELD);
        let (summary_len, _) = coerce::text_metrics(record.get(SUMMARY_FIELD));
        cells.insert(SUMMARY_LEN_COL.to_string(), Value::Number(summary_len as f64));

        if let Some(raw_vote) = record.get(VOTE_COL) {
            cells.insert(
                VOTE_COL.to_string(),
                coerce::coerce_vote(Some(raw_vote), &separators),
            );
        }

        for (column, cell) in flatten::flatten_style(record.get(STYLE_FIELD)) {
            push_unique(&mut style_columns, &column);
            cells.insert(column, cell);
        }

        sparse.push(cells);
    }

    // Column union: raw fields in first-observed order, the rating column
    // even when no record carried one, derived columns, then style columns
    // in first-observed order.
    let mut columns = raw_columns;
    push_unique(&mut columns, RATING_COL);
    if saw_epoch {
        push_unique(&mut columns, DATE_COL);
    }
    if saw_text {
        push_unique(&mut columns, REVIEW_LEN_COL);
        push_unique(&mut columns, WORD_COUNT_COL);
    }
    if saw_summary {
        push_unique(&mut columns, SUMMARY_LEN_COL);
    }
    for column in style_columns {
        push_unique(&mut columns, &column);
    }

    let rows = sparse
        .into_iter()
        .map(|mut cells| {
            columns
                .iter()
                .map(|c| cells.remove(c).unwrap_or(Value::Missing))
                .collect()
        })
        .collect();

    Ok(Table::new(columns, rows))
}

fn push_unique(columns: &mut Vec<String>, name: &str) {
    if !columns.iter().any(|c| c == name) {
        columns.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_lines;
    use pretty_assertions::assert_eq;

    fn table_from(text: &str) -> Table {
        normalize(&parse_lines(text).unwrap()).unwrap()
    }

    #[test]
    fn every_record_becomes_a_row() {
        let t = table_from(concat!(
            "{\"asin\": \"A\", \"overall\": 5}\n",
            "{\"asin\": \"B\", \"overall\": \"bad\"}\n",
            "{\"asin\": \"C\"}\n",
        ));
        assert_eq!(t.row_count(), 3);
    }

    #[test]
    fn invalid_rating_is_missing_not_dropped() {
        let t = table_from("{\"asin\": \"A\", \"overall\": \"junk\"}\n{\"asin\": \"B\"}\n");
        assert_eq!(t.cell(0, RATING_COL), Some(&Value::Missing));
        assert_eq!(t.cell(1, RATING_COL), Some(&Value::Missing));
    }

    #[test]
    fn rating_column_exists_even_when_never_observed() {
        let t = table_from("{\"asin\": \"A\"}\n");
        assert!(t.column_index(RATING_COL).is_some());
    }

    #[test]
    fn text_metrics_are_zero_for_absent_text() {
        let t = table_from(
            "{\"reviewText\": \"short review\"}\n{\"asin\": \"B\"}\n",
        );
        assert_eq!(t.cell(0, REVIEW_LEN_COL), Some(&Value::Number(12.0)));
        assert_eq!(t.cell(0, WORD_COUNT_COL), Some(&Value::Number(2.0)));
        assert_eq!(t.cell(1, REVIEW_LEN_COL), Some(&Value::Number(0.0)));
        assert_eq!(t.cell(1, WORD_COUNT_COL), Some(&Value::Number(0.0)));
    }

    #[test]
    fn vote_is_coerced_in_place() {
        let t = table_from("{\"vote\": \"1,234\"}\n{\"vote\": \"N/A\"}\n{\"asin\": \"C\"}\n");
        assert_eq!(t.cell(0, VOTE_COL), Some(&Value::Number(1234.0)));
        assert_eq!(t.cell(1, VOTE_COL), Some(&Value::Missing));
        assert_eq!(t.cell(2, VOTE_COL), Some(&Value::Missing));
    }

    #[test]
    fn style_columns_are_unioned_across_rows() {
        let t = table_from(concat!(
            "{\"style\": {\"Size:\": \" Large \"}}\n",
            "{\"style\": {\"Color\": \"Red\"}}\n",
            "{\"asin\": \"C\"}\n",
        ));
        assert_eq!(t.cell(0, "style_Size"), Some(&Value::Text("Large".to_string())));
        assert_eq!(t.cell(0, "style_Color"), Some(&Value::Missing));
        assert_eq!(t.cell(1, "style_Color"), Some(&Value::Text("Red".to_string())));
        assert_eq!(t.cell(2, "style_Size"), Some(&Value::Missing));
        // The raw nested object itself does not survive as a column.
        assert!(t.column_index("style").is_none());
    }

    #[test]
    fn column_order_is_raw_then_derived_then_style() {
        let t = table_from(
            "{\"asin\": \"A\", \"overall\": 5, \"unixReviewTime\": 1388534400, \
             \"reviewText\": \"ok\", \"style\": {\"Size\": \"L\"}}\n",
        );
        assert_eq!(
            t.columns(),
            &[
                "asin".to_string(),
                "overall".to_string(),
                "unixReviewTime".to_string(),
                "reviewText".to_string(),
                "reviewDate".to_string(),
                "reviewLen".to_string(),
                "wordCount".to_string(),
                "style_Size".to_string(),
            ]
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let text = concat!(
            "{\"asin\": \"A\", \"overall\": 5, \"vote\": \"2,001\", \
             \"style\": {\"Size:\": \"M\"}}\n",
            "{\"asin\": \"B\", \"unixReviewTime\": 1388534400}\n",
        );
        assert_eq!(table_from(text), table_from(text));
    }
}
