//! Field-level coercions. A coercion never fails the row: anything that
//! cannot produce a valid value becomes [`Value::Missing`].

use crate::table::Value;
use chrono::{TimeZone, Utc};
use regex::Regex;
use serde_json::Value as Json;

/// Convert an arbitrary raw scalar into a table cell. Nested arrays and
/// objects are kept as their compact JSON text, marked [`Value::Complex`]
/// so scalar-only consumers can recognize them.
pub fn from_json(raw: &Json) -> Value {
    match raw {
        Json::Null => Value::Missing,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Missing),
        Json::String(s) => Value::Text(s.clone()),
        other => Value::Complex(other.to_string()),
    }
}

/// Numeric coercion for the rating field. Accepts numbers and numeric
/// strings; everything else is missing, never an error.
pub fn coerce_rating(raw: Option<&Json>) -> Value {
    match raw {
        Some(Json::Number(n)) => n.as_f64().map(Value::Number).unwrap_or(Value::Missing),
        Some(Json::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Missing,
        },
        _ => Value::Missing,
    }
}

/// Epoch-seconds to UTC timestamp. Fractional epochs truncate to whole
/// seconds; invalid or absent input yields missing and the row is always
/// retained.
pub fn coerce_timestamp(raw: Option<&Json>) -> Value {
    let secs = match raw {
        Some(Json::Number(n)) => n.as_f64(),
        Some(Json::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match secs
        .filter(|s| s.is_finite())
        .and_then(|s| Utc.timestamp_opt(s.trunc() as i64, 0).single())
    {
        Some(t) => Value::Time(t),
        None => Value::Missing,
    }
}

/// Vote counts arrive as numbers or as strings with thousands separators
/// ("1,234"). Separators are stripped before the numeric parse.
pub fn coerce_vote(raw: Option<&Json>, separators: &Regex) -> Value {
    match raw {
        Some(Json::Number(n)) => n.as_f64().map(Value::Number).unwrap_or(Value::Missing),
        Some(Json::String(s)) => {
            let cleaned = separators.replace_all(s.trim(), "");
            match cleaned.parse::<f64>() {
                Ok(n) if n.is_finite() => Value::Number(n),
                _ => Value::Missing,
            }
        }
        _ => Value::Missing,
    }
}

/// Character count and whitespace-delimited word count of a text field.
/// Absent (or non-string) input counts as the empty string, so these are
/// total: zero, never missing.
pub fn text_metrics(raw: Option<&Json>) -> (usize, usize) {
    let text = match raw {
        Some(Json::String(s)) => s.as_str(),
        _ => "",
    };
    (text.chars().count(), text.split_whitespace().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sep() -> Regex {
        Regex::new(r"[,\s]").unwrap()
    }

    #[test]
    fn rating_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_rating(Some(&json!(5))), Value::Number(5.0));
        assert_eq!(coerce_rating(Some(&json!("4.0"))), Value::Number(4.0));
    }

    #[test]
    fn rating_failures_become_missing() {
        assert_eq!(coerce_rating(Some(&json!("great"))), Value::Missing);
        assert_eq!(coerce_rating(Some(&json!(null))), Value::Missing);
        assert_eq!(coerce_rating(None), Value::Missing);
    }

    #[test]
    fn vote_strips_thousands_separators() {
        assert_eq!(coerce_vote(Some(&json!("1,234")), &sep()), Value::Number(1234.0));
        assert_eq!(coerce_vote(Some(&json!(7)), &sep()), Value::Number(7.0));
    }

    #[test]
    fn vote_failures_become_missing() {
        assert_eq!(coerce_vote(Some(&json!("N/A")), &sep()), Value::Missing);
        assert_eq!(coerce_vote(None, &sep()), Value::Missing);
    }

    #[test]
    fn timestamp_from_epoch_seconds() {
        let v = coerce_timestamp(Some(&json!(1_388_534_400)));
        assert_eq!(v.as_time().unwrap().to_rfc3339(), "2014-01-01T00:00:00+00:00");
        assert_eq!(coerce_timestamp(Some(&json!("nope"))), Value::Missing);
        assert_eq!(coerce_timestamp(None), Value::Missing);
    }

    #[test]
    fn fractional_epochs_truncate_to_whole_seconds() {
        let v = coerce_timestamp(Some(&json!(1_388_534_400.75)));
        assert_eq!(v.as_time().unwrap().to_rfc3339(), "2014-01-01T00:00:00+00:00");
        let v = coerce_timestamp(Some(&json!("1388534400.9")));
        assert_eq!(v.as_time().unwrap().to_rfc3339(), "2014-01-01T00:00:00+00:00");
    }

    #[test]
    fn arrays_and_objects_become_complex_cells() {
        assert_eq!(
            from_json(&json!(["a.jpg", "b.jpg"])),
            Value::Complex("[\"a.jpg\",\"b.jpg\"]".to_string())
        );
    }

    #[test]
    fn text_metrics_are_total() {
        assert_eq!(text_metrics(Some(&json!("two  words "))), (11, 2));
        assert_eq!(text_metrics(None), (0, 0));
        assert_eq!(text_metrics(Some(&json!(null))), (0, 0));
    }
}
