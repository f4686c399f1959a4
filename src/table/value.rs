//! Cell values for the canonical table.
//!
//! Every coerced field is either a concrete value or `Missing`. Missing is
//! an explicit state, distinct from zero or the empty string, and it is the
//! only outcome a failed coercion may produce.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Number(f64),
    Text(String),
    Bool(bool),
    Time(DateTime<Utc>),
    /// A non-scalar raw field (array or nested object) kept as its compact
    /// JSON text so the column stays comparable.
    Complex(String),
}

/// Identity of a non-missing value, usable as a grouping/dedup key.
///
/// Numbers are keyed by bit pattern; coercion has already unified every
/// numeric field as f64, and never emits NaN, so bit equality is value
/// equality (modulo -0.0, which is normalized before keying).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Bool(bool),
    Number(u64),
    Text(String),
    Time(i64),
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Value::Complex(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Grouping key; `None` for missing so grouped operations skip it.
    pub fn key(&self) -> Option<Key> {
        match self {
            Value::Missing => None,
            Value::Number(n) => {
                let n = if *n == 0.0 { 0.0 } else { *n };
                Some(Key::Number(n.to_bits()))
            }
            Value::Text(s) | Value::Complex(s) => Some(Key::Text(s.clone())),
            Value::Bool(b) => Some(Key::Bool(*b)),
            Value::Time(t) => Some(Key::Time(t.timestamp())),
        }
    }

    /// Display form used to label grouped results.
    pub fn label(&self) -> String {
        match self {
            Value::Missing => String::new(),
            Value::Number(n) => format!("{}", n),
            Value::Text(s) | Value::Complex(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Time(t) => t.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_has_no_key() {
        assert_eq!(Value::Missing.key(), None);
        assert!(Value::Missing.is_missing());
    }

    #[test]
    fn negative_zero_keys_like_zero() {
        assert_eq!(Value::Number(-0.0).key(), Value::Number(0.0).key());
    }

    #[test]
    fn whole_number_labels_drop_the_fraction() {
        assert_eq!(Value::Number(5.0).label(), "5");
        assert_eq!(Value::Number(2.5).label(), "2.5");
    }
}
