//! Style flattening: expand the variably-shaped nested style object into
//! namespaced top-level columns.

use crate::normalize::coerce::from_json;
use crate::table::Value;
use serde_json::Value as Json;

/// Namespace prefix keeping flattened style keys clear of top-level fields.
pub const STYLE_PREFIX: &str = "style_";

/// Flatten one record's style object into `(column, cell)` pairs.
///
/// Keys are trimmed of surrounding whitespace and trailing colons; string
/// values are trimmed. An absent or non-object style yields no pairs. If two
/// raw keys trim to the same canonical key, the later one observed wins for
/// that row.
pub fn flatten_style(raw: Option<&Json>) -> Vec<(String, Value)> {
    let mut out: Vec<(String, Value)> = Vec::new();
    let Some(Json::Object(map)) = raw else {
        return out;
    };
    for (key, val) in map {
        let canonical = key.trim().trim_end_matches(':');
        let column = format!("{}{}", STYLE_PREFIX, canonical);
        let cell = match val {
            Json::String(s) => Value::Text(s.trim().to_string()),
            other => from_json(other),
        };
        match out.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = cell,
            None => out.push((column, cell)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn keys_and_values_are_trimmed() {
        let style = json!({"Size:": " Large "});
        let pairs = flatten_style(Some(&style));
        assert_eq!(
            pairs,
            vec![("style_Size".to_string(), Value::Text("Large".to_string()))]
        );
    }

    #[test]
    fn absent_or_non_object_style_is_empty() {
        assert_eq!(flatten_style(None), vec![]);
        assert_eq!(flatten_style(Some(&json!("n/a"))), vec![]);
    }

    // Two raw keys collapsing to one canonical key is a data-loss edge in
    // the input; the current policy is last-write-wins within the row.
    #[test]
    fn duplicate_trimmed_keys_last_write_wins() {
        let style = json!({"Size": "Small", "Size:": "Large"});
        let pairs = flatten_style(Some(&style));
        assert_eq!(
            pairs,
            vec![("style_Size".to_string(), Value::Text("Large".to_string()))]
        );
    }

    #[test]
    fn non_string_style_values_keep_their_type() {
        let style = json!({"Count:": 3});
        let pairs = flatten_style(Some(&style));
        assert_eq!(pairs, vec![("style_Count".to_string(), Value::Number(3.0))]);
    }
}
