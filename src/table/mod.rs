//! Canonical table: the uniform-schema view over normalized records.
//!
//! Built once by the normalizer and read-only afterwards. The column set is
//! the union of fields observed across every row; cells the original record
//! never had hold [`Value::Missing`].

pub mod value;

pub use value::{Key, Value};

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: BTreeMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Every row must already be padded to the full column width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            columns,
            index,
            rows,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Cells of one column in row order; `None` if the column is unknown.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Table {
        Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec![Value::Number(1.0), Value::Text("x".to_string())],
                vec![Value::Missing, Value::Text("y".to_string())],
            ],
        )
    }

    #[test]
    fn column_lookup() {
        let t = sample();
        assert_eq!(t.row_count(), 2);
        let a: Vec<_> = t.column("a").unwrap().collect();
        assert_eq!(a, vec![&Value::Number(1.0), &Value::Missing]);
        assert!(t.column("nope").is_none());
    }

    #[test]
    fn cell_lookup() {
        let t = sample();
        assert_eq!(t.cell(1, "b"), Some(&Value::Text("y".to_string())));
        assert_eq!(t.cell(5, "b"), None);
    }
}
