use anyhow::Context;
use std::fs;
use thiserror::Error;

/// One parsed input line, before normalization. Schema-on-read: fields vary
/// per record and insertion order is preserved.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A non-blank input line failed to parse as a JSON object. Fatal for the
/// whole load: no partial table is ever produced.
#[derive(Debug, Error)]
#[error("record format error at line {line}: {source}")]
pub struct RecordFormatError {
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

/// Parse newline-delimited JSON records. Blank lines are skipped; every
/// non-blank line must parse independently.
pub fn parse_lines(text: &str) -> Result<Vec<RawRecord>, RecordFormatError> {
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: RawRecord = serde_json::from_str(line).map_err(|source| RecordFormatError {
            line: lineno + 1,
            source,
        })?;
        out.push(record);
    }
    Ok(out)
}

/// Read and parse a review file from disk.
pub fn parse_records(path: &str) -> anyhow::Result<Vec<RawRecord>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read review file {}", path))?;
    let records =
        parse_lines(&text).with_context(|| format!("parse review file {}", path))?;
    Ok(records)
}
