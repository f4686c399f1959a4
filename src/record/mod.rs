//! Raw record parsing for the newline-delimited review dataset.

pub mod parse;

pub use parse::{RawRecord, RecordFormatError, parse_lines, parse_records};
