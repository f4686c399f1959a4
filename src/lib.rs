//! Review dataset normalizer and descriptive-statistics engine.
//!
//! Two components, consumed in dependency order: the normalizer
//! ([`record`] + [`normalize`]) turns newline-delimited JSON reviews into
//! one canonical [`table::Table`], and the aggregator ([`stats`] +
//! [`report`]) computes the descriptive summary battery over it.

pub mod normalize;
pub mod record;
pub mod report;
pub mod stats;
pub mod table;

pub type Result<T> = anyhow::Result<T>;
