//! Query-string construction for the search service.
//!
//! Pure string building, no I/O. The service speaks a Solr-flavored boolean
//! language; the two shapes we ever send are "topic restricted to one outlet"
//! and "everything from one outlet" (the ratio denominator).

use chrono::NaiveDate;

/// Inclusive day range applied as the `fq` filter of every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Render as the service's `publish_day` clause.
    pub fn as_query_clause(&self) -> String {
        format!(
            "publish_day:[{}T00:00:00Z TO {}T00:00:00Z]",
            self.start, self.end
        )
    }
}

/// Topic query restricted to a single outlet.
pub fn source_query(topic: &str, media_id: u64) -> String {
    format!("{topic} AND media_id:{media_id}")
}

/// Everything one outlet published, topic or not.
pub fn media_query(media_id: u64) -> String {
    format!("media_id:{media_id}")
}
