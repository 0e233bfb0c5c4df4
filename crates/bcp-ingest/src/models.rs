//! Typed records produced by the row mapper

use chrono::NaiveDate;
use sqlx::types::BigDecimal;

/// One validated catalog entry, ready to be staged for a chunk write.
///
/// Text fields may be empty; numeric fields default to zero and dates to
/// `None` when the source cell was blank or malformed (see [`crate::coerce`]).
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub book_id: i64,
    pub title: String,
    pub rating: BigDecimal,
    pub description: String,
    pub language: String,
    pub isbn: String,
    pub book_format: String,
    pub edition: String,
    pub pages: i32,
    pub publisher: String,
    pub publish_date: Option<NaiveDate>,
    pub first_publish_date: Option<NaiveDate>,
    pub liked_percent: BigDecimal,
    pub price: BigDecimal,
}

/// A mapped row: the typed book plus the raw author name that still needs
/// resolving against the authors table.
#[derive(Debug, Clone)]
pub struct MappedRow {
    pub book: BookRecord,
    pub author: String,
}
