//! Row mapping
//!
//! Projects raw CSV records into typed [`BookRecord`]s. Column positions are
//! resolved once from the header row; a missing required column is a fatal
//! configuration problem with the feed and aborts the run before any data
//! row is touched. Per-row problems never error out here: short rows read
//! missing cells as empty strings and cell coercion degrades to defaults.

use csv_async::StringRecord;

use crate::coerce::{date_or_none, decimal_or_zero, int64_or_zero, int_or_zero};
use crate::error::{IngestError, Result};
use crate::models::{BookRecord, MappedRow};

/// Column positions resolved from the feed header.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    book_id: usize,
    title: usize,
    author: usize,
    rating: usize,
    description: usize,
    language: usize,
    isbn: usize,
    book_format: usize,
    edition: usize,
    pages: usize,
    publisher: usize,
    publish_date: usize,
    first_publish_date: usize,
    liked_percent: usize,
    price: usize,
}

impl HeaderIndex {
    /// Build the index from the header record.
    ///
    /// Fails with [`IngestError::MissingColumn`] naming the first absent
    /// column; the feed contract requires all of them.
    pub fn from_header(header: &StringRecord) -> Result<Self> {
        let position = |name: &str| -> Result<usize> {
            header
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            book_id: position("bookId")?,
            title: position("title")?,
            author: position("author")?,
            rating: position("rating")?,
            description: position("description")?,
            language: position("language")?,
            isbn: position("isbn")?,
            book_format: position("bookFormat")?,
            edition: position("edition")?,
            pages: position("pages")?,
            publisher: position("publisher")?,
            publish_date: position("publishDate")?,
            first_publish_date: position("firstPublishDate")?,
            liked_percent: position("likedPercent")?,
            price: position("price")?,
        })
    }

    /// Project one raw record into a typed book plus its author name.
    pub fn map_record(&self, record: &StringRecord) -> MappedRow {
        let cell = |index: usize| record.get(index).unwrap_or("");

        MappedRow {
            book: BookRecord {
                book_id: int64_or_zero(cell(self.book_id)),
                title: cell(self.title).to_string(),
                rating: decimal_or_zero(cell(self.rating)),
                description: cell(self.description).to_string(),
                language: cell(self.language).to_string(),
                isbn: cell(self.isbn).to_string(),
                book_format: cell(self.book_format).to_string(),
                edition: cell(self.edition).to_string(),
                pages: int_or_zero(cell(self.pages)),
                publisher: cell(self.publisher).to_string(),
                publish_date: date_or_none(cell(self.publish_date)),
                first_publish_date: date_or_none(cell(self.first_publish_date)),
                liked_percent: decimal_or_zero(cell(self.liked_percent)),
                price: decimal_or_zero(cell(self.price)),
            },
            author: cell(self.author).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use futures::StreamExt;
    use sqlx::types::BigDecimal;
    use std::str::FromStr;

    const FEED_HEADER: &str = "bookId,title,author,rating,description,language,\
isbn,bookFormat,edition,pages,publisher,publishDate,firstPublishDate,likedPercent,price";

    async fn parse_rows(csv: &str) -> (StringRecord, Vec<StringRecord>) {
        let mut reader = csv_async::AsyncReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .create_reader(csv.as_bytes());
        let header = reader.headers().await.unwrap().clone();
        let mut rows = Vec::new();
        let mut records = reader.records();
        while let Some(record) = records.next().await {
            rows.push(record.unwrap());
        }
        (header, rows)
    }

    #[tokio::test]
    async fn maps_a_clean_row() {
        let csv = format!(
            "{FEED_HEADER}\n\
1,The Hobbit,J.R.R. Tolkien,4.27,A hobbit goes there and back,English,\
9780618260300,Paperback,75th Anniversary,366,Mariner Books,2012-09-18,1937-09-21,96,5.99\n"
        );
        let (header, rows) = parse_rows(&csv).await;
        let index = HeaderIndex::from_header(&header).unwrap();
        let mapped = index.map_record(&rows[0]);

        assert_eq!(mapped.book.book_id, 1);
        assert_eq!(mapped.book.title, "The Hobbit");
        assert_eq!(mapped.author, "J.R.R. Tolkien");
        assert_eq!(mapped.book.rating, BigDecimal::from_str("4.27").unwrap());
        assert_eq!(mapped.book.pages, 366);
        assert_eq!(
            mapped.book.publish_date,
            NaiveDate::from_ymd_opt(2012, 9, 18)
        );
        assert_eq!(mapped.book.price, BigDecimal::from_str("5.99").unwrap());
    }

    #[tokio::test]
    async fn dirty_cells_degrade_to_defaults() {
        let csv = format!(
            "{FEED_HEADER}\n\
2,Untitled,Anon,N/A,,,,,,many,,soon,,,free\n"
        );
        let (header, rows) = parse_rows(&csv).await;
        let index = HeaderIndex::from_header(&header).unwrap();
        let mapped = index.map_record(&rows[0]);

        assert_eq!(mapped.book.rating, BigDecimal::from(0));
        assert_eq!(mapped.book.pages, 0);
        assert_eq!(mapped.book.publish_date, None);
        assert_eq!(mapped.book.price, BigDecimal::from(0));
        assert_eq!(mapped.book.isbn, "");
    }

    #[tokio::test]
    async fn header_order_does_not_matter() {
        let csv = "title,author,bookId,rating,description,language,isbn,bookFormat,\
edition,pages,publisher,publishDate,firstPublishDate,likedPercent,price\n\
Dune,Frank Herbert,77,4.25,,,,,,412,,,,,\n";
        let (header, rows) = parse_rows(csv).await;
        let index = HeaderIndex::from_header(&header).unwrap();
        let mapped = index.map_record(&rows[0]);

        assert_eq!(mapped.book.book_id, 77);
        assert_eq!(mapped.book.title, "Dune");
        assert_eq!(mapped.book.pages, 412);
    }

    #[tokio::test]
    async fn missing_column_is_fatal() {
        let csv = "bookId,title,author,rating,description,language,bookFormat,\
edition,pages,publisher,publishDate,firstPublishDate,likedPercent,price\n";
        let (header, _) = parse_rows(csv).await;
        let err = HeaderIndex::from_header(&header).unwrap_err();
        match err {
            IngestError::MissingColumn(column) => assert_eq!(column, "isbn"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn short_row_reads_missing_cells_as_empty() {
        let csv = format!("{FEED_HEADER}\n3,Sparse,Someone\n");
        let (header, rows) = parse_rows(&csv).await;
        let index = HeaderIndex::from_header(&header).unwrap();
        let mapped = index.map_record(&rows[0]);

        assert_eq!(mapped.book.book_id, 3);
        assert_eq!(mapped.book.title, "Sparse");
        assert_eq!(mapped.author, "Someone");
        assert_eq!(mapped.book.publisher, "");
        assert_eq!(mapped.book.pages, 0);
    }
}
