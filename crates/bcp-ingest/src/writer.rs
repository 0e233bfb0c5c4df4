//! Batch writer
//!
//! Accumulates typed records and applies them to the store in fixed-size
//! chunks, each chunk inside its own transaction. Either every staged insert
//! in a chunk commits or none does; a failure drops the transaction (which
//! rolls it back server-side) and is escalated as fatal, leaving previously
//! committed chunks intact.
//!
//! Both statements are parameterized and use `ON CONFLICT ... DO NOTHING`
//! keyed on the natural key, so re-running the pipeline over the same feed
//! adds zero rows and raises zero errors.

use sqlx::PgPool;
use tracing::info;

use crate::error::Result;
use crate::models::BookRecord;

const INSERT_BOOK: &str = "INSERT INTO books \
    (book_id, title, rating, description, language, isbn, book_format, edition, \
     pages, publisher, publish_date, first_publish_date, liked_percent, price) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
    ON CONFLICT (book_id) DO NOTHING";

const INSERT_BOOK_AUTHOR: &str = "INSERT INTO books_authors (book_id, author_id) \
    VALUES ($1, $2) ON CONFLICT DO NOTHING";

/// Transactional chunk writer for books and their author links.
pub struct BatchWriter {
    pool: PgPool,
    batch_size: usize,
    pending: Vec<(BookRecord, Option<i32>)>,
    written: u64,
}

impl BatchWriter {
    pub fn new(pool: PgPool, batch_size: usize) -> Self {
        Self {
            pool,
            batch_size,
            pending: Vec::with_capacity(batch_size),
            written: 0,
        }
    }

    /// Stage one record; flushes a full chunk transparently.
    ///
    /// `author_id` of `None` means the row had a blank author: the book is
    /// written, the link is dropped.
    pub async fn push(&mut self, book: BookRecord, author_id: Option<i32>) -> Result<()> {
        self.pending.push((book, author_id));
        if self.pending.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Flush the tail chunk and return the total records committed.
    pub async fn finish(mut self) -> Result<u64> {
        self.flush().await?;
        Ok(self.written)
    }

    /// Apply all pending records in one transaction.
    async fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for (book, author_id) in &self.pending {
            sqlx::query(INSERT_BOOK)
                .bind(book.book_id)
                .bind(&book.title)
                .bind(&book.rating)
                .bind(&book.description)
                .bind(&book.language)
                .bind(&book.isbn)
                .bind(&book.book_format)
                .bind(&book.edition)
                .bind(book.pages)
                .bind(&book.publisher)
                .bind(book.publish_date)
                .bind(book.first_publish_date)
                .bind(&book.liked_percent)
                .bind(&book.price)
                .execute(&mut *tx)
                .await?;

            if let Some(author_id) = author_id {
                sqlx::query(INSERT_BOOK_AUTHOR)
                    .bind(book.book_id)
                    .bind(author_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        self.written += self.pending.len() as u64;
        self.pending.clear();
        info!(records = self.written, "Committed chunk");

        Ok(())
    }
}
