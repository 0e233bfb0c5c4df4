//! Author resolution
//!
//! Maps author names to their surrogate ids in the `authors` table through a
//! read-through cache scoped to one run. The feed references a small set of
//! distinct authors across a much larger set of book rows; without the cache
//! every row would cost a database round-trip.

use sqlx::PgPool;
use std::collections::HashMap;
use tracing::warn;

use crate::error::Result;

const SELECT_AUTHOR: &str = "SELECT author_id FROM authors WHERE name = $1";

// A concurrent writer may insert the same name between our SELECT and
// INSERT; the conflict clause makes that a success, and the re-read picks up
// whichever insert won.
const INSERT_AUTHOR: &str = "INSERT INTO authors (name) VALUES ($1) ON CONFLICT (name) DO NOTHING";

/// Read-through author cache over the destination store.
pub struct AuthorResolver {
    pool: PgPool,
    cache: HashMap<String, i32>,
}

impl AuthorResolver {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: HashMap::new(),
        }
    }

    /// Resolve a name to its author id, inserting the author on first sight.
    ///
    /// Returns `Ok(None)` for blank names: the book row is still written but
    /// no link row will reference it (documented feed policy). Each distinct
    /// name costs at most one insert attempt plus reads for the whole run.
    pub async fn resolve(&mut self, name: &str) -> Result<Option<i32>> {
        if name.trim().is_empty() {
            warn!("Blank author name in feed; book will be written without a link");
            return Ok(None);
        }

        if let Some(id) = self.cache.get(name) {
            return Ok(Some(*id));
        }

        let existing = sqlx::query_scalar::<_, i32>(SELECT_AUTHOR)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        let id = match existing {
            Some(id) => id,
            None => {
                sqlx::query(INSERT_AUTHOR)
                    .bind(name)
                    .execute(&self.pool)
                    .await?;
                sqlx::query_scalar::<_, i32>(SELECT_AUTHOR)
                    .bind(name)
                    .fetch_one(&self.pool)
                    .await?
            },
        };

        self.cache.insert(name.to_string(), id);
        Ok(Some(id))
    }

    /// Cache-only lookup; `None` for blank or never-resolved names.
    pub fn cached(&self, name: &str) -> Option<i32> {
        self.cache.get(name).copied()
    }

    /// Number of distinct authors resolved so far this run.
    pub fn distinct_resolved(&self) -> usize {
        self.cache.len()
    }
}
