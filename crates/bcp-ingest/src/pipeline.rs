//! Ingestion orchestrator
//!
//! Sequences fetch -> parse -> map -> resolve -> write and owns the run's
//! phase machine. Phases are strictly sequential with no backtracking; any
//! fatal error moves the pipeline to `Failed` after one consolidated error
//! report carrying the phase and the record counts seen so far.
//!
//! Authors are resolved for every row before any book or link is staged, so
//! each link row always references an id that is already committed.

use futures::StreamExt;
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::authors::AuthorResolver;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::fetch_feed;
use crate::mapper::HeaderIndex;
use crate::models::MappedRow;
use crate::parse::{feed_reader, RawRecord};
use crate::writer::BatchWriter;

/// Run phases, in transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    Parsing,
    MappingHeader,
    ResolvingAuthors,
    WritingBooks,
    Done,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Fetching => "fetching",
            Phase::Parsing => "parsing",
            Phase::MappingHeader => "mapping-header",
            Phase::ResolvingAuthors => "resolving-authors",
            Phase::WritingBooks => "writing-books",
            Phase::Done => "done",
            Phase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub records_read: u64,
    pub books_written: u64,
    pub authors_resolved: usize,
    pub elapsed: Duration,
}

/// One ingestion run over the configured feed and store.
pub struct IngestPipeline {
    config: Config,
    pool: PgPool,
    phase: Phase,
    records_read: u64,
}

impl IngestPipeline {
    pub fn new(config: Config, pool: PgPool) -> Self {
        Self {
            config,
            pool,
            phase: Phase::Idle,
            records_read: 0,
        }
    }

    /// Phase the pipeline is in (or failed in).
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Execute the run end to end.
    ///
    /// On failure the error has already been reported once with full context;
    /// callers only need to exit non-zero.
    pub async fn run(&mut self) -> Result<IngestSummary> {
        let started = Instant::now();

        match self.execute(started).await {
            Ok(summary) => {
                self.phase = Phase::Done;
                info!(
                    records_read = summary.records_read,
                    books_written = summary.books_written,
                    authors_resolved = summary.authors_resolved,
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    "Ingestion completed successfully"
                );
                Ok(summary)
            },
            Err(e) => {
                error!(
                    phase = %self.phase,
                    records_read = self.records_read,
                    error = %e,
                    "Ingestion failed"
                );
                self.phase = Phase::Failed;
                Err(e)
            },
        }
    }

    async fn execute(&mut self, started: Instant) -> Result<IngestSummary> {
        self.phase = Phase::Fetching;
        info!(url = %self.config.feed.url, "Downloading feed");
        let response = fetch_feed(&self.config.feed).await?;

        self.phase = Phase::Parsing;
        let mut reader = feed_reader(response);
        let header = reader.headers().await?.clone();

        let mut raw_rows: Vec<RawRecord> = Vec::new();
        let mut records = reader.records();
        while let Some(record) = records.next().await {
            raw_rows.push(record?);
            self.records_read += 1;
        }
        drop(records);
        info!(records = self.records_read, "Parsed feed");

        if raw_rows.is_empty() {
            warn!("No records found in feed; nothing to ingest");
            return Ok(IngestSummary {
                records_read: 0,
                books_written: 0,
                authors_resolved: 0,
                elapsed: started.elapsed(),
            });
        }

        self.phase = Phase::MappingHeader;
        let index = HeaderIndex::from_header(&header)?;
        let rows: Vec<MappedRow> = raw_rows.iter().map(|raw| index.map_record(raw)).collect();
        drop(raw_rows);

        self.phase = Phase::ResolvingAuthors;
        info!("Phase 1: syncing authors");
        let mut resolver = AuthorResolver::new(self.pool.clone());
        for row in &rows {
            resolver.resolve(&row.author).await?;
        }
        info!(authors = resolver.distinct_resolved(), "Authors synced");

        self.phase = Phase::WritingBooks;
        info!("Phase 2: syncing books and relationships");
        let mut writer = BatchWriter::new(self.pool.clone(), self.config.batch_size);
        for row in rows {
            let author_id = resolver.cached(&row.author);
            writer.push(row.book, author_id).await?;
        }
        let books_written = writer.finish().await?;

        Ok(IngestSummary {
            records_read: self.records_read,
            books_written,
            authors_resolved: resolver.distinct_resolved(),
            elapsed: started.elapsed(),
        })
    }
}
