//! BCP Ingest Library
//!
//! Bulk ingestion of the remote book catalog CSV feed into PostgreSQL.
//!
//! The pipeline fetches the feed over HTTP, streams it through a CSV parser,
//! projects each raw row into a typed [`models::BookRecord`], resolves author
//! names to surrogate ids through a per-run cache, and writes books plus
//! book-author links in fixed-size transactional chunks. Re-running the
//! pipeline against an already-populated database is safe: every insert uses
//! an `ON CONFLICT DO NOTHING` policy keyed on the natural key.
//!
//! # Example
//!
//! ```no_run
//! use bcp_ingest::{config::Config, db, pipeline::IngestPipeline};
//!
//! #[tokio::main]
//! async fn main() -> bcp_ingest::Result<()> {
//!     let config = Config::from_env()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     let summary = IngestPipeline::new(config, pool).run().await?;
//!     println!("wrote {} books", summary.books_written);
//!     Ok(())
//! }
//! ```

pub mod authors;
pub mod coerce;
pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod mapper;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod writer;

pub use error::{IngestError, Result};
