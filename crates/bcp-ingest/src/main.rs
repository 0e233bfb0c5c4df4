//! BCP Ingest - book catalog feed importer

use bcp_common::logging::{init_logging, LogConfig, LogLevel};
use bcp_ingest::config::Config;
use bcp_ingest::pipeline::IngestPipeline;
use bcp_ingest::{db, Result};
use clap::Parser;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "bcp-ingest")]
#[command(author, version, about = "Ingest the book catalog CSV feed into PostgreSQL")]
struct Cli {
    /// Override the feed URL from the environment
    #[arg(long)]
    feed_url: Option<String>,

    /// Override the chunk size for transactional writes
    #[arg(long)]
    batch_size: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let base = LogConfig::default()
        .with_level(log_level)
        .with_file_prefix("bcp-ingest");

    // Environment variables take precedence over CLI-derived defaults.
    let log_config = LogConfig::from_env(base).unwrap_or_default();

    if let Err(e) = init_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(_e) = run(cli).await {
        // The pipeline already emitted one consolidated failure report.
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e);
        },
    };

    if let Some(feed_url) = cli.feed_url {
        config.feed.url = feed_url;
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e);
    }

    let pool = match db::create_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            return Err(e);
        },
    };

    let mut pipeline = IngestPipeline::new(config, pool.clone());
    let result = pipeline.run().await.map(|_| ());

    // Release connections on every exit path.
    pool.close().await;

    result
}
