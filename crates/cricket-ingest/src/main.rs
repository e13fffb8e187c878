//! Cricket Ingest - ball-by-ball match ingestion tool

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cricket_common::logging::{init_logging, LogConfig, LogLevel};
use cricket_ingest::config::IngestConfig;
use cricket_ingest::cricsheet::{
    BatchReport, InMemoryMatchStore, IngestOptions, IngestionCoordinator, MatchStore, PgMatchStore,
};
use cricket_ingest::db;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "cricket-ingest")]
#[command(author, version, about = "Cricsheet ball-by-ball ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest every match file in a directory
    Ingest {
        /// Directory of match JSON files [env: CRICKET_DATA_DIR]
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Only ingest these match types (repeatable or comma-separated)
        #[arg(short = 't', long = "match-type", value_delimiter = ',')]
        match_types: Vec<String>,

        /// Rows per delivery INSERT [env: CRICKET_DELIVERY_CHUNK_SIZE]
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Database connection URL
        #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
        database_url: Option<String>,

        /// Load and normalize everything without touching the database
        #[arg(long)]
        dry_run: bool,

        /// Do not apply pending migrations first
        #[arg(long)]
        skip_migrations: bool,
    },

    /// Apply database migrations
    Migrate {
        /// Database connection URL
        #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the CLI default
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("cricket-ingest")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    let mut config = IngestConfig::from_env().context("Failed to load configuration")?;

    match cli.command {
        Command::Ingest {
            data_dir,
            match_types,
            chunk_size,
            database_url,
            dry_run,
            skip_migrations,
        } => {
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            if !match_types.is_empty() {
                config.match_types = match_types;
            }
            if let Some(size) = chunk_size {
                config.delivery_chunk_size = size;
            }
            if let Some(url) = database_url {
                config.database.url = url;
            }
            config.validate()?;
            config.ensure_data_dir()?;

            let report = if dry_run {
                info!(data_dir = %config.data_dir.display(), "Dry run: nothing will be written");
                run_batch(InMemoryMatchStore::new(), &config).await?
            } else {
                config.database.validate()?;
                let pool = db::create_pool(&config.database)
                    .await
                    .context("Failed to connect to database")?;
                db::health_check(&pool).await?;
                if skip_migrations {
                    warn!("Skipping database migrations");
                } else {
                    db::run_migrations(&pool).await?;
                }
                run_batch(
                    PgMatchStore::with_chunk_size(pool, config.delivery_chunk_size),
                    &config,
                )
                .await?
            };

            println!("{}", report);

            if report.failed() > 0 {
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Migrate { database_url } => {
            if let Some(url) = database_url {
                config.database.url = url;
            }
            config.database.validate()?;
            let pool = db::create_pool(&config.database)
                .await
                .context("Failed to connect to database")?;
            db::run_migrations(&pool).await?;
        },
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_batch<S: MatchStore>(store: S, config: &IngestConfig) -> Result<BatchReport> {
    let options = IngestOptions::with_match_types(config.match_types.clone());
    let mut coordinator = IngestionCoordinator::with_options(store, options);

    let report = coordinator
        .ingest_directory(&config.data_dir)
        .await
        .with_context(|| format!("Failed to ingest {}", config.data_dir.display()))?;

    Ok(report)
}
