//! Cricsheet ball-by-ball ingestion
//!
//! Loads one JSON file per match, flattens every delivery into a fixed column
//! set, and writes each match to Postgres exactly once.
//!
//! ```no_run
//! use cricket_ingest::cricsheet::{InMemoryMatchStore, IngestionCoordinator};
//!
//! # async fn run() -> cricket_ingest::cricsheet::Result<()> {
//! let mut coordinator = IngestionCoordinator::new(InMemoryMatchStore::new());
//! let report = coordinator.ingest_directory("data".as_ref()).await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod cricsheet;
pub mod db;

pub use config::{DatabaseConfig, IngestConfig};
