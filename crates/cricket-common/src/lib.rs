//! Cricket Common Library
//!
//! Shared error handling and logging setup for the cricket ingestion workspace.
//!
//! - **Error Handling**: [`CricketError`] and the [`Result`] alias used by
//!   configuration and file-system helpers
//! - **Logging**: [`logging::LogConfig`] and [`logging::init_logging`], the one
//!   place a `tracing` subscriber is installed
//!
//! # Example
//!
//! ```no_run
//! use cricket_common::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     info!("ready");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;

pub use error::{CricketError, Result};
