// Cricsheet ball-by-ball ingestion
//
// Turns one JSON file per match (info + innings -> overs -> deliveries) into
// a cricket_matches row and one cricket_deliveries row per ball.
//
// Architecture:
// - Load: eager JSON parse into typed raw structures (loader)
// - Normalize: flatten each innings into canonical delivery rows (normalizer)
// - Summarize: match-level metadata (summary)
// - Store: one transaction per match behind the MatchStore trait (storage)
// - Coordinate: idempotence check, failure isolation, batch report (coordinator)

pub mod coordinator;
pub mod discovery;
pub mod loader;
pub mod models;
pub mod normalizer;
pub mod storage;
pub mod summary;

pub use coordinator::{
    BatchReport, IngestOptions, IngestionCoordinator, MatchOutcome, MatchReport, SkipReason,
};
pub use discovery::discover_match_files;
pub use loader::{load_match, match_id_from_path, parse_match};
pub use models::{
    MatchSummary, NormalizedDelivery, RawDelivery, RawInnings, RawMatch, RawMatchInfo, RawOver,
    DELIVERY_COLUMNS,
};
pub use normalizer::{normalize_innings, normalize_match, InningsTotals};
pub use storage::{InMemoryMatchStore, MatchStore, PersistStats, PgMatchStore};
pub use summary::extract_summary;

/// Rows per multi-row INSERT. 22 columns x 1000 rows stays well below the
/// Postgres limit of 65535 bind parameters.
pub const DEFAULT_DELIVERY_CHUNK_SIZE: usize = 1000;

/// Result type for cricsheet ingestion
pub type Result<T> = std::result::Result<T, IngestError>;

/// Position of a delivery in the source file, all 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryLocation {
    pub innings: usize,
    pub over: usize,
    pub delivery: usize,
}

impl std::fmt::Display for DeliveryLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "innings {}, over {}, delivery {}",
            self.innings, self.over, self.delivery
        )
    }
}

/// Input is well-formed but lacks something the canonical schema requires
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required field `{field}` at {location}")]
    MissingField {
        field: &'static str,
        location: DeliveryLocation,
    },

    #[error("match `info` section is absent")]
    MissingInfo,

    #[error("innings index {index} out of range (match has {count} innings)")]
    InningsOutOfRange { index: usize, count: usize },
}

/// Writing a match to the store failed; the match's transaction is rolled back
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Match '{0}' already exists in the store")]
    DuplicateMatch(String),

    #[error(
        "Duplicate delivery for match '{match_id}': innings {innings_number}, over {overs}, ball {balls}"
    )]
    DuplicateDelivery {
        match_id: String,
        innings_number: i32,
        overs: i32,
        balls: i32,
    },
}

/// Every way a single match can fail. None of these abort a batch.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Parse error in {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Failed to read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

impl IngestError {
    pub fn parse(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Short category name used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Parse { .. } => "parse",
            IngestError::Io { .. } => "io",
            IngestError::Schema(_) => "schema",
            IngestError::Persistence(_) => "persistence",
        }
    }
}

impl From<sqlx::Error> for IngestError {
    fn from(err: sqlx::Error) -> Self {
        IngestError::Persistence(PersistenceError::Database(err))
    }
}
