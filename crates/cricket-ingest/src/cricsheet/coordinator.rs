//! Batch ingestion coordinator
//!
//! Each match file is one unit of work that ends in exactly one of
//! [`MatchOutcome::Skipped`], [`MatchOutcome::Ingested`] or
//! [`MatchOutcome::Failed`]. A failure is recorded against its match and the
//! batch moves on; nothing is retried.
//!
//! Load, summary extraction and normalization all complete before the store is
//! written, and the write itself is a single store transaction.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::discovery::discover_match_files;
use super::loader::{load_match, match_id_from_path};
use super::normalizer::{normalize_match, InningsTotals};
use super::storage::MatchStore;
use super::summary::extract_summary;
use super::{IngestError, Result};

/// Per-run ingestion settings
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Allowed `match_type` values, compared case-insensitively. Empty allows
    /// every match type.
    pub match_types: Vec<String>,
}

impl IngestOptions {
    pub fn with_match_types<I, T>(match_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            match_types: match_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a match of this type should be ingested
    pub fn allows(&self, match_type: Option<&str>) -> bool {
        if self.match_types.is_empty() {
            return true;
        }
        match_type.is_some_and(|mt| {
            self.match_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(mt))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The store already holds this match_id
    AlreadyIngested,
    /// The match type is not in the configured allowlist
    MatchTypeFiltered { match_type: Option<String> },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyIngested => write!(f, "already ingested"),
            SkipReason::MatchTypeFiltered { match_type } => write!(
                f,
                "match type {} not selected",
                match_type.as_deref().unwrap_or("<unknown>")
            ),
        }
    }
}

/// Terminal state of one match
#[derive(Debug)]
pub enum MatchOutcome {
    Skipped(SkipReason),
    Ingested { innings: usize, deliveries: usize },
    Failed(IngestError),
}

impl MatchOutcome {
    /// Skipped and ingested matches both count as successful
    pub fn is_success(&self) -> bool {
        !self.is_failed()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MatchOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&IngestError> {
        match self {
            MatchOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::Skipped(reason) => write!(f, "skipped ({})", reason),
            MatchOutcome::Ingested {
                innings,
                deliveries,
            } => write!(f, "ingested {} deliveries in {} innings", deliveries, innings),
            MatchOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

#[derive(Debug)]
pub struct MatchReport {
    /// File stem, or the full path when no stem could be derived
    pub match_id: String,
    pub path: PathBuf,
    pub outcome: MatchOutcome,
}

/// Outcome of one batch run
#[derive(Debug)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub matches: Vec<MatchReport>,
}

impl BatchReport {
    pub fn ingested(&self) -> usize {
        self.count(|o| matches!(o, MatchOutcome::Ingested { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, MatchOutcome::Skipped(_)))
    }

    pub fn successful(&self) -> usize {
        self.count(MatchOutcome::is_success)
    }

    pub fn failed(&self) -> usize {
        self.count(MatchOutcome::is_failed)
    }

    pub fn total(&self) -> usize {
        self.matches.len()
    }

    /// Deliveries written by this run
    pub fn deliveries_written(&self) -> usize {
        self.matches
            .iter()
            .map(|m| match m.outcome {
                MatchOutcome::Ingested { deliveries, .. } => deliveries,
                _ => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MatchReport> {
        self.matches.iter().filter(|m| m.outcome.is_failed())
    }

    pub fn success_rate(&self) -> f64 {
        if self.matches.is_empty() {
            return 0.0;
        }
        self.successful() as f64 / self.total() as f64
    }

    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }

    fn count(&self, predicate: impl Fn(&MatchOutcome) -> bool) -> usize {
        self.matches.iter().filter(|m| predicate(&m.outcome)).count()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ingestion run {}", self.run_id)?;
        writeln!(
            f,
            "  Successful: {} ({} ingested, {} skipped)",
            self.successful(),
            self.ingested(),
            self.skipped()
        )?;
        writeln!(f, "  Failed:     {}", self.failed())?;
        writeln!(f, "  Total:      {}", self.total())?;
        write!(f, "  Deliveries: {}", self.deliveries_written())?;
        for failure in self.failures() {
            write!(f, "\n  {} -> {}", failure.match_id, failure.outcome)?;
        }
        Ok(())
    }
}

/// Drives matches through load, summary, normalization and persistence
pub struct IngestionCoordinator<S: MatchStore> {
    store: S,
    options: IngestOptions,
}

impl<S: MatchStore> IngestionCoordinator<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, IngestOptions::default())
    }

    pub fn with_options(store: S, options: IngestOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Ingest every match file found directly in `dir`
    pub async fn ingest_directory(&mut self, dir: &Path) -> Result<BatchReport> {
        let files = discover_match_files(dir)?;
        info!(dir = %dir.display(), files = files.len(), "Starting ingestion");
        Ok(self.ingest_files(&files).await)
    }

    /// Ingest the given files sequentially, in order
    pub async fn ingest_files(&mut self, paths: &[PathBuf]) -> BatchReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut matches = Vec::with_capacity(paths.len());

        for path in paths {
            matches.push(self.ingest_file(path).await);
        }

        let report = BatchReport {
            run_id,
            started_at,
            completed_at: Utc::now(),
            matches,
        };

        info!(
            run_id = %report.run_id,
            successful = report.successful(),
            failed = report.failed(),
            total = report.total(),
            deliveries = report.deliveries_written(),
            duration_ms = report.duration().num_milliseconds(),
            "Ingestion run complete"
        );

        report
    }

    /// Ingest one match file. Never fails; errors are folded into the report.
    pub async fn ingest_file(&mut self, path: &Path) -> MatchReport {
        let (match_id, outcome) = match match_id_from_path(path) {
            Ok(match_id) => {
                let outcome = match self.process(path, &match_id).await {
                    Ok(outcome) => outcome,
                    Err(e) => MatchOutcome::Failed(e),
                };
                (match_id, outcome)
            }
            Err(e) => (path.display().to_string(), MatchOutcome::Failed(e)),
        };

        match &outcome {
            MatchOutcome::Ingested { deliveries, .. } => {
                info!(match_id = %match_id, deliveries, "Added deliveries");
            }
            MatchOutcome::Skipped(reason) => {
                info!(match_id = %match_id, reason = %reason, "Skipped match");
            }
            MatchOutcome::Failed(e) => {
                error!(
                    match_id = %match_id,
                    path = %path.display(),
                    kind = e.kind(),
                    error = %e,
                    "Failed to ingest match"
                );
            }
        }

        MatchReport {
            match_id,
            path: path.to_path_buf(),
            outcome,
        }
    }

    async fn process(&mut self, path: &Path, match_id: &str) -> Result<MatchOutcome> {
        debug!(match_id = %match_id, path = %path.display(), "Processing match");

        if self.store.match_exists(match_id).await? {
            return Ok(MatchOutcome::Skipped(SkipReason::AlreadyIngested));
        }

        let raw = load_match(path)?;
        let summary = extract_summary(&raw, match_id)?;

        if !self.options.allows(summary.match_type.as_deref()) {
            return Ok(MatchOutcome::Skipped(SkipReason::MatchTypeFiltered {
                match_type: summary.match_type,
            }));
        }

        let innings = normalize_match(&raw)?;
        for (index, (rows, source)) in innings.iter().zip(&raw.innings).enumerate() {
            let totals = InningsTotals::from_rows(index, source.team.as_deref(), rows);
            debug!(
                match_id = %match_id,
                innings = totals.innings_number,
                team = totals.team.as_deref().unwrap_or("<unknown>"),
                deliveries = totals.deliveries,
                runs = totals.runs,
                wickets = totals.wickets,
                "Normalized innings"
            );
        }

        let innings_count = innings.len();
        let deliveries: Vec<_> = innings.into_iter().flatten().collect();
        if deliveries.is_empty() {
            warn!(match_id = %match_id, "Match has no deliveries");
        }

        let stats = self.store.persist_match(&summary, &deliveries).await?;

        Ok(MatchOutcome::Ingested {
            innings: innings_count,
            deliveries: stats.deliveries_written,
        })
    }
}
