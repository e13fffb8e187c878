// Cricsheet storage layer
//
// A match is written as one transaction: the cricket_matches row first, then
// its deliveries in chunked multi-row INSERTs. Any failure rolls the whole
// match back, so a match_id present in cricket_matches always has its complete
// set of deliveries.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::{debug, error, info};

use super::models::{MatchSummary, NormalizedDelivery, DELIVERY_COLUMNS, MATCH_COLUMNS};
use super::{PersistenceError, Result, DEFAULT_DELIVERY_CHUNK_SIZE};

/// Result of persisting one match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistStats {
    pub match_id: String,
    pub deliveries_written: usize,
    pub chunks: usize,
}

/// Destination for ingested matches
#[async_trait]
pub trait MatchStore: Send {
    /// Whether a summary row for `match_id` already exists
    async fn match_exists(&mut self, match_id: &str) -> Result<bool>;

    /// Write the summary and all deliveries of one match atomically.
    ///
    /// On error nothing of the match is visible in the store.
    async fn persist_match(
        &mut self,
        summary: &MatchSummary,
        deliveries: &[NormalizedDelivery],
    ) -> Result<PersistStats>;
}

/// Reject a delivery set that would violate the per-match ball key
fn check_unique_keys(match_id: &str, deliveries: &[NormalizedDelivery]) -> Result<()> {
    let mut seen = HashSet::with_capacity(deliveries.len());
    for delivery in deliveries {
        if !seen.insert(delivery.key()) {
            let (innings_number, overs, balls) = delivery.key();
            return Err(PersistenceError::DuplicateDelivery {
                match_id: match_id.to_string(),
                innings_number,
                overs,
                balls,
            }
            .into());
        }
    }
    Ok(())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

// ============================================================================
// Postgres
// ============================================================================

/// Postgres-backed store over `cricket_matches` / `cricket_deliveries`
pub struct PgMatchStore {
    pool: PgPool,
    chunk_size: usize,
}

impl PgMatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self::with_chunk_size(pool, DEFAULT_DELIVERY_CHUNK_SIZE)
    }

    /// A chunk size of 0 is treated as 1
    pub fn with_chunk_size(pool: PgPool, chunk_size: usize) -> Self {
        Self {
            pool,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Number of delivery rows stored for `match_id`
    pub async fn delivery_count(&self, match_id: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cricket_deliveries WHERE match_id = $1")
                .bind(match_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Number of matches stored
    pub async fn match_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cricket_matches")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn write_match(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        summary: &MatchSummary,
        deliveries: &[NormalizedDelivery],
    ) -> Result<PersistStats> {
        self.insert_summary(tx, summary).await?;

        let total_chunks = deliveries.len().div_ceil(self.chunk_size);
        let mut written = 0;

        for (chunk_idx, chunk) in deliveries.chunks(self.chunk_size).enumerate() {
            debug!(
                match_id = %summary.match_id,
                chunk = chunk_idx + 1,
                total_chunks,
                rows = chunk.len(),
                "Inserting deliveries chunk"
            );

            self.batch_insert_deliveries(tx, &summary.match_id, chunk)
                .await?;
            written += chunk.len();
        }

        Ok(PersistStats {
            match_id: summary.match_id.clone(),
            deliveries_written: written,
            chunks: total_chunks,
        })
    }

    async fn insert_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        summary: &MatchSummary,
    ) -> Result<()> {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO cricket_matches ({}) ",
            MATCH_COLUMNS.join(", ")
        ));

        query_builder.push_values(std::iter::once(summary), |mut b, s| {
            b.push_bind(&s.match_id)
                .push_bind(&s.match_type)
                .push_bind(s.match_type_number)
                .push_bind(&s.gender)
                .push_bind(&s.venue)
                .push_bind(&s.city)
                .push_bind(&s.dates)
                .push_bind(&s.team1)
                .push_bind(&s.team2)
                .push_bind(&s.toss_winner)
                .push_bind(&s.toss_decision)
                .push_bind(&s.winner)
                .push_bind(&s.result_type)
                .push_bind(&s.result_margin)
                .push_bind(&s.player_of_match);
        });

        query_builder
            .build()
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PersistenceError::DuplicateMatch(summary.match_id.clone())
                } else {
                    PersistenceError::Database(e)
                }
            })?;

        Ok(())
    }

    async fn batch_insert_deliveries(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        match_id: &str,
        deliveries: &[NormalizedDelivery],
    ) -> Result<()> {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO cricket_deliveries ({}) ",
            DELIVERY_COLUMNS.join(", ")
        ));

        query_builder.push_values(deliveries, |mut b, d| {
            b.push_bind(match_id)
                .push_bind(d.innings_number)
                .push_bind(d.overs)
                .push_bind(d.balls)
                .push_bind(&d.batter)
                .push_bind(&d.non_striker)
                .push_bind(&d.bowler)
                .push_bind(d.runs_batter)
                .push_bind(d.runs_extras)
                .push_bind(d.runs_total)
                .push_bind(d.extras_wides)
                .push_bind(d.extras_legbyes)
                .push_bind(d.extras_noballs)
                .push_bind(d.extras_byes)
                .push_bind(&d.description)
                .push_bind(&d.ball_areas)
                .push_bind(d.is_wicket())
                .push_bind(&d.wicket_player_out)
                .push_bind(&d.wicket_kind)
                .push_bind(&d.wicket_fielder)
                .push_bind(&d.is_drs)
                .push_bind(&d.is_umpires_call);
        });

        query_builder.build().execute(&mut **tx).await?;

        Ok(())
    }
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn match_exists(&mut self, match_id: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cricket_matches WHERE match_id = $1)")
                .bind(match_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn persist_match(
        &mut self,
        summary: &MatchSummary,
        deliveries: &[NormalizedDelivery],
    ) -> Result<PersistStats> {
        check_unique_keys(&summary.match_id, deliveries)?;

        let mut tx = self.pool.begin().await?;

        match self.write_match(&mut tx, summary, deliveries).await {
            Ok(stats) => {
                tx.commit().await?;
                info!(
                    match_id = %stats.match_id,
                    deliveries = stats.deliveries_written,
                    chunks = stats.chunks,
                    "Committed match"
                );
                Ok(stats)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(
                        match_id = %summary.match_id,
                        rollback_error = %rollback_err,
                        "Failed to roll back match transaction"
                    );
                }
                Err(e)
            }
        }
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Store kept in process memory, used for dry runs and tests.
///
/// Follows the same contract as [`PgMatchStore`]: duplicate matches and
/// duplicate ball keys are rejected before anything is recorded.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    matches: BTreeMap<String, MatchSummary>,
    deliveries: BTreeMap<String, Vec<NormalizedDelivery>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Total delivery rows across all matches
    pub fn delivery_count(&self) -> usize {
        self.deliveries.values().map(Vec::len).sum()
    }

    pub fn summary(&self, match_id: &str) -> Option<&MatchSummary> {
        self.matches.get(match_id)
    }

    /// Deliveries of one match in insertion order
    pub fn deliveries_for(&self, match_id: &str) -> &[NormalizedDelivery] {
        self.deliveries
            .get(match_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn match_ids(&self) -> impl Iterator<Item = &str> {
        self.matches.keys().map(String::as_str)
    }
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn match_exists(&mut self, match_id: &str) -> Result<bool> {
        Ok(self.matches.contains_key(match_id))
    }

    async fn persist_match(
        &mut self,
        summary: &MatchSummary,
        deliveries: &[NormalizedDelivery],
    ) -> Result<PersistStats> {
        if self.matches.contains_key(&summary.match_id) {
            return Err(PersistenceError::DuplicateMatch(summary.match_id.clone()).into());
        }
        check_unique_keys(&summary.match_id, deliveries)?;

        self.matches
            .insert(summary.match_id.clone(), summary.clone());
        self.deliveries
            .insert(summary.match_id.clone(), deliveries.to_vec());

        Ok(PersistStats {
            match_id: summary.match_id.clone(),
            deliveries_written: deliveries.len(),
            chunks: usize::from(!deliveries.is_empty()),
        })
    }
}
