//! Processed-match ledger.
//!
//! Every completed match applied to a pacte is recorded once under `(match_id, pacte_id)`.
//! The ledger is the gate that keeps a single match from being counted twice, even when a
//! poll is retried after a crash between detection and persistence.

use chrono::{DateTime, Duration, Utc};
use migration::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::{
    error::AppError,
    model::game_history::{
        GameRecord, LedgerStats, LedgerValidation, MatchOutcome, RejectReason,
    },
};

/// Matches ending earlier than this before `now` are refused by default.
pub const DEFAULT_STALE_AFTER_HOURS: i64 = 2;

/// Repository over the `game_history` table.
pub struct GameHistoryRepository<'a, C> {
    db: &'a C,
    stale_after: Duration,
}

impl<'a, C> GameHistoryRepository<'a, C>
where
    C: ConnectionTrait,
{
    /// Creates a new GameHistoryRepository with the default stale window.
    ///
    /// # Arguments
    /// - `db` - A database connection or an open transaction
    ///
    /// # Returns
    /// - `GameHistoryRepository` - New repository instance
    pub fn new(db: &'a C) -> Self {
        Self {
            db,
            stale_after: Duration::hours(DEFAULT_STALE_AFTER_HOURS),
        }
    }

    /// Overrides how old a match may be before it is refused as stale.
    pub fn stale_after(mut self, window: Duration) -> Self {
        self.stale_after = window;
        self
    }

    /// Whether the match has already been applied to the pacte.
    pub async fn is_processed(&self, match_id: &str, pacte_id: i32) -> Result<bool, AppError> {
        let existing = entity::prelude::GameHistory::find_by_id((match_id.to_string(), pacte_id))
            .one(self.db)
            .await?;

        Ok(existing.is_some())
    }

    /// Records a match for a pacte.
    ///
    /// A conflicting key leaves the existing row untouched.
    ///
    /// # Arguments
    /// - `match_id` - Provider match reference
    /// - `pacte_id` - Pacte the match counted for
    /// - `outcome` - Win or loss for the group
    /// - `now` - Processing time
    ///
    /// # Returns
    /// - `Ok(true)` - A new row was inserted
    /// - `Ok(false)` - The match was already recorded for this pacte
    pub async fn record(
        &self,
        match_id: &str,
        pacte_id: i32,
        outcome: MatchOutcome,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let inserted = entity::prelude::GameHistory::insert(entity::game_history::ActiveModel {
            match_id: ActiveValue::Set(match_id.to_string()),
            pacte_id: ActiveValue::Set(pacte_id),
            result: ActiveValue::Set(outcome.as_str().to_string()),
            processed_at: ActiveValue::Set(now),
        })
        .on_conflict(
            OnConflict::columns([
                entity::game_history::Column::MatchId,
                entity::game_history::Column::PacteId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(self.db)
        .await?;

        Ok(inserted == 1)
    }

    /// Decides whether a completed match may be applied to a pacte.
    ///
    /// # Arguments
    /// - `match_id` - Provider match reference
    /// - `pacte_id` - Pacte the match would count for
    /// - `match_end` - When the match ended
    /// - `now` - Current time
    ///
    /// # Returns
    /// - `Ok(Valid)` - Unseen, recent and not in the future
    /// - `Ok(Rejected(_))` - The first failing check
    pub async fn validate_for_processing(
        &self,
        match_id: &str,
        pacte_id: i32,
        match_end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<LedgerValidation, AppError> {
        if self.is_processed(match_id, pacte_id).await? {
            return Ok(LedgerValidation::Rejected(RejectReason::AlreadyProcessed));
        }
        if match_end > now {
            return Ok(LedgerValidation::Rejected(RejectReason::FutureDated));
        }
        if now - match_end > self.stale_after {
            return Ok(LedgerValidation::Rejected(RejectReason::Stale));
        }

        Ok(LedgerValidation::Valid)
    }

    /// Deletes rows processed more than `retention_days` days before `now`.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of rows deleted
    pub async fn prune_older_than(
        &self,
        retention_days: i64,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let cutoff = now - Duration::days(retention_days);

        let result = entity::prelude::GameHistory::delete_many()
            .filter(entity::game_history::Column::ProcessedAt.lt(cutoff))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Matches recorded for a pacte, oldest first.
    pub async fn history_for_pacte(&self, pacte_id: i32) -> Result<Vec<GameRecord>, AppError> {
        entity::prelude::GameHistory::find()
            .filter(entity::game_history::Column::PacteId.eq(pacte_id))
            .order_by_asc(entity::game_history::Column::ProcessedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(GameRecord::from_entity)
            .collect()
    }

    /// Aggregate figures across the whole ledger.
    pub async fn stats(&self) -> Result<LedgerStats, AppError> {
        let total = entity::prelude::GameHistory::find().count(self.db).await?;
        let wins = entity::prelude::GameHistory::find()
            .filter(entity::game_history::Column::Result.eq(MatchOutcome::Win.as_str()))
            .count(self.db)
            .await?;

        let distinct_pactes = entity::prelude::GameHistory::find()
            .select_only()
            .column(entity::game_history::Column::PacteId)
            .distinct()
            .into_tuple::<i32>()
            .all(self.db)
            .await?
            .len() as u64;

        let oldest = entity::prelude::GameHistory::find()
            .order_by_asc(entity::game_history::Column::ProcessedAt)
            .one(self.db)
            .await?
            .map(|row| row.processed_at);
        let newest = entity::prelude::GameHistory::find()
            .order_by_desc(entity::game_history::Column::ProcessedAt)
            .one(self.db)
            .await?
            .map(|row| row.processed_at);

        Ok(LedgerStats {
            total,
            wins,
            losses: total - wins,
            distinct_pactes,
            oldest,
            newest,
        })
    }
}
