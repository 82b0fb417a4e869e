//! Pacte data repository.
//!
//! This module provides the `PacteRepository`, the single owner of pacte and participant
//! rows. Every operation that changes a pacte's status or membership runs inside its own
//! transaction. Called on a `DatabaseTransaction`, it nests as a savepoint so callers can
//! combine several operations into one unit of work.
//!
//! Writes that race (signatures, departures) are issued as conditional updates first and
//! diagnosed afterwards. The update takes the write lock before anything is counted, so
//! two concurrent signatures cannot both observe the pacte as incomplete.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    sea_query::{Expr, Query, SelectStatement},
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionSession, TransactionTrait,
};
use std::collections::HashSet;

use crate::{
    data::user::UserRepository,
    error::{internal::InternalError, pacte::PacteError, AppError},
    model::{
        pacte::{
            DepartureOutcome, Pacte, PacteHistoryEntry, PacteStatus, SignOutcome, UnkickOutcome,
        },
        participant::{KickRecord, Participant},
        update::PacteUpdate,
        user::User,
    },
};

/// Smallest objective a pacte may be created with.
pub const MIN_OBJECTIVE: i32 = 3;
/// Largest objective a pacte may be created with.
pub const MAX_OBJECTIVE: i32 = 10;
/// Maximum number of participants that have not departed.
pub const MAX_PARTICIPANTS: usize = 5;
/// Largest page a history read returns.
pub const MAX_HISTORY_LIMIT: u64 = 20;

/// Repository providing pacte lifecycle and membership operations.
pub struct PacteRepository<'a, C> {
    db: &'a C,
}

impl<'a, C> PacteRepository<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    /// Creates a new PacteRepository instance.
    ///
    /// # Arguments
    /// - `db` - A database connection or an open transaction
    ///
    /// # Returns
    /// - `PacteRepository` - New repository instance
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Creates a pending pacte with one unsigned participant row per user.
    ///
    /// Duplicate ids are collapsed before counting.
    ///
    /// # Arguments
    /// - `objective` - Consecutive wins required, 3 to 10
    /// - `participant_ids` - Discord ids of the initial participants
    /// - `channel_id` - Discord channel the pacte reports to
    /// - `now` - Creation time
    ///
    /// # Returns
    /// - `Ok(Pacte)` - The created pacte
    /// - `Err(PacteErr(InvalidObjective))` - Objective out of range
    /// - `Err(PacteErr(InvalidParticipantCount))` - No participant or more than 5
    /// - `Err(PacteErr(UserNotRegistered))` - A participant has no linked account
    /// - `Err(PacteErr(AlreadyInPacte))` - A participant is already in an open pacte
    pub async fn create(
        &self,
        objective: i32,
        participant_ids: &[String],
        channel_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Pacte, AppError> {
        if !(MIN_OBJECTIVE..=MAX_OBJECTIVE).contains(&objective) {
            return Err(PacteError::InvalidObjective(objective).into());
        }

        let mut seen = HashSet::new();
        let ids: Vec<&String> = participant_ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .collect();

        if ids.is_empty() || ids.len() > MAX_PARTICIPANTS {
            return Err(PacteError::InvalidParticipantCount(ids.len()).into());
        }

        let txn = self.db.begin().await?;
        let users = UserRepository::new(&txn);

        for id in &ids {
            if users.find_by_discord_id(id).await?.is_none() {
                return Err(PacteError::UserNotRegistered(id.to_string()).into());
            }
            if open_membership(&txn, id).await?.is_some() {
                return Err(PacteError::AlreadyInPacte(id.to_string()).into());
            }
        }

        let pacte = entity::pacte::ActiveModel {
            objective: ActiveValue::Set(objective),
            status: ActiveValue::Set(PacteStatus::Pending.as_str().to_string()),
            current_wins: ActiveValue::Set(0),
            best_streak_reached: ActiveValue::Set(0),
            in_game: ActiveValue::Set(false),
            current_game_id: ActiveValue::Set(None),
            match_started_at: ActiveValue::Set(None),
            result_pending_since: ActiveValue::Set(None),
            result_poll_count: ActiveValue::Set(0),
            warning_sent: ActiveValue::Set(false),
            error_count: ActiveValue::Set(0),
            channel_id: ActiveValue::Set(channel_id.to_string()),
            created_at: ActiveValue::Set(now),
            started_at: ActiveValue::Set(None),
            completed_at: ActiveValue::Set(None),
            last_checked_at: ActiveValue::Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let rows = ids.iter().map(|id| entity::participant::ActiveModel {
            pacte_id: ActiveValue::Set(pacte.id),
            user_id: ActiveValue::Set(id.to_string()),
            joined_at: ActiveValue::Set(now),
            signed_at: ActiveValue::Set(None),
            left_at: ActiveValue::Set(None),
            kicked_at: ActiveValue::Set(None),
            kick_reason: ActiveValue::Set(None),
            kicked_by: ActiveValue::Set(None),
            points_gained: ActiveValue::Set(0),
        });

        entity::prelude::Participant::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;

        Pacte::from_entity(pacte)
    }

    /// Records a participant's signature.
    ///
    /// The signature that completes the set flips the pacte from pending to active and
    /// stamps `started_at`. The flip is a conditional update, so exactly one caller sees
    /// `activated == true` even when the last signatures land concurrently.
    ///
    /// # Arguments
    /// - `pacte_id` - Pacte being signed
    /// - `user_id` - Discord id of the signer
    /// - `now` - Signature time
    ///
    /// # Returns
    /// - `Ok(SignOutcome)` - Signed and total counts after the signature
    /// - `Err(PacteErr(PacteNotFound | PacteClosed | NotAParticipant | AlreadySigned))`
    pub async fn sign(
        &self,
        pacte_id: i32,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SignOutcome, AppError> {
        let txn = self.db.begin().await?;

        let signed = entity::prelude::Participant::update_many()
            .col_expr(entity::participant::Column::SignedAt, Expr::value(now))
            .filter(entity::participant::Column::PacteId.eq(pacte_id))
            .filter(entity::participant::Column::UserId.eq(user_id))
            .filter(entity::participant::Column::SignedAt.is_null())
            .filter(entity::participant::Column::LeftAt.is_null())
            .filter(entity::participant::Column::KickedAt.is_null())
            .filter(entity::participant::Column::PacteId.in_subquery(open_pacte_ids()))
            .exec(&txn)
            .await?;

        if signed.rows_affected == 0 {
            let pacte = require_open_pacte(&txn, pacte_id).await?;
            let participant =
                entity::prelude::Participant::find_by_id((pacte.id, user_id.to_string()))
                    .one(&txn)
                    .await?;

            return Err(match participant {
                Some(p) if p.left_at.is_none() && p.kicked_at.is_none() => {
                    PacteError::AlreadySigned
                }
                _ => PacteError::NotAParticipant,
            }
            .into());
        }

        let total_count = present_participants(pacte_id).count(&txn).await?;
        let signed_count = present_participants(pacte_id)
            .filter(entity::participant::Column::SignedAt.is_not_null())
            .count(&txn)
            .await?;
        let all_signed = signed_count == total_count;

        let activated = if all_signed {
            let result = entity::prelude::Pacte::update_many()
                .col_expr(
                    entity::pacte::Column::Status,
                    Expr::value(PacteStatus::Active.as_str()),
                )
                .col_expr(entity::pacte::Column::StartedAt, Expr::value(now))
                .filter(entity::pacte::Column::Id.eq(pacte_id))
                .filter(entity::pacte::Column::Status.eq(PacteStatus::Pending.as_str()))
                .exec(&txn)
                .await?;
            result.rows_affected == 1
        } else {
            false
        };

        txn.commit().await?;

        Ok(SignOutcome {
            all_signed,
            signed_count,
            total_count,
            activated,
        })
    }

    /// Adds an unsigned participant to a pacte that has not won a game yet.
    ///
    /// # Returns
    /// - `Ok(Participant)` - The new participant row
    /// - `Err(PacteErr(UserNotRegistered | PacteNotFound | PacteClosed | StreakInProgress
    ///   | AlreadyMember | AlreadyInPacte | PacteFull))`
    pub async fn join(
        &self,
        pacte_id: i32,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Participant, AppError> {
        let txn = self.db.begin().await?;

        if UserRepository::new(&txn)
            .find_by_discord_id(user_id)
            .await?
            .is_none()
        {
            return Err(PacteError::UserNotRegistered(user_id.to_string()).into());
        }

        let pacte = require_open_pacte(&txn, pacte_id).await?;
        if pacte.current_wins > 0 {
            return Err(PacteError::StreakInProgress.into());
        }

        if entity::prelude::Participant::find_by_id((pacte_id, user_id.to_string()))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(PacteError::AlreadyMember.into());
        }

        if open_membership(&txn, user_id).await?.is_some() {
            return Err(PacteError::AlreadyInPacte(user_id.to_string()).into());
        }

        let present = present_participants(pacte_id).count(&txn).await?;
        if present >= MAX_PARTICIPANTS as u64 {
            return Err(PacteError::PacteFull.into());
        }

        let participant = entity::participant::ActiveModel {
            pacte_id: ActiveValue::Set(pacte_id),
            user_id: ActiveValue::Set(user_id.to_string()),
            joined_at: ActiveValue::Set(now),
            signed_at: ActiveValue::Set(None),
            left_at: ActiveValue::Set(None),
            kicked_at: ActiveValue::Set(None),
            kick_reason: ActiveValue::Set(None),
            kicked_by: ActiveValue::Set(None),
            points_gained: ActiveValue::Set(0),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(Participant::from_entity(participant))
    }

    /// Removes an active participant at their own request.
    ///
    /// Stamps `left_at`, records `-malus` on the participant and debits the user. When
    /// nobody remains the pacte fails, counting unsigned participants while it is pending.
    ///
    /// # Returns
    /// - `Ok(DepartureOutcome)` - Remaining count and whether the pacte failed
    /// - `Err(PacteErr(PacteNotFound | PacteClosed | NotActiveParticipant))`
    pub async fn leave(
        &self,
        pacte_id: i32,
        user_id: &str,
        malus: i32,
        now: DateTime<Utc>,
    ) -> Result<DepartureOutcome, AppError> {
        let txn = self.db.begin().await?;

        let departed = entity::prelude::Participant::update_many()
            .col_expr(entity::participant::Column::LeftAt, Expr::value(now))
            .col_expr(entity::participant::Column::PointsGained, Expr::value(-malus))
            .filter(active_participant_condition(pacte_id, user_id))
            .exec(&txn)
            .await?;

        if departed.rows_affected == 0 {
            require_open_pacte(&txn, pacte_id).await?;
            return Err(PacteError::NotActiveParticipant(user_id.to_string()).into());
        }

        let outcome = settle_departure(&txn, pacte_id, user_id, malus, now).await?;

        txn.commit().await?;

        Ok(outcome)
    }

    /// Excludes an active participant on behalf of another active participant.
    ///
    /// Same shape as `leave` but stamps the exclusion columns instead of `left_at`.
    ///
    /// # Returns
    /// - `Ok(DepartureOutcome)` - Remaining count and whether the pacte failed
    /// - `Err(PacteErr(CannotKickSelf | PacteNotFound | PacteClosed | NotActiveParticipant))`
    pub async fn kick(
        &self,
        pacte_id: i32,
        target_id: &str,
        kicker_id: &str,
        malus: i32,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<DepartureOutcome, AppError> {
        if target_id == kicker_id {
            return Err(PacteError::CannotKickSelf.into());
        }

        let txn = self.db.begin().await?;

        let kicked = entity::prelude::Participant::update_many()
            .col_expr(entity::participant::Column::KickedAt, Expr::value(now))
            .col_expr(entity::participant::Column::KickReason, Expr::value(reason))
            .col_expr(entity::participant::Column::KickedBy, Expr::value(kicker_id))
            .col_expr(entity::participant::Column::PointsGained, Expr::value(-malus))
            .filter(active_participant_condition(pacte_id, target_id))
            .exec(&txn)
            .await?;

        if kicked.rows_affected == 0 {
            require_open_pacte(&txn, pacte_id).await?;
            return Err(PacteError::NotActiveParticipant(target_id.to_string()).into());
        }

        let kicker_active = entity::prelude::Participant::find()
            .filter(active_participant_condition(pacte_id, kicker_id))
            .count(&txn)
            .await?;
        if kicker_active == 0 {
            return Err(PacteError::NotActiveParticipant(kicker_id.to_string()).into());
        }

        let outcome = settle_departure(&txn, pacte_id, target_id, malus, now).await?;

        txn.commit().await?;

        Ok(outcome)
    }

    /// Reverses an exclusion and refunds the malus it cost.
    ///
    /// Only possible while the pacte is pending or active, the user is in no other open
    /// pacte, and the freed slot has not been taken since.
    ///
    /// # Returns
    /// - `Ok(UnkickOutcome)` - Points refunded to the user
    /// - `Err(PacteErr(PacteNotFound | PacteClosed | NotKicked | AlreadyInPacte | PacteFull))`
    pub async fn unkick(&self, pacte_id: i32, target_id: &str) -> Result<UnkickOutcome, AppError> {
        let txn = self.db.begin().await?;

        require_open_pacte(&txn, pacte_id).await?;

        let participant =
            entity::prelude::Participant::find_by_id((pacte_id, target_id.to_string()))
                .one(&txn)
                .await?
                .filter(|p| p.kicked_at.is_some())
                .ok_or_else(|| PacteError::NotKicked(target_id.to_string()))?;

        // The kicked row itself is not an open membership, any hit is another pacte.
        if open_membership(&txn, target_id).await?.is_some() {
            return Err(PacteError::AlreadyInPacte(target_id.to_string()).into());
        }

        let present = present_participants(pacte_id).count(&txn).await?;
        if present >= MAX_PARTICIPANTS as u64 {
            return Err(PacteError::PacteFull.into());
        }

        let refunded = -participant.points_gained;

        let mut active = participant.into_active_model();
        active.kicked_at = ActiveValue::Set(None);
        active.kick_reason = ActiveValue::Set(None);
        active.kicked_by = ActiveValue::Set(None);
        active.points_gained = ActiveValue::Set(0);
        active.update(&txn).await?;

        UserRepository::new(&txn)
            .apply_points(target_id, refunded)
            .await?;

        txn.commit().await?;

        Ok(UnkickOutcome { refunded })
    }

    /// Applies one progress update to an active pacte.
    ///
    /// Rejects updates on pactes that are not active and updates that would break
    /// `current_wins <= objective`, `best_streak_reached >= current_wins`, or lower
    /// `best_streak_reached`.
    ///
    /// # Returns
    /// - `Ok(Pacte)` - The pacte after the update
    /// - `Err(PacteErr(PacteNotFound | NotActive | InvariantViolation))`
    pub async fn apply_update(
        &self,
        pacte_id: i32,
        update: PacteUpdate,
        now: DateTime<Utc>,
    ) -> Result<Pacte, AppError> {
        let txn = self.db.begin().await?;

        let current = entity::prelude::Pacte::find_by_id(pacte_id)
            .one(&txn)
            .await?
            .ok_or(PacteError::PacteNotFound(pacte_id))?;

        if current.status != PacteStatus::Active.as_str() {
            return Err(PacteError::NotActive(pacte_id).into());
        }

        let violation = |reason: String| PacteError::InvariantViolation { pacte_id, reason };

        let mut active = current.clone().into_active_model();
        match update {
            PacteUpdate::MatchStarted { game_id } => {
                active.in_game = ActiveValue::Set(true);
                active.current_game_id = ActiveValue::Set(Some(game_id));
                active.match_started_at = ActiveValue::Set(Some(now));
                active.result_pending_since = ActiveValue::Set(None);
                active.result_poll_count = ActiveValue::Set(0);
            }
            PacteUpdate::ResultPending => {
                if !current.in_game {
                    return Err(violation("no match is in progress".to_string()).into());
                }
                active.result_pending_since = ActiveValue::Set(Some(now));
                active.result_poll_count = ActiveValue::Set(0);
            }
            PacteUpdate::EmptyResultPoll => {
                active.result_poll_count = ActiveValue::Set(current.result_poll_count + 1);
            }
            PacteUpdate::ClearInGame | PacteUpdate::TechnicalReset => {
                clear_match_state(&mut active);
                if matches!(update, PacteUpdate::TechnicalReset) {
                    active.error_count = ActiveValue::Set(0);
                }
            }
            PacteUpdate::RecordWin {
                current_wins,
                best_streak_reached,
            } => {
                if current_wins > current.objective {
                    return Err(violation(format!(
                        "{} wins exceed objective {}",
                        current_wins, current.objective
                    ))
                    .into());
                }
                if current_wins != current.current_wins + 1 {
                    return Err(violation(format!(
                        "win must advance the streak from {} by one, got {}",
                        current.current_wins, current_wins
                    ))
                    .into());
                }
                check_best_streak(&current, current_wins, best_streak_reached)
                    .map_err(violation)?;
                active.current_wins = ActiveValue::Set(current_wins);
                active.best_streak_reached = ActiveValue::Set(best_streak_reached);
                clear_match_state(&mut active);
            }
            PacteUpdate::RecordLoss {
                best_streak_reached,
            } => {
                check_best_streak(&current, current.current_wins, best_streak_reached)
                    .map_err(violation)?;
                active.current_wins = ActiveValue::Set(0);
                active.best_streak_reached = ActiveValue::Set(best_streak_reached);
                clear_match_state(&mut active);
            }
            PacteUpdate::MarkWarningSent => {
                active.warning_sent = ActiveValue::Set(true);
            }
            PacteUpdate::MarkChecked => {
                active.last_checked_at = ActiveValue::Set(Some(now));
                active.error_count = ActiveValue::Set(0);
            }
            PacteUpdate::IncrementErrorCount => {
                active.error_count = ActiveValue::Set(current.error_count + 1);
            }
        }

        let updated = active.update(&txn).await?;

        txn.commit().await?;

        Pacte::from_entity(updated)
    }

    /// Finishes an active pacte and pays every active participant.
    ///
    /// The status change is conditional on the pacte still being active, so a second
    /// call is rejected instead of paying twice.
    ///
    /// # Arguments
    /// - `pacte_id` - Pacte to finish
    /// - `succeeded` - Final status, success or failed
    /// - `points` - Point delta for each active participant
    /// - `now` - Completion time
    ///
    /// # Returns
    /// - `Ok(Vec<String>)` - Discord ids of the participants that were paid
    /// - `Err(PacteErr(AlreadyTerminal | NotActive | PacteNotFound))`
    pub async fn complete(
        &self,
        pacte_id: i32,
        succeeded: bool,
        points: i32,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, AppError> {
        let txn = self.db.begin().await?;

        let status = if succeeded {
            PacteStatus::Success
        } else {
            PacteStatus::Failed
        };

        let result = entity::prelude::Pacte::update_many()
            .col_expr(entity::pacte::Column::Status, Expr::value(status.as_str()))
            .col_expr(entity::pacte::Column::CompletedAt, Expr::value(now))
            .col_expr(entity::pacte::Column::InGame, Expr::value(false))
            .filter(entity::pacte::Column::Id.eq(pacte_id))
            .filter(entity::pacte::Column::Status.eq(PacteStatus::Active.as_str()))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            let pacte = find_pacte(&txn, pacte_id)
                .await?
                .ok_or(PacteError::PacteNotFound(pacte_id))?;
            return Err(if pacte.status.is_terminal() {
                PacteError::AlreadyTerminal(pacte_id)
            } else {
                PacteError::NotActive(pacte_id)
            }
            .into());
        }

        let paid: Vec<String> = active_participant_rows(pacte_id)
            .all(&txn)
            .await?
            .into_iter()
            .map(|p| p.user_id)
            .collect();

        entity::prelude::Participant::update_many()
            .col_expr(entity::participant::Column::PointsGained, Expr::value(points))
            .filter(entity::participant::Column::PacteId.eq(pacte_id))
            .filter(entity::participant::Column::UserId.is_in(paid.clone()))
            .exec(&txn)
            .await?;

        let users = UserRepository::new(&txn);
        for user_id in &paid {
            users.apply_points(user_id, points).await?;
        }

        txn.commit().await?;

        Ok(paid)
    }

    /// Fails pending pactes whose signature window has run out.
    ///
    /// # Arguments
    /// - `older_than` - Signature window measured from creation
    /// - `now` - Current time
    ///
    /// # Returns
    /// - `Ok(Vec<Pacte>)` - The pactes that were expired, as they were before expiry
    pub async fn expire_unsigned(
        &self,
        older_than: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<Pacte>, AppError> {
        let cutoff = now - older_than;
        let txn = self.db.begin().await?;

        let expired = entity::prelude::Pacte::find()
            .filter(entity::pacte::Column::Status.eq(PacteStatus::Pending.as_str()))
            .filter(entity::pacte::Column::CreatedAt.lt(cutoff))
            .all(&txn)
            .await?;

        if expired.is_empty() {
            return Ok(Vec::new());
        }

        entity::prelude::Pacte::update_many()
            .col_expr(
                entity::pacte::Column::Status,
                Expr::value(PacteStatus::Failed.as_str()),
            )
            .col_expr(entity::pacte::Column::CompletedAt, Expr::value(now))
            .filter(entity::pacte::Column::Id.is_in(expired.iter().map(|p| p.id)))
            .filter(entity::pacte::Column::Status.eq(PacteStatus::Pending.as_str()))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        expired.into_iter().map(Pacte::from_entity).collect()
    }

    /// Active pactes due for a progress check.
    ///
    /// A pacte is due when it has at least one active participant and is either in
    /// game, never checked, or last checked before `now - min_interval`. In-game pactes
    /// come first, then the longest-unchecked ones.
    pub async fn list_checkable(
        &self,
        min_interval: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<Pacte>, AppError> {
        let cutoff = now - min_interval;

        let active_members = Query::select()
            .column(entity::participant::Column::PacteId)
            .from(entity::prelude::Participant)
            .and_where(entity::participant::Column::SignedAt.is_not_null())
            .and_where(entity::participant::Column::LeftAt.is_null())
            .and_where(entity::participant::Column::KickedAt.is_null())
            .to_owned();

        let pactes = entity::prelude::Pacte::find()
            .filter(entity::pacte::Column::Status.eq(PacteStatus::Active.as_str()))
            .filter(entity::pacte::Column::Id.in_subquery(active_members))
            .filter(
                Condition::any()
                    .add(entity::pacte::Column::InGame.eq(true))
                    .add(entity::pacte::Column::LastCheckedAt.is_null())
                    .add(entity::pacte::Column::LastCheckedAt.lte(cutoff)),
            )
            .order_by_desc(entity::pacte::Column::InGame)
            .order_by_asc(entity::pacte::Column::LastCheckedAt)
            .order_by_asc(entity::pacte::Column::Id)
            .all(self.db)
            .await?;

        pactes.into_iter().map(Pacte::from_entity).collect()
    }

    /// Finds a pacte by id.
    pub async fn find_by_id(&self, pacte_id: i32) -> Result<Option<Pacte>, AppError> {
        find_pacte(self.db, pacte_id).await
    }

    /// Every participant row of a pacte, departed ones included, in join order.
    pub async fn participants(&self, pacte_id: i32) -> Result<Vec<Participant>, AppError> {
        let rows = entity::prelude::Participant::find()
            .filter(entity::participant::Column::PacteId.eq(pacte_id))
            .order_by_asc(entity::participant::Column::JoinedAt)
            .order_by_asc(entity::participant::Column::UserId)
            .all(self.db)
            .await?;

        Ok(rows.into_iter().map(Participant::from_entity).collect())
    }

    /// Users that signed the pacte and neither left nor were excluded.
    pub async fn active_participants(&self, pacte_id: i32) -> Result<Vec<User>, AppError> {
        let users = entity::prelude::User::find()
            .inner_join(entity::prelude::Participant)
            .filter(entity::participant::Column::PacteId.eq(pacte_id))
            .filter(entity::participant::Column::SignedAt.is_not_null())
            .filter(entity::participant::Column::LeftAt.is_null())
            .filter(entity::participant::Column::KickedAt.is_null())
            .order_by_asc(entity::participant::Column::JoinedAt)
            .order_by_asc(entity::user::Column::DiscordId)
            .all(self.db)
            .await?;

        Ok(users.into_iter().map(User::from_entity).collect())
    }

    /// The pending or active pacte the user currently takes part in.
    pub async fn current_for_user(&self, user_id: &str) -> Result<Option<Pacte>, AppError> {
        match open_membership(self.db, user_id).await? {
            Some(participant) => find_pacte(self.db, participant.pacte_id).await,
            None => Ok(None),
        }
    }

    /// The open pacte in `channel_id` still waiting for this user's signature.
    ///
    /// Covers pending pactes as well as active ones the user joined late.
    pub async fn pending_in_channel_for_user(
        &self,
        channel_id: &str,
        user_id: &str,
    ) -> Result<Option<Pacte>, AppError> {
        let pacte = entity::prelude::Pacte::find()
            .inner_join(entity::prelude::Participant)
            .filter(entity::pacte::Column::ChannelId.eq(channel_id))
            .filter(entity::pacte::Column::Status.is_in([
                PacteStatus::Pending.as_str(),
                PacteStatus::Active.as_str(),
            ]))
            .filter(entity::participant::Column::UserId.eq(user_id))
            .filter(entity::participant::Column::SignedAt.is_null())
            .filter(entity::participant::Column::LeftAt.is_null())
            .filter(entity::participant::Column::KickedAt.is_null())
            .order_by_desc(entity::pacte::Column::CreatedAt)
            .one(self.db)
            .await?;

        pacte.map(Pacte::from_entity).transpose()
    }

    /// Open pactes in a channel that can still take a new participant.
    pub async fn joinable_in_channel(&self, channel_id: &str) -> Result<Vec<Pacte>, AppError> {
        let candidates = entity::prelude::Pacte::find()
            .filter(entity::pacte::Column::ChannelId.eq(channel_id))
            .filter(entity::pacte::Column::Status.is_in([
                PacteStatus::Pending.as_str(),
                PacteStatus::Active.as_str(),
            ]))
            .filter(entity::pacte::Column::CurrentWins.eq(0))
            .order_by_asc(entity::pacte::Column::CreatedAt)
            .all(self.db)
            .await?;

        let mut joinable = Vec::new();
        for pacte in candidates {
            let present = present_participants(pacte.id).count(self.db).await?;
            if present < MAX_PARTICIPANTS as u64 {
                joinable.push(Pacte::from_entity(pacte)?);
            }
        }

        Ok(joinable)
    }

    /// Pactes with at least one signature, newest first.
    ///
    /// With `user_id` only the pactes that user signed are listed, each with the points
    /// they gained. `limit` is clamped to 1..=`MAX_HISTORY_LIMIT`.
    pub async fn history(
        &self,
        user_id: Option<&str>,
        limit: u64,
    ) -> Result<Vec<PacteHistoryEntry>, AppError> {
        let mut signed = Query::select()
            .column(entity::participant::Column::PacteId)
            .from(entity::prelude::Participant)
            .and_where(entity::participant::Column::SignedAt.is_not_null())
            .to_owned();
        if let Some(user_id) = user_id {
            signed.and_where(entity::participant::Column::UserId.eq(user_id));
        }

        let pactes = entity::prelude::Pacte::find()
            .filter(entity::pacte::Column::Id.in_subquery(signed))
            .order_by_desc(entity::pacte::Column::CreatedAt)
            .order_by_desc(entity::pacte::Column::Id)
            .limit(limit.clamp(1, MAX_HISTORY_LIMIT))
            .all(self.db)
            .await?;

        let mut entries = Vec::with_capacity(pactes.len());
        for pacte in pactes {
            let rows = entity::prelude::Participant::find()
                .find_also_related(entity::prelude::User)
                .filter(entity::participant::Column::PacteId.eq(pacte.id))
                .filter(entity::participant::Column::SignedAt.is_not_null())
                .order_by_asc(entity::participant::Column::JoinedAt)
                .order_by_asc(entity::participant::Column::UserId)
                .all(self.db)
                .await?;

            let points_gained = user_id.and_then(|id| {
                rows.iter()
                    .find(|(participant, _)| participant.user_id == id)
                    .map(|(participant, _)| participant.points_gained)
            });
            let participants = rows
                .into_iter()
                .map(|(participant, user)| {
                    user.map(|u| u.summoner_name).unwrap_or(participant.user_id)
                })
                .collect();

            entries.push(PacteHistoryEntry {
                pacte: Pacte::from_entity(pacte)?,
                participants,
                points_gained,
            });
        }

        Ok(entries)
    }

    /// Exclusions recorded on a pacte, most recent first.
    pub async fn kick_history(&self, pacte_id: i32) -> Result<Vec<KickRecord>, AppError> {
        let rows = entity::prelude::Participant::find()
            .find_also_related(entity::prelude::User)
            .filter(entity::participant::Column::PacteId.eq(pacte_id))
            .filter(entity::participant::Column::KickedAt.is_not_null())
            .order_by_desc(entity::participant::Column::KickedAt)
            .all(self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(participant, user)| {
                let kicked_at = participant.kicked_at?;
                Some(KickRecord {
                    summoner_name: user
                        .map(|u| u.summoner_name)
                        .unwrap_or_else(|| participant.user_id.clone()),
                    user_id: participant.user_id,
                    kicked_at,
                    kick_reason: participant.kick_reason,
                    kicked_by: participant.kicked_by,
                    points_gained: participant.points_gained,
                })
            })
            .collect())
    }
}

/// Participant row of the user in a pending or active pacte, if any.
pub(crate) async fn open_membership<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
) -> Result<Option<entity::participant::Model>, sea_orm::DbErr> {
    entity::prelude::Participant::find()
        .filter(entity::participant::Column::UserId.eq(user_id))
        .filter(entity::participant::Column::LeftAt.is_null())
        .filter(entity::participant::Column::KickedAt.is_null())
        .filter(entity::participant::Column::PacteId.in_subquery(open_pacte_ids()))
        .one(db)
        .await
}

async fn find_pacte<C: ConnectionTrait>(db: &C, pacte_id: i32) -> Result<Option<Pacte>, AppError> {
    entity::prelude::Pacte::find_by_id(pacte_id)
        .one(db)
        .await?
        .map(Pacte::from_entity)
        .transpose()
}

/// Loads a pacte that must exist and must not be finished.
async fn require_open_pacte<C: ConnectionTrait>(db: &C, pacte_id: i32) -> Result<Pacte, AppError> {
    let pacte = find_pacte(db, pacte_id)
        .await?
        .ok_or(PacteError::PacteNotFound(pacte_id))?;

    if pacte.status.is_terminal() {
        return Err(PacteError::PacteClosed(pacte_id).into());
    }

    Ok(pacte)
}

/// Debits the departing user and fails the pacte if nobody remains.
///
/// A pending pacte still counts participants that have not signed yet.
async fn settle_departure<C: ConnectionTrait>(
    db: &C,
    pacte_id: i32,
    user_id: &str,
    malus: i32,
    now: DateTime<Utc>,
) -> Result<DepartureOutcome, AppError> {
    UserRepository::new(db).apply_points(user_id, -malus).await?;

    let pacte = require_open_pacte(db, pacte_id).await?;
    let remaining_count = match pacte.status {
        PacteStatus::Pending => present_participants(pacte_id).count(db).await?,
        _ => active_participant_rows(pacte_id).count(db).await?,
    };

    let pacte_failed = if remaining_count == 0 {
        let result = entity::prelude::Pacte::update_many()
            .col_expr(
                entity::pacte::Column::Status,
                Expr::value(PacteStatus::Failed.as_str()),
            )
            .col_expr(entity::pacte::Column::CompletedAt, Expr::value(now))
            .col_expr(entity::pacte::Column::InGame, Expr::value(false))
            .filter(entity::pacte::Column::Id.eq(pacte_id))
            .filter(entity::pacte::Column::Status.is_in([
                PacteStatus::Pending.as_str(),
                PacteStatus::Active.as_str(),
            ]))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(InternalError::PacteVanished(pacte_id).into());
        }
        true
    } else {
        false
    };

    Ok(DepartureOutcome {
        remaining_count,
        pacte_failed,
        malus,
    })
}

/// Ids of pending and active pactes.
fn open_pacte_ids() -> SelectStatement {
    Query::select()
        .column(entity::pacte::Column::Id)
        .from(entity::prelude::Pacte)
        .and_where(entity::pacte::Column::Status.is_in([
            PacteStatus::Pending.as_str(),
            PacteStatus::Active.as_str(),
        ]))
        .to_owned()
}

/// Matches the user's row when it is signed, present, and its pacte is open.
fn active_participant_condition(pacte_id: i32, user_id: &str) -> Condition {
    Condition::all()
        .add(entity::participant::Column::PacteId.eq(pacte_id))
        .add(entity::participant::Column::UserId.eq(user_id))
        .add(entity::participant::Column::SignedAt.is_not_null())
        .add(entity::participant::Column::LeftAt.is_null())
        .add(entity::participant::Column::KickedAt.is_null())
        .add(entity::participant::Column::PacteId.in_subquery(open_pacte_ids()))
}

/// Participants that have neither left nor been excluded, signed or not.
fn present_participants(pacte_id: i32) -> sea_orm::Select<entity::participant::Entity> {
    entity::prelude::Participant::find()
        .filter(entity::participant::Column::PacteId.eq(pacte_id))
        .filter(entity::participant::Column::LeftAt.is_null())
        .filter(entity::participant::Column::KickedAt.is_null())
}

fn active_participant_rows(pacte_id: i32) -> sea_orm::Select<entity::participant::Entity> {
    present_participants(pacte_id).filter(entity::participant::Column::SignedAt.is_not_null())
}

fn clear_match_state(active: &mut entity::pacte::ActiveModel) {
    active.in_game = ActiveValue::Set(false);
    active.current_game_id = ActiveValue::Set(None);
    active.match_started_at = ActiveValue::Set(None);
    active.result_pending_since = ActiveValue::Set(None);
    active.result_poll_count = ActiveValue::Set(0);
}

fn check_best_streak(
    current: &entity::pacte::Model,
    current_wins: i32,
    best_streak_reached: i32,
) -> Result<(), String> {
    if best_streak_reached < current_wins {
        return Err(format!(
            "best streak {} is below current wins {}",
            best_streak_reached, current_wins
        ));
    }
    if best_streak_reached < current.best_streak_reached {
        return Err(format!(
            "best streak cannot drop from {} to {}",
            current.best_streak_reached, best_streak_reached
        ));
    }
    Ok(())
}
