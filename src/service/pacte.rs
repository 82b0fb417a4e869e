//! Pacte service for player-facing pacte commands.
//!
//! Resolves which pacte a command is about from the caller and the channel, prices
//! departures with the points calculator, then delegates to `PacteRepository`.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::{
    data::{game_history::GameHistoryRepository, pacte::PacteRepository},
    error::{pacte::PacteError, AppError},
    model::{
        game_history::GameRecord,
        pacte::{
            DepartureOutcome, Pacte, PacteHistoryEntry, PacteStatus, SignOutcome,
            UnkickOutcome,
        },
        participant::{KickRecord, Participant},
        user::User,
    },
    service::points,
};

/// A pacte together with its active players and history.
#[derive(Debug, Clone)]
pub struct PacteOverview {
    pub pacte: Pacte,
    pub players: Vec<User>,
    pub kicks: Vec<KickRecord>,
    /// Matches counted for the pacte, oldest first.
    pub games: Vec<GameRecord>,
}

pub struct PacteService<'a> {
    db: &'a DatabaseConnection,
    kick_multiplier: f64,
}

impl<'a> PacteService<'a> {
    /// Creates a new PacteService.
    ///
    /// # Arguments
    /// - `db` - Database connection
    /// - `kick_multiplier` - Scale of the kick malus relative to the leave malus
    pub fn new(db: &'a DatabaseConnection, kick_multiplier: f64) -> Self {
        Self {
            db,
            kick_multiplier,
        }
    }

    /// Creates a pending pacte with the creator as first participant.
    ///
    /// # Arguments
    /// - `creator_id` - Discord id of the user issuing the command
    /// - `objective` - Consecutive wins required
    /// - `invited_ids` - Other players mentioned by the creator
    /// - `channel_id` - Channel the pacte reports to
    ///
    /// # Returns
    /// - `Ok(Pacte)` - The new pending pacte
    /// - `Err(PacteErr(..))` - Any creation rule violated, see `PacteRepository::create`
    pub async fn create(
        &self,
        creator_id: &str,
        objective: i32,
        invited_ids: &[String],
        channel_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Pacte, AppError> {
        let mut participant_ids = Vec::with_capacity(invited_ids.len() + 1);
        participant_ids.push(creator_id.to_string());
        participant_ids.extend(invited_ids.iter().cloned());

        let pacte = PacteRepository::new(self.db)
            .create(objective, &participant_ids, channel_id, now)
            .await?;

        tracing::info!(
            "Pacte {} created by {} in channel {} (objective {})",
            pacte.id,
            creator_id,
            channel_id,
            objective
        );

        Ok(pacte)
    }

    /// Signs the caller's pending pacte in this channel.
    ///
    /// # Returns
    /// - `Ok(Some((Pacte, SignOutcome)))` - Signature recorded
    /// - `Ok(None)` - No pending pacte in the channel waits for this user
    pub async fn sign_in_channel(
        &self,
        channel_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(Pacte, SignOutcome)>, AppError> {
        let repo = PacteRepository::new(self.db);

        let Some(pacte) = repo.pending_in_channel_for_user(channel_id, user_id).await? else {
            return Ok(None);
        };

        let outcome = repo.sign(pacte.id, user_id, now).await?;
        if outcome.activated {
            tracing::info!("Pacte {} is now active", pacte.id);
        }

        Ok(Some((pacte, outcome)))
    }

    pub async fn join(
        &self,
        pacte_id: i32,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Participant, AppError> {
        let participant = PacteRepository::new(self.db)
            .join(pacte_id, user_id, now)
            .await?;

        tracing::info!("User {} joined pacte {}", user_id, pacte_id);

        Ok(participant)
    }

    /// Removes the caller from their open pacte.
    ///
    /// Only a participant who has signed can leave. Leaving a pending pacte is free,
    /// leaving an active one costs the leave malus.
    ///
    /// # Returns
    /// - `Ok((Pacte, DepartureOutcome))` - The pacte left and the departure result
    /// - `Err(PacteErr(NotInPacte))` - The caller has no open pacte
    /// - `Err(PacteErr(NotActiveParticipant))` - The caller has not signed yet
    pub async fn leave(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(Pacte, DepartureOutcome), AppError> {
        let repo = PacteRepository::new(self.db);
        let pacte = repo
            .current_for_user(user_id)
            .await?
            .ok_or(PacteError::NotInPacte)?;

        let malus = match pacte.status {
            PacteStatus::Active => points::leave_malus(pacte.objective, pacte.best_streak_reached),
            _ => 0,
        };

        let outcome = repo.leave(pacte.id, user_id, malus, now).await?;

        tracing::info!(
            "User {} left pacte {} (malus {}, {} remaining)",
            user_id,
            pacte.id,
            malus,
            outcome.remaining_count
        );

        Ok((pacte, outcome))
    }

    /// Excludes `target_id` from the kicker's open pacte.
    ///
    /// The malus is the leave malus scaled by the configured kick multiplier.
    pub async fn kick(
        &self,
        kicker_id: &str,
        target_id: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(Pacte, DepartureOutcome), AppError> {
        let repo = PacteRepository::new(self.db);
        let pacte = repo
            .current_for_user(kicker_id)
            .await?
            .ok_or(PacteError::NotInPacte)?;

        let malus = points::kick_malus(
            pacte.objective,
            pacte.best_streak_reached,
            self.kick_multiplier,
        );

        let outcome = repo
            .kick(pacte.id, target_id, kicker_id, malus, reason, now)
            .await?;

        tracing::warn!(
            "User {} excluded from pacte {} by {}: {} (malus {})",
            target_id,
            pacte.id,
            kicker_id,
            reason,
            malus
        );

        Ok((pacte, outcome))
    }

    /// Reverses an exclusion from the caller's open pacte.
    pub async fn unkick(
        &self,
        caller_id: &str,
        target_id: &str,
    ) -> Result<(Pacte, UnkickOutcome), AppError> {
        let repo = PacteRepository::new(self.db);
        let pacte = repo
            .current_for_user(caller_id)
            .await?
            .ok_or(PacteError::NotInPacte)?;

        let outcome = repo.unkick(pacte.id, target_id).await?;

        tracing::info!(
            "Exclusion of {} from pacte {} reversed by {} (+{})",
            target_id,
            pacte.id,
            caller_id,
            outcome.refunded
        );

        Ok((pacte, outcome))
    }

    /// Pactes with at least one signature, newest first, optionally for one player.
    pub async fn history(
        &self,
        user_id: Option<&str>,
        limit: u64,
    ) -> Result<Vec<PacteHistoryEntry>, AppError> {
        PacteRepository::new(self.db).history(user_id, limit).await
    }

    /// The caller's open pacte with its players and exclusions.
    pub async fn overview(&self, user_id: &str) -> Result<Option<PacteOverview>, AppError> {
        let repo = PacteRepository::new(self.db);

        let Some(pacte) = repo.current_for_user(user_id).await? else {
            return Ok(None);
        };
        let players = repo.active_participants(pacte.id).await?;
        let kicks = repo.kick_history(pacte.id).await?;
        let games = GameHistoryRepository::new(self.db)
            .history_for_pacte(pacte.id)
            .await?;

        Ok(Some(PacteOverview {
            pacte,
            players,
            kicks,
            games,
        }))
    }
}
