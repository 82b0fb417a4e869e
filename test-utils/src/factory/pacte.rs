//! Pacte factory for creating pactes in any lifecycle state.

use crate::factory::helpers::next_id;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test pactes.
///
/// Defaults to a pending pacte with objective 3 and no progress.
///
/// # Example
///
/// ```rust,ignore
/// let pacte = PacteFactory::new(&db)
///     .objective(5)
///     .active()
///     .current_wins(2)
///     .build()
///     .await?;
/// ```
pub struct PacteFactory<'a> {
    db: &'a DatabaseConnection,
    objective: i32,
    status: String,
    current_wins: i32,
    best_streak_reached: i32,
    in_game: bool,
    current_game_id: Option<String>,
    match_started_at: Option<DateTime<Utc>>,
    warning_sent: bool,
    error_count: i32,
    channel_id: String,
    created_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    last_checked_at: Option<DateTime<Utc>>,
}

impl<'a> PacteFactory<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            objective: 3,
            status: "pending".to_string(),
            current_wins: 0,
            best_streak_reached: 0,
            in_game: false,
            current_game_id: None,
            match_started_at: None,
            warning_sent: false,
            error_count: 0,
            channel_id: (900_000_000 + id).to_string(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            last_checked_at: None,
        }
    }

    pub fn objective(mut self, objective: i32) -> Self {
        self.objective = objective;
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Marks the pacte active, started now unless `started_at` overrides it.
    pub fn active(mut self) -> Self {
        self.status = "active".to_string();
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        self
    }

    pub fn current_wins(mut self, wins: i32) -> Self {
        self.current_wins = wins;
        self.best_streak_reached = self.best_streak_reached.max(wins);
        self
    }

    pub fn best_streak_reached(mut self, streak: i32) -> Self {
        self.best_streak_reached = streak;
        self
    }

    /// Marks the group as currently playing `game_id`, detected at `started`.
    pub fn in_game(mut self, game_id: impl Into<String>, started: DateTime<Utc>) -> Self {
        self.in_game = true;
        self.current_game_id = Some(game_id.into());
        self.match_started_at = Some(started);
        self
    }

    pub fn warning_sent(mut self, sent: bool) -> Self {
        self.warning_sent = sent;
        self
    }

    pub fn error_count(mut self, count: i32) -> Self {
        self.error_count = count;
        self
    }

    pub fn channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = Some(at);
        self
    }

    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }

    pub fn last_checked_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_checked_at = Some(at);
        self
    }

    /// Builds and inserts the pacte entity into the database.
    ///
    /// # Returns
    /// - `Ok(entity::pacte::Model)` - Created pacte entity
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::pacte::Model, DbErr> {
        entity::pacte::ActiveModel {
            objective: ActiveValue::Set(self.objective),
            status: ActiveValue::Set(self.status),
            current_wins: ActiveValue::Set(self.current_wins),
            best_streak_reached: ActiveValue::Set(self.best_streak_reached),
            in_game: ActiveValue::Set(self.in_game),
            current_game_id: ActiveValue::Set(self.current_game_id),
            match_started_at: ActiveValue::Set(self.match_started_at),
            result_pending_since: ActiveValue::Set(None),
            result_poll_count: ActiveValue::Set(0),
            warning_sent: ActiveValue::Set(self.warning_sent),
            error_count: ActiveValue::Set(self.error_count),
            channel_id: ActiveValue::Set(self.channel_id),
            created_at: ActiveValue::Set(self.created_at),
            started_at: ActiveValue::Set(self.started_at),
            completed_at: ActiveValue::Set(self.completed_at),
            last_checked_at: ActiveValue::Set(self.last_checked_at),
            ..Default::default()
        }
        .insert(self.db)
        .await
    }
}

/// Creates a pending pacte with default values.
pub async fn create_pacte(db: &DatabaseConnection) -> Result<entity::pacte::Model, DbErr> {
    PacteFactory::new(db).build().await
}
