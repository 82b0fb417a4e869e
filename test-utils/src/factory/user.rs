//! User factory for creating registered players.

use crate::factory::helpers::next_id;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating test users with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// let user = UserFactory::new(&db)
///     .discord_id("123456789")
///     .points_total(120)
///     .build()
///     .await?;
/// ```
pub struct UserFactory<'a> {
    db: &'a DatabaseConnection,
    discord_id: String,
    riot_puuid: String,
    summoner_name: String,
    points_total: i32,
    points_monthly: i32,
    best_streak_ever: i32,
}

impl<'a> UserFactory<'a> {
    /// Creates a new UserFactory with default values.
    ///
    /// Defaults:
    /// - discord_id: `"{id}"` where id is auto-incremented
    /// - riot_puuid: `"puuid-{id}"`
    /// - summoner_name: `"Player{id}#EUW"`
    /// - all point counters: `0`
    pub fn new(db: &'a DatabaseConnection) -> Self {
        let id = next_id();
        Self {
            db,
            discord_id: id.to_string(),
            riot_puuid: format!("puuid-{}", id),
            summoner_name: format!("Player{}#EUW", id),
            points_total: 0,
            points_monthly: 0,
            best_streak_ever: 0,
        }
    }

    pub fn discord_id(mut self, discord_id: impl Into<String>) -> Self {
        self.discord_id = discord_id.into();
        self
    }

    pub fn riot_puuid(mut self, riot_puuid: impl Into<String>) -> Self {
        self.riot_puuid = riot_puuid.into();
        self
    }

    pub fn summoner_name(mut self, summoner_name: impl Into<String>) -> Self {
        self.summoner_name = summoner_name.into();
        self
    }

    pub fn points_total(mut self, points: i32) -> Self {
        self.points_total = points;
        self
    }

    pub fn points_monthly(mut self, points: i32) -> Self {
        self.points_monthly = points;
        self
    }

    pub fn best_streak_ever(mut self, streak: i32) -> Self {
        self.best_streak_ever = streak;
        self
    }

    /// Builds and inserts the user entity into the database.
    ///
    /// # Returns
    /// - `Ok(entity::user::Model)` - Created user entity
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::user::Model, DbErr> {
        entity::user::ActiveModel {
            discord_id: ActiveValue::Set(self.discord_id),
            riot_puuid: ActiveValue::Set(self.riot_puuid),
            summoner_name: ActiveValue::Set(self.summoner_name),
            points_total: ActiveValue::Set(self.points_total),
            points_monthly: ActiveValue::Set(self.points_monthly),
            best_streak_ever: ActiveValue::Set(self.best_streak_ever),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Creates a user with default values.
///
/// Shorthand for `UserFactory::new(db).build().await`.
pub async fn create_user(db: &DatabaseConnection) -> Result<entity::user::Model, DbErr> {
    UserFactory::new(db).build().await
}

/// Creates a user with a specific Discord ID.
pub async fn create_user_with_id(
    db: &DatabaseConnection,
    discord_id: impl Into<String>,
) -> Result<entity::user::Model, DbErr> {
    UserFactory::new(db).discord_id(discord_id).build().await
}
