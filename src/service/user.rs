//! User service for registration and player statistics.

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::{
    data::user::UserRepository,
    error::{pacte::PacteError, AppError},
    model::user::{LadderEntry, LadderKind, RegisterUserParam, User, UserStats},
    service::observer::GameObserver,
    util::parse::split_riot_id,
};

/// Rows shown by the ladder command.
pub const LADDER_SIZE: u64 = 10;

pub struct UserService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Links a Discord user to the game account behind a Riot ID.
    ///
    /// The Riot ID is resolved through the observer before anything is written, so an
    /// unknown account never creates a user.
    ///
    /// # Arguments
    /// - `observer` - Resolves `GameName#TAG` to an account id
    /// - `discord_id` - Discord id of the caller
    /// - `riot_id` - Riot ID as typed by the player
    ///
    /// # Returns
    /// - `Ok(User)` - The registered user
    /// - `Err(PacteErr(AccountNotFound))` - Malformed or unknown Riot ID
    /// - `Err(PacteErr(AlreadyRegistered | AccountAlreadyLinked))` - Link conflict
    /// - `Err(ObserverErr(..))` - The game API could not be reached
    pub async fn register(
        &self,
        observer: &dyn GameObserver,
        discord_id: &str,
        riot_id: &str,
        now: DateTime<Utc>,
    ) -> Result<User, AppError> {
        let repo = UserRepository::new(self.db);

        if repo.find_by_discord_id(discord_id).await?.is_some() {
            return Err(PacteError::AlreadyRegistered(discord_id.to_string()).into());
        }

        let (game_name, tag_line) = split_riot_id(riot_id)
            .ok_or_else(|| PacteError::AccountNotFound(riot_id.trim().to_string()))?;

        let account = observer
            .resolve_account(&game_name, &tag_line)
            .await?
            .ok_or_else(|| PacteError::AccountNotFound(format!("{}#{}", game_name, tag_line)))?;

        let user = repo
            .register(
                RegisterUserParam {
                    discord_id: discord_id.to_string(),
                    summoner_name: account.riot_id(),
                    riot_puuid: account.puuid,
                },
                now,
            )
            .await?;

        tracing::info!("User {} registered as {}", user.discord_id, user.summoner_name);

        Ok(user)
    }

    pub async fn unregister(&self, discord_id: &str) -> Result<(), AppError> {
        UserRepository::new(self.db).unregister(discord_id).await?;

        tracing::info!("User {} unregistered", discord_id);

        Ok(())
    }

    pub async fn ladder(&self, kind: LadderKind) -> Result<Vec<LadderEntry>, AppError> {
        UserRepository::new(self.db).ladder(kind, LADDER_SIZE).await
    }

    /// Statistics of a registered user.
    ///
    /// # Returns
    /// - `Ok(UserStats)` - Stats over the user's signed pactes
    /// - `Err(PacteErr(UserNotRegistered))` - No such user
    pub async fn stats(&self, discord_id: &str) -> Result<UserStats, AppError> {
        UserRepository::new(self.db)
            .stats(discord_id)
            .await?
            .ok_or_else(|| PacteError::UserNotRegistered(discord_id.to_string()).into())
    }
}
