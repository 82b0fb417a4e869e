//! User data repository for database operations.
//!
//! This module provides the `UserRepository` for registered players: account linking,
//! point bookkeeping, ladders and per-user statistics.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, ExprTrait},
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionSession, TransactionTrait,
};

use crate::{
    data::pacte::open_membership,
    error::{pacte::PacteError, AppError},
    model::{
        pacte::PacteStatus,
        user::{LadderEntry, LadderKind, RegisterUserParam, User, UserStats},
    },
};

/// Repository providing database operations for registered players.
pub struct UserRepository<'a, C> {
    db: &'a C,
}

impl<'a, C> UserRepository<'a, C>
where
    C: ConnectionTrait,
{
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// - `db` - A database connection or an open transaction
    ///
    /// # Returns
    /// - `UserRepository` - New repository instance
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Links a Discord user to a game account.
    ///
    /// # Arguments
    /// - `param` - Discord id, account id and display name
    /// - `now` - Registration time
    ///
    /// # Returns
    /// - `Ok(User)` - The registered user with zeroed counters
    /// - `Err(PacteErr(AlreadyRegistered))` - The Discord user already has an account
    /// - `Err(PacteErr(AccountAlreadyLinked))` - The game account belongs to someone else
    pub async fn register(
        &self,
        param: RegisterUserParam,
        now: DateTime<Utc>,
    ) -> Result<User, AppError> {
        if self.find_by_discord_id(&param.discord_id).await?.is_some() {
            return Err(PacteError::AlreadyRegistered(param.discord_id).into());
        }
        if self.find_by_puuid(&param.riot_puuid).await?.is_some() {
            return Err(PacteError::AccountAlreadyLinked.into());
        }

        let entity = entity::user::ActiveModel {
            discord_id: ActiveValue::Set(param.discord_id),
            riot_puuid: ActiveValue::Set(param.riot_puuid),
            summoner_name: ActiveValue::Set(param.summoner_name),
            points_total: ActiveValue::Set(0),
            points_monthly: ActiveValue::Set(0),
            best_streak_ever: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
        }
        .insert(self.db)
        .await?;

        Ok(User::from_entity(entity))
    }

    /// Finds a user by their Discord ID.
    ///
    /// # Arguments
    /// - `discord_id` - Discord user ID as a string
    ///
    /// # Returns
    /// - `Ok(Some(User))` - User found
    /// - `Ok(None)` - No user registered under that id
    /// - `Err(DbErr)` - Database error during query
    pub async fn find_by_discord_id(&self, discord_id: &str) -> Result<Option<User>, AppError> {
        let entity = entity::prelude::User::find_by_id(discord_id.to_string())
            .one(self.db)
            .await?;

        Ok(entity.map(User::from_entity))
    }

    /// Finds the user linked to a game account.
    pub async fn find_by_puuid(&self, riot_puuid: &str) -> Result<Option<User>, AppError> {
        let entity = entity::prelude::User::find()
            .filter(entity::user::Column::RiotPuuid.eq(riot_puuid))
            .one(self.db)
            .await?;

        Ok(entity.map(User::from_entity))
    }

    /// Adds `delta` to both the total and the monthly counter.
    ///
    /// A missing user is ignored; callers only pass ids read from participant rows.
    pub async fn apply_points(&self, discord_id: &str, delta: i32) -> Result<(), AppError> {
        if delta == 0 {
            return Ok(());
        }

        entity::prelude::User::update_many()
            .col_expr(
                entity::user::Column::PointsTotal,
                Expr::col(entity::user::Column::PointsTotal).add(delta),
            )
            .col_expr(
                entity::user::Column::PointsMonthly,
                Expr::col(entity::user::Column::PointsMonthly).add(delta),
            )
            .filter(entity::user::Column::DiscordId.eq(discord_id))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Raises `best_streak_ever` to `streak` for each user whose record is lower.
    pub async fn raise_best_streak(&self, discord_ids: &[String], streak: i32) -> Result<(), AppError> {
        if discord_ids.is_empty() {
            return Ok(());
        }

        entity::prelude::User::update_many()
            .col_expr(entity::user::Column::BestStreakEver, Expr::value(streak))
            .filter(entity::user::Column::DiscordId.is_in(discord_ids.iter().cloned()))
            .filter(entity::user::Column::BestStreakEver.lt(streak))
            .exec(self.db)
            .await?;

        Ok(())
    }

    /// Users with a positive score, best first.
    ///
    /// Ties are broken by best streak, then by registration order.
    ///
    /// # Arguments
    /// - `kind` - Rank by total or by monthly points
    /// - `limit` - Maximum number of rows
    ///
    /// # Returns
    /// - `Ok(Vec<LadderEntry>)` - Ranked rows starting at rank 1
    pub async fn ladder(&self, kind: LadderKind, limit: u64) -> Result<Vec<LadderEntry>, AppError> {
        let column = match kind {
            LadderKind::Total => entity::user::Column::PointsTotal,
            LadderKind::Monthly => entity::user::Column::PointsMonthly,
        };

        let users = entity::prelude::User::find()
            .filter(column.gt(0))
            .order_by_desc(column)
            .order_by_desc(entity::user::Column::BestStreakEver)
            .order_by_asc(entity::user::Column::CreatedAt)
            .limit(limit)
            .all(self.db)
            .await?;

        Ok(users
            .into_iter()
            .enumerate()
            .map(|(index, user)| LadderEntry {
                rank: index + 1,
                points: match kind {
                    LadderKind::Total => user.points_total,
                    LadderKind::Monthly => user.points_monthly,
                },
                discord_id: user.discord_id,
                summoner_name: user.summoner_name,
                best_streak_ever: user.best_streak_ever,
            })
            .collect())
    }

    /// Pacte statistics of one user, counting only pactes they signed.
    ///
    /// # Returns
    /// - `Ok(Some(UserStats))` - Statistics for a registered user
    /// - `Ok(None)` - The user is not registered
    pub async fn stats(&self, discord_id: &str) -> Result<Option<UserStats>, AppError> {
        let Some(user) = entity::prelude::User::find_by_id(discord_id.to_string())
            .one(self.db)
            .await?
        else {
            return Ok(None);
        };

        let rows = user
            .find_related(entity::prelude::Participant)
            .find_also_related(entity::prelude::Pacte)
            .filter(entity::participant::Column::SignedAt.is_not_null())
            .all(self.db)
            .await?;

        let mut stats = UserStats {
            user: User::from_entity(user),
            total_pactes: 0,
            pactes_success: 0,
            best_streak: 0,
            points_from_pactes: 0,
        };

        for (participant, pacte) in rows {
            stats.total_pactes += 1;
            stats.points_from_pactes += i64::from(participant.points_gained);
            if let Some(pacte) = pacte {
                if pacte.status == PacteStatus::Success.as_str() {
                    stats.pactes_success += 1;
                }
                stats.best_streak = Ord::max(stats.best_streak, pacte.best_streak_reached);
            }
        }

        Ok(Some(stats))
    }

    /// Zeroes every monthly counter.
    ///
    /// # Returns
    /// - `Ok(u64)` - Number of users whose counter was reset
    pub async fn reset_monthly_points(&self) -> Result<u64, AppError> {
        let result = entity::prelude::User::update_many()
            .col_expr(entity::user::Column::PointsMonthly, Expr::value(0))
            .filter(entity::user::Column::PointsMonthly.ne(0))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}

impl<'a, C> UserRepository<'a, C>
where
    C: ConnectionTrait + TransactionTrait,
{
    /// Removes a user and their participation history.
    ///
    /// # Returns
    /// - `Ok(())` - User deleted
    /// - `Err(PacteErr(UserNotRegistered))` - No such user
    /// - `Err(PacteErr(AlreadyInPacte))` - The user is still in a pending or active pacte
    pub async fn unregister(&self, discord_id: &str) -> Result<(), AppError> {
        let txn = self.db.begin().await?;

        let user = entity::prelude::User::find_by_id(discord_id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| PacteError::UserNotRegistered(discord_id.to_string()))?;

        if open_membership(&txn, discord_id).await?.is_some() {
            return Err(PacteError::AlreadyInPacte(discord_id.to_string()).into());
        }

        user.delete(&txn).await?;

        txn.commit().await?;

        Ok(())
    }
}
