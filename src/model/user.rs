//! Registered players and the read models built on top of them.

use chrono::{DateTime, Utc};

/// A Discord user linked to a game account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub discord_id: String,
    /// Game account id, unique across users.
    pub riot_puuid: String,
    /// Riot ID shown to players, `GameName#TAG`.
    pub summoner_name: String,
    pub points_total: i32,
    pub points_monthly: i32,
    /// Running maximum of every streak the user took part in.
    pub best_streak_ever: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn from_entity(entity: entity::user::Model) -> Self {
        Self {
            discord_id: entity.discord_id,
            riot_puuid: entity.riot_puuid,
            summoner_name: entity.summoner_name,
            points_total: entity.points_total,
            points_monthly: entity.points_monthly,
            best_streak_ever: entity.best_streak_ever,
            created_at: entity.created_at,
        }
    }
}

/// Parameters for linking a Discord user to a game account.
#[derive(Debug, Clone)]
pub struct RegisterUserParam {
    pub discord_id: String,
    pub riot_puuid: String,
    pub summoner_name: String,
}

/// Which point counter a ladder ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderKind {
    Total,
    Monthly,
}

/// One row of the points ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct LadderEntry {
    pub rank: usize,
    pub discord_id: String,
    pub summoner_name: String,
    pub points: i32,
    pub best_streak_ever: i32,
}

/// Pacte statistics of a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub user: User,
    /// Pactes the user signed.
    pub total_pactes: u64,
    pub pactes_success: u64,
    /// Best streak reached across the user's pactes.
    pub best_streak: i32,
    pub points_from_pactes: i64,
}

impl UserStats {
    /// Percentage of signed pactes that succeeded, rounded down.
    pub fn success_rate(&self) -> u64 {
        if self.total_pactes == 0 {
            return 0;
        }
        self.pactes_success * 100 / self.total_pactes
    }
}
