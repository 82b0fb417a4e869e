//! External game observer.
//!
//! The progress engine only needs two questions answered about a group of players:
//! are they all in the same live match right now, and what was the last match they
//! finished together. `GameObserver` is that seam; `RiotObserver` answers it against
//! the Riot Games API and tests answer it with scripted values.

pub mod retry;
pub mod riot;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::observer::ObserverError;

/// Queue id of ARAM on the Howling Abyss.
pub const ARAM_QUEUE_ID: i64 = 450;

/// Matches shorter than this are remakes and never count.
pub const REMAKE_MAX_DURATION_SECONDS: i64 = 300;

/// A match a player is currently playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMatch {
    pub game_id: String,
    pub queue_id: i64,
    /// Provider-reported start, absent while the game is loading.
    pub started_at: Option<DateTime<Utc>>,
}

/// A finished match shared by the whole group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedMatch {
    pub match_id: String,
    /// Whether the group's team won.
    pub win: bool,
    pub ended_at: DateTime<Utc>,
    pub duration_seconds: i64,
}

/// A game account resolved from a Riot ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
}

impl Account {
    /// Display form, `GameName#TAG`.
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }
}

/// Read-only view of the external game state.
#[async_trait]
pub trait GameObserver: Send + Sync {
    /// The live ARAM match the account is in, if any.
    ///
    /// # Arguments
    /// - `account_id` - Game account id (puuid)
    /// - `platform` - Platform routing value such as `euw1`
    async fn live_match(
        &self,
        account_id: &str,
        platform: &str,
    ) -> Result<Option<LiveMatch>, ObserverError>;

    /// The most recent ARAM match every account took part in, remakes excluded.
    ///
    /// # Arguments
    /// - `account_ids` - Game account ids of the whole group
    /// - `lookback` - How many recent matches per account to consider
    async fn last_completed_match(
        &self,
        account_ids: &[String],
        lookback: u32,
    ) -> Result<Option<CompletedMatch>, ObserverError>;

    /// Resolves a Riot ID to an account, `None` when it does not exist.
    async fn resolve_account(
        &self,
        game_name: &str,
        tag_line: &str,
    ) -> Result<Option<Account>, ObserverError>;
}
