//! Pacte domain model and the outcomes of membership operations.

use chrono::{DateTime, Duration, Utc};
use std::{fmt, str::FromStr};

use crate::error::{internal::InternalError, AppError};

/// Lifecycle status of a pacte.
///
/// Transitions are monotonic: `Pending -> Active -> {Success, Failed}` and
/// `Pending -> Failed` when signatures expire or everybody departs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacteStatus {
    Pending,
    Active,
    Success,
    Failed,
}

impl PacteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PacteStatus::Pending => "pending",
            PacteStatus::Active => "active",
            PacteStatus::Success => "success",
            PacteStatus::Failed => "failed",
        }
    }

    /// Success and failed pactes never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PacteStatus::Success | PacteStatus::Failed)
    }
}

impl fmt::Display for PacteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PacteStatus {
    type Err = InternalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(PacteStatus::Pending),
            "active" => Ok(PacteStatus::Active),
            "success" => Ok(PacteStatus::Success),
            "failed" => Ok(PacteStatus::Failed),
            other => Err(InternalError::UnknownPacteStatus(other.to_string())),
        }
    }
}

/// A group commitment to win `objective` consecutive ARAM games within the time limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Pacte {
    pub id: i32,
    /// Consecutive wins required, between 3 and 10.
    pub objective: i32,
    pub status: PacteStatus,
    pub current_wins: i32,
    /// Highest `current_wins` ever reached, never decreases.
    pub best_streak_reached: i32,
    /// Whether every active participant was last seen in the same live match.
    pub in_game: bool,
    /// Live match reference stored when the match was detected.
    pub current_game_id: Option<String>,
    /// When the current live match was detected.
    pub match_started_at: Option<DateTime<Utc>>,
    /// When the group was first seen out of the live match, awaiting its result.
    pub result_pending_since: Option<DateTime<Utc>>,
    /// Number of lookups that found no completed match yet.
    pub result_poll_count: i32,
    pub warning_sent: bool,
    pub error_count: i32,
    /// Discord channel the pacte reports to.
    pub channel_id: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl Pacte {
    /// Converts an entity model to a pacte domain model at the repository boundary.
    ///
    /// # Arguments
    /// - `entity` - The entity model from the database
    ///
    /// # Returns
    /// - `Ok(Pacte)` - The converted pacte
    /// - `Err(AppError::InternalErr(UnknownPacteStatus))` - Stored status is not recognised
    pub fn from_entity(entity: entity::pacte::Model) -> Result<Self, AppError> {
        let status = entity.status.parse::<PacteStatus>()?;

        Ok(Self {
            id: entity.id,
            objective: entity.objective,
            status,
            current_wins: entity.current_wins,
            best_streak_reached: entity.best_streak_reached,
            in_game: entity.in_game,
            current_game_id: entity.current_game_id,
            match_started_at: entity.match_started_at,
            result_pending_since: entity.result_pending_since,
            result_poll_count: entity.result_poll_count,
            warning_sent: entity.warning_sent,
            error_count: entity.error_count,
            channel_id: entity.channel_id,
            created_at: entity.created_at,
            started_at: entity.started_at,
            completed_at: entity.completed_at,
            last_checked_at: entity.last_checked_at,
        })
    }

    /// Time elapsed since activation, `None` while the pacte is still pending.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.started_at.map(|started| now - started)
    }

    /// One more win completes the pacte.
    pub fn is_match_point(&self) -> bool {
        self.current_wins == self.objective - 1
    }
}

/// Result of a successful signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignOutcome {
    pub all_signed: bool,
    pub signed_count: u64,
    /// Participants that have not left or been excluded.
    pub total_count: u64,
    /// This signature flipped the pacte from pending to active.
    pub activated: bool,
}

/// Result of a departure, voluntary or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepartureOutcome {
    /// Participants left after the departure, unsigned ones included while pending.
    pub remaining_count: u64,
    /// The departure emptied the pacte and failed it.
    pub pacte_failed: bool,
    /// Points removed from the departing user.
    pub malus: i32,
}

/// Result of reversing an exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnkickOutcome {
    /// Points handed back to the user.
    pub refunded: i32,
}

/// A pacte as listed in the history, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PacteHistoryEntry {
    pub pacte: Pacte,
    /// Summoner names of everyone who signed, in join order.
    pub participants: Vec<String>,
    /// Points the filtered player gained or lost, set only for a per-player history.
    pub points_gained: Option<i32>,
}
