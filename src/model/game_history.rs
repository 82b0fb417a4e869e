//! Processed-match ledger records and validation verdicts.

use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::error::{internal::InternalError, AppError};

/// Outcome of a completed match for the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Win,
    Loss,
}

impl MatchOutcome {
    pub fn from_win(win: bool) -> Self {
        if win {
            MatchOutcome::Win
        } else {
            MatchOutcome::Loss
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOutcome::Win => "win",
            MatchOutcome::Loss => "loss",
        }
    }
}

impl FromStr for MatchOutcome {
    type Err = InternalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "win" => Ok(MatchOutcome::Win),
            "loss" => Ok(MatchOutcome::Loss),
            other => Err(InternalError::UnknownMatchResult(other.to_string())),
        }
    }
}

/// A match that has been applied to a pacte.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub match_id: String,
    pub pacte_id: i32,
    pub outcome: MatchOutcome,
    pub processed_at: DateTime<Utc>,
}

impl GameRecord {
    pub fn from_entity(entity: entity::game_history::Model) -> Result<Self, AppError> {
        Ok(Self {
            match_id: entity.match_id,
            pacte_id: entity.pacte_id,
            outcome: entity.result.parse()?,
            processed_at: entity.processed_at,
        })
    }
}

/// Why a completed match may not be applied to a pacte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    AlreadyProcessed,
    /// Ended too long ago to belong to the current poll window.
    Stale,
    /// Ended after the current time, clock skew or bad data.
    FutureDated,
}

/// Verdict of the ledger gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerValidation {
    Valid,
    Rejected(RejectReason),
}

impl LedgerValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, LedgerValidation::Valid)
    }
}

/// Aggregate figures over the whole ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerStats {
    pub total: u64,
    pub wins: u64,
    pub losses: u64,
    pub distinct_pactes: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

impl LedgerStats {
    /// Share of recorded matches that were wins, between 0 and 1.
    pub fn win_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.wins as f64 / self.total as f64
    }
}
