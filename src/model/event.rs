//! Events published by the progress engine after its writes are committed.

/// Something that happened to a pacte, with the data a notifier needs to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct PacteEvent {
    pub pacte_id: i32,
    /// Discord channel the pacte reports to.
    pub channel_id: String,
    pub kind: PacteEventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PacteEventKind {
    MatchStarted {
        game_id: String,
        participants: Vec<String>,
    },
    Win {
        current_wins: i32,
        objective: i32,
        /// One more win completes the pacte.
        match_point: bool,
    },
    Loss {
        lost_streak: i32,
        best_streak_reached: i32,
        /// The loss happened one win away from the objective.
        so_close: bool,
    },
    Succeeded {
        objective: i32,
        points_per_participant: i32,
        participants: Vec<String>,
    },
    TimedOut {
        objective: i32,
        best_streak_reached: i32,
        points_per_participant: i32,
        participants: Vec<String>,
    },
    TimeRunningOut {
        remaining_minutes: i64,
        current_wins: i32,
        objective: i32,
    },
    /// The group left a match but no result could be found in time.
    ResultUndetectable { game_id: Option<String> },
    /// Repeated failures while in game forced the in-game state to be dropped.
    TechnicalReset { error_count: i32 },
    /// A pending pacte was not signed by everybody in time.
    SignatureExpired,
}

impl PacteEventKind {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            PacteEventKind::MatchStarted { .. } => "match_started",
            PacteEventKind::Win { .. } => "win",
            PacteEventKind::Loss { .. } => "loss",
            PacteEventKind::Succeeded { .. } => "succeeded",
            PacteEventKind::TimedOut { .. } => "timed_out",
            PacteEventKind::TimeRunningOut { .. } => "time_running_out",
            PacteEventKind::ResultUndetectable { .. } => "result_undetectable",
            PacteEventKind::TechnicalReset { .. } => "technical_reset",
            PacteEventKind::SignatureExpired => "signature_expired",
        }
    }
}
