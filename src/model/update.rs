/// A single progress-engine mutation of an active pacte.
///
/// Each variant touches a fixed set of columns, so an update can never leave the
/// pacte with a half-applied combination of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacteUpdate {
    /// The whole group was detected in the same live match.
    MatchStarted { game_id: String },
    /// The group left the live match; wait for the result to be published.
    ResultPending,
    /// A result lookup found nothing yet.
    EmptyResultPoll,
    /// Stop waiting for a result without touching the counters.
    ClearInGame,
    /// A win was applied; also leaves the in-game state.
    RecordWin {
        current_wins: i32,
        best_streak_reached: i32,
    },
    /// A loss reset the streak; also leaves the in-game state.
    RecordLoss { best_streak_reached: i32 },
    MarkWarningSent,
    /// A tick finished cleanly; stamps `last_checked_at` and clears `error_count`.
    MarkChecked,
    IncrementErrorCount,
    /// Too many failures while in game; drop the in-game state and start over.
    TechnicalReset,
}

impl PacteUpdate {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            PacteUpdate::MatchStarted { .. } => "match_started",
            PacteUpdate::ResultPending => "result_pending",
            PacteUpdate::EmptyResultPoll => "empty_result_poll",
            PacteUpdate::ClearInGame => "clear_in_game",
            PacteUpdate::RecordWin { .. } => "record_win",
            PacteUpdate::RecordLoss { .. } => "record_loss",
            PacteUpdate::MarkWarningSent => "mark_warning_sent",
            PacteUpdate::MarkChecked => "mark_checked",
            PacteUpdate::IncrementErrorCount => "increment_error_count",
            PacteUpdate::TechnicalReset => "technical_reset",
        }
    }
}
