use chrono::Duration;

/// Tunables of the progress engine.
///
/// Every value has a default matching the bot's production behaviour and can be
/// overridden from the environment by `Config::from_env`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnginePolicy {
    /// A pacte checked more recently than this is skipped unless it is in game.
    pub min_check_interval: Duration,
    /// Wait this long after the group leaves a match before asking for its result.
    pub lookup_delay: Duration,
    /// Stop waiting for a result after this long.
    pub give_up_after: Duration,
    /// Stop waiting for a result after this many empty lookups, if set.
    pub max_empty_polls: Option<i32>,
    /// Consecutive failed ticks before an in-game pacte is reset.
    pub error_threshold: i32,
    /// Time limit measured from activation.
    pub pacte_duration: Duration,
    /// Warn the group once when less than this much time remains.
    pub warning_window: Duration,
    /// Completed matches older than this are refused by the ledger.
    pub ledger_stale_window: Duration,
    /// Scale of the kick malus relative to the leave malus.
    pub kick_multiplier: f64,
    /// Recent matches per player considered when looking for the group result.
    pub lookback: u32,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            min_check_interval: Duration::seconds(30),
            lookup_delay: Duration::seconds(45),
            give_up_after: Duration::minutes(10),
            max_empty_polls: None,
            error_threshold: 5,
            pacte_duration: Duration::hours(24),
            warning_window: Duration::hours(2),
            ledger_stale_window: Duration::hours(2),
            kick_multiplier: 1.5,
            lookback: 5,
        }
    }
}
