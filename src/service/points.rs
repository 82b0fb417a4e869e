//! Pacte point economy.
//!
//! Pure functions only: rewards for the wins a group achieved, penalties for the wins
//! it fell short of, and the settlement applied to every participant when a pacte
//! finishes or a player departs.

/// Base reward per objective, for objectives 3 through 10.
const POINTS_TABLE: [(i32, i32); 8] = [
    (3, 5),
    (4, 15),
    (5, 40),
    (6, 100),
    (7, 250),
    (8, 400),
    (9, 550),
    (10, 700),
];

/// Partial-progress credit for every win achieved.
pub const BONUS_PER_WIN: i32 = 2;

/// Penalty for every win missing from the objective.
pub const MALUS_PER_MISSING_WIN: i32 = 10;

/// Extra base reward for every objective step above 10.
pub const EXTRA_OBJECTIVE_POINTS: i32 = 150;

/// Base reward for an objective, before the per-win bonus.
///
/// Objectives under 3 are never created and are worth nothing.
pub fn base_reward(objective: i32) -> i32 {
    if objective > 10 {
        return 700 + (objective - 10) * EXTRA_OBJECTIVE_POINTS;
    }

    POINTS_TABLE
        .iter()
        .find(|(o, _)| *o == objective)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

/// Points earned for `wins` wins on a pacte of the given objective.
///
/// # Arguments
/// - `objective` - Consecutive wins the pacte required
/// - `wins` - Wins achieved, negative values count as zero
pub fn reward(objective: i32, wins: i32) -> i32 {
    base_reward(objective) + wins.max(0) * BONUS_PER_WIN
}

/// Points lost for the wins missing from the objective, never negative.
pub fn penalty(objective: i32, best_streak: i32) -> i32 {
    ((objective - best_streak) * MALUS_PER_MISSING_WIN).max(0)
}

/// Final point delta for every active participant of a finished pacte.
///
/// A success earns the full reward; a failure earns the partial reward minus the
/// penalty, which may be negative.
pub fn settle(objective: i32, best_streak: i32, succeeded: bool) -> i32 {
    if succeeded {
        reward(objective, objective)
    } else {
        reward(objective, best_streak) - penalty(objective, best_streak)
    }
}

/// Points a player loses by leaving a pacte early.
pub fn leave_malus(objective: i32, best_streak: i32) -> i32 {
    penalty(objective, best_streak)
}

/// Points a player loses when excluded by the group.
///
/// The leave malus scaled by `multiplier`, rounded to the nearest point.
pub fn kick_malus(objective: i32, best_streak: i32, multiplier: f64) -> i32 {
    (f64::from(leave_malus(objective, best_streak)) * multiplier).round() as i32
}
