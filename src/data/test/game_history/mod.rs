use crate::{
    data::game_history::GameHistoryRepository,
    error::AppError,
    model::game_history::{LedgerValidation, MatchOutcome, RejectReason},
};
use chrono::{Duration, Utc};
use test_utils::{builder::TestBuilder, factory};

mod prune_older_than;
mod record;
mod stats;
