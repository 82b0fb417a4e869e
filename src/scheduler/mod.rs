//! Cron jobs driving the bot's background work.
//!
//! - `pacte_progress` runs a progress engine cycle every 10 seconds
//! - `maintenance` expires unsigned pactes, prunes the ledger and resets monthly points

pub mod maintenance;
pub mod pacte_progress;
