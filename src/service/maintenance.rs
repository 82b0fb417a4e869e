//! Periodic housekeeping run by the maintenance scheduler.
//!
//! - pending pactes that were not signed within the signature window fail
//! - ledger rows past their retention are pruned
//! - monthly points are reset once when a new calendar month starts

use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::{
    data::{
        app_setting::AppSettingRepository, game_history::GameHistoryRepository,
        pacte::PacteRepository, user::UserRepository,
    },
    error::AppError,
    model::pacte::Pacte,
};

/// Minutes a pending pacte waits for its signatures.
pub const SIGNATURE_WINDOW_MINUTES: i64 = 5;

/// Days a processed match stays in the ledger.
pub const LEDGER_RETENTION_DAYS: i64 = 30;

/// Setting holding the month of the last monthly reset, `YYYY-MM`.
pub const LAST_MONTHLY_RESET_KEY: &str = "last_monthly_reset";

pub struct MaintenanceService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MaintenanceService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fails pending pactes whose signature window has closed.
    ///
    /// # Returns
    /// - `Ok(Vec<Pacte>)` - The expired pactes, as they were before expiry
    pub async fn expire_unsigned(&self, now: DateTime<Utc>) -> Result<Vec<Pacte>, AppError> {
        let expired = PacteRepository::new(self.db)
            .expire_unsigned(Duration::minutes(SIGNATURE_WINDOW_MINUTES), now)
            .await?;

        for pacte in &expired {
            tracing::info!(
                "Pacte {} expired without every signature in channel {}",
                pacte.id,
                pacte.channel_id
            );
        }

        Ok(expired)
    }

    /// Deletes ledger rows older than the retention period.
    pub async fn prune_ledger(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let ledger = GameHistoryRepository::new(self.db);
        let pruned = ledger.prune_older_than(LEDGER_RETENTION_DAYS, now).await?;

        let stats = ledger.stats().await?;
        tracing::info!(
            "Pruned {} processed match(es), ledger holds {} ({} pacte(s), {:.0}% wins)",
            pruned,
            stats.total,
            stats.distinct_pactes,
            stats.win_rate() * 100.0
        );

        Ok(pruned)
    }

    /// Resets monthly points when `now` falls in a month not seen before.
    ///
    /// The first run on an empty database only records the current month, so a
    /// restart never wipes points earned earlier in the month.
    ///
    /// # Returns
    /// - `Ok(Some(u64))` - Points were reset for that many users
    /// - `Ok(None)` - The current month was already handled
    pub async fn monthly_reset(&self, now: DateTime<Utc>) -> Result<Option<u64>, AppError> {
        let month = now.format("%Y-%m").to_string();

        let txn = self.db.begin().await?;
        let settings = AppSettingRepository::new(&txn);

        let reset = match settings.get(LAST_MONTHLY_RESET_KEY).await? {
            Some(last) if last == month => None,
            Some(_) => Some(UserRepository::new(&txn).reset_monthly_points().await?),
            None => {
                tracing::info!("Monthly point tracking starts with {}", month);
                None
            }
        };

        settings.set(LAST_MONTHLY_RESET_KEY, &month, now).await?;
        txn.commit().await?;

        if let Some(users) = reset {
            tracing::info!("Monthly points reset for {} user(s), new month {}", users, month);
        }

        Ok(reset)
    }
}
