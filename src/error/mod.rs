//! Error types for the pacte bot.
//!
//! `AppError` is the top-level error that every fallible operation returns. Domain
//! rule violations live in `PacteError`, external game API failures in
//! `ObserverError`, and both convert into `AppError` through `#[from]`.

pub mod config;
pub mod internal;
pub mod observer;
pub mod pacte;

use thiserror::Error;

use crate::error::{
    config::ConfigError, internal::InternalError, observer::ObserverError, pacte::PacteError,
};

/// Top-level application error type.
///
/// Aggregates every error the bot, the scheduler jobs, and the progress engine can
/// produce. Most variants use `#[from]` for automatic conversion.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Pacte rule or invariant violation.
    ///
    /// Display text is meant to be shown back to the player that triggered it.
    #[error(transparent)]
    PacteErr(#[from] PacteError),

    /// External game API failure after the retry budget was spent.
    #[error(transparent)]
    ObserverErr(#[from] ObserverError),

    /// Unexpected stored data or a bug in the codebase.
    #[error(transparent)]
    InternalErr(#[from] InternalError),

    /// Database operation error from SeaORM.
    #[error(transparent)]
    DbErr(#[from] sea_orm::DbErr),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),
}

/// Boxes the error to keep `AppError` small, serenity::Error is very large.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Returns the domain rule violation wrapped by this error, if any.
    ///
    /// Command handlers use this to decide whether the error text can be echoed to
    /// the player or must only be logged.
    pub fn as_pacte_error(&self) -> Option<&PacteError> {
        match self {
            AppError::PacteErr(err) => Some(err),
            _ => None,
        }
    }
}
