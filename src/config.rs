use chrono::Duration;
use std::str::FromStr;

use crate::{
    error::{config::ConfigError, AppError},
    service::{observer::retry::RetryPolicy, progress::EnginePolicy},
};

const DEFAULT_RIOT_TIMEOUT_SECONDS: u64 = 10;

pub struct Config {
    pub database_url: String,
    pub discord_bot_token: String,

    pub riot_api_key: String,
    /// Home platform of the community, `euw1`, `na1`, ...
    pub riot_platform: String,
    pub riot_timeout: std::time::Duration,
    pub riot_retry: RetryPolicy,

    pub engine: EnginePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = EnginePolicy::default();
        let retry_defaults = RetryPolicy::default();

        let engine = EnginePolicy {
            min_check_interval: seconds_or(
                "PACTE_MIN_CHECK_INTERVAL_SECONDS",
                defaults.min_check_interval,
            )?,
            lookup_delay: seconds_or("PACTE_LOOKUP_DELAY_SECONDS", defaults.lookup_delay)?,
            give_up_after: seconds_or("PACTE_GIVE_UP_AFTER_SECONDS", defaults.give_up_after)?,
            max_empty_polls: optional("PACTE_MAX_EMPTY_POLLS")?,
            error_threshold: parsed_or("PACTE_ERROR_THRESHOLD", defaults.error_threshold)?,
            pacte_duration: seconds_or("PACTE_DURATION_SECONDS", defaults.pacte_duration)?,
            warning_window: seconds_or("PACTE_WARNING_WINDOW_SECONDS", defaults.warning_window)?,
            ledger_stale_window: seconds_or(
                "PACTE_LEDGER_STALE_SECONDS",
                defaults.ledger_stale_window,
            )?,
            kick_multiplier: parsed_or("PACTE_KICK_MULTIPLIER", defaults.kick_multiplier)?,
            lookback: parsed_or("PACTE_MATCH_LOOKBACK", defaults.lookback)?,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            discord_bot_token: required("DISCORD_BOT_TOKEN")?,
            riot_api_key: required("RIOT_API_KEY")?,
            riot_platform: optional("RIOT_PLATFORM")?.unwrap_or_else(|| "euw1".to_string()),
            riot_timeout: std::time::Duration::from_secs(parsed_or(
                "RIOT_TIMEOUT_SECONDS",
                DEFAULT_RIOT_TIMEOUT_SECONDS,
            )?),
            riot_retry: RetryPolicy {
                max_attempts: parsed_or("RIOT_MAX_ATTEMPTS", retry_defaults.max_attempts)?.max(1),
                ..retry_defaults
            },
            engine,
        })
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Parsed value of an optional variable, `None` when unset or empty.
fn optional<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: raw.to_string(),
        })
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    Ok(optional(name)?.unwrap_or(default))
}

fn seconds_or(name: &str, default: Duration) -> Result<Duration, ConfigError> {
    Ok(optional::<i64>(name)?
        .map(Duration::seconds)
        .unwrap_or(default))
}
