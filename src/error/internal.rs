use std::num::ParseIntError;
use thiserror::Error;

/// Internal issues with the codebase indicating unexpected behavior & possible bugs
#[derive(Error, Debug)]
pub enum InternalError {
    /// Failure to parse id from String
    #[error("Failed to parse ID from String '{value}': {source}")]
    ParseStringId {
        /// The string value that failed to parse
        value: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },

    /// A stored pacte status is not one of the known lifecycle states.
    #[error("Unknown pacte status '{0}'")]
    UnknownPacteStatus(String),

    /// A stored ledger result is neither a win nor a loss.
    #[error("Unknown match result '{0}'")]
    UnknownMatchResult(String),

    /// A row that was just written could not be read back.
    #[error("Pacte {0} disappeared during an update")]
    PacteVanished(i32),
}
