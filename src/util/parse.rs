use crate::error::{internal::InternalError, AppError};

/// Parses a u64 value from a stored Discord snowflake.
///
/// # Arguments
/// - `value` - The string to attempt to parse into `u64`
///
/// # Returns
/// - `Ok(u64)` - Successfully parsed the string
/// - `Err(AppError::InternalErr(ParseStringId))` - The string is not a valid u64
pub fn parse_u64_from_string(value: &str) -> Result<u64, AppError> {
    let result = value
        .parse::<u64>()
        .map_err(|e| InternalError::ParseStringId {
            value: value.to_string(),
            source: e,
        })?;

    Ok(result)
}

/// Splits a Riot ID of the form `GameName#TAG` into its two parts.
///
/// Both parts are trimmed; either being empty yields `None`.
pub fn split_riot_id(value: &str) -> Option<(String, String)> {
    let (name, tag) = value.trim().rsplit_once('#')?;
    let (name, tag) = (name.trim(), tag.trim());

    if name.is_empty() || tag.is_empty() {
        return None;
    }

    Some((name.to_string(), tag.to_string()))
}
