//! Helpers for reading configuration from environment-like sources

use std::fmt::Display;
use std::str::FromStr;

use crate::error::ConfigError;

/// Parse `key` from `lookup`, treating absence as `None`.
///
/// A present but malformed value is an error naming the variable.
pub fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::new(format!("{key}={raw:?}: {e}"))),
        None => Ok(None),
    }
}
