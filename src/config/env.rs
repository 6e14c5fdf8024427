// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Environment variable parsing helpers
//!
//! Loaders take a lookup function instead of reading the process environment
//! directly so tests can supply variables without mutating global state.

use std::fmt::Display;
use std::str::FromStr;

use crate::errors::ConfigError;

/// Variable lookup: `Some(value)` if set.
pub(crate) type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads from the process environment (after `.env` has been loaded).
pub(crate) fn process_env(name: &str) -> Option<String> {
    dotenvy::var(name).ok()
}

pub(crate) fn string_or(lookup: Lookup, name: &'static str, default: String) -> String {
    lookup(name).unwrap_or(default)
}

pub(crate) fn parse_opt<T>(lookup: Lookup, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                name,
                reason: format!("{raw:?}: {e}"),
            }),
    }
}

pub(crate) fn parse_or<T>(lookup: Lookup, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    Ok(parse_opt(lookup, name)?.unwrap_or(default))
}

/// `1/true/yes/on` or `0/false/no/off`, case-insensitive; unset is `false`.
pub(crate) fn flag(lookup: Lookup, name: &'static str) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            reason: format!("{raw:?} is not a boolean"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn parse_reports_the_variable() {
        let lookup = vars(&[("PORT", "eighty")]);
        let err = parse_or::<u16>(&lookup, "PORT", 80).unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert_eq!(parse_or::<u16>(&lookup, "OTHER", 80).unwrap(), 80);
    }

    #[test]
    fn flags() {
        let lookup = vars(&[("A", "TRUE"), ("B", "off"), ("C", "maybe")]);
        assert!(flag(&lookup, "A").unwrap());
        assert!(!flag(&lookup, "B").unwrap());
        assert!(!flag(&lookup, "UNSET").unwrap());
        assert!(flag(&lookup, "C").is_err());
    }
}
