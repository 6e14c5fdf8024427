// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for named-parameter query binding.

/// Errors raised while binding a query template.
///
/// A missing parameter is a programming error at the call site. The binder
/// fails immediately and never substitutes a default value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// A `:name` marker in the template has no bound value.
    #[error("No value bound for parameter :{name} (marker #{position})")]
    MissingParameter {
        /// Marker name without the leading colon
        name: String,
        /// 1-based occurrence index of the marker in the template
        position: usize,
    },

    /// The template ends inside a quoted literal or identifier.
    #[error("Unterminated {kind} starting at byte {offset}")]
    Unterminated {
        /// What was left open ("string literal" or "quoted identifier")
        kind: &'static str,
        /// Byte offset of the opening quote
        offset: usize,
    },
}

impl QueryError {
    pub(crate) fn missing(name: impl Into<String>, position: usize) -> Self {
        QueryError::MissingParameter {
            name: name.into(),
            position,
        }
    }
}
