// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for relational database access.

use super::QueryError;

/// Errors raised by the account repository.
///
/// Database failures are not retried and not swallowed: they propagate to the
/// request-level handler, which answers with a server error.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Could not obtain a connection from the pool.
    #[error("Failed to acquire database connection")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The pool itself could not be created from configuration.
    #[error("Failed to create database pool: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    /// A statement failed to execute.
    #[error("Query {query} failed")]
    Query {
        /// Logical name of the query (e.g. "first_last_deployments")
        query: &'static str,
        /// The underlying driver error
        #[source]
        source: tokio_postgres::Error,
    },

    /// A query template could not be bound.
    #[error(transparent)]
    Bind(#[from] QueryError),

    /// A row did not have the expected shape or value.
    #[error("Unexpected row shape in {query}: {details}")]
    RowShape {
        /// Logical name of the query
        query: &'static str,
        /// What was wrong
        details: String,
    },
}

impl DatabaseError {
    /// Helper to attach the logical query name to a driver error.
    pub fn query(query: &'static str, source: tokio_postgres::Error) -> Self {
        DatabaseError::Query { query, source }
    }

    /// Helper for rows that decode but violate an expectation.
    pub fn row_shape(query: &'static str, details: impl Into<String>) -> Self {
        DatabaseError::RowShape {
            query,
            details: details.into(),
        }
    }
}
