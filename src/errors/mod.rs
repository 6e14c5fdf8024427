// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the nearscan library.
//!
//! This module follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained handling ([`QueryError`],
//!   [`CacheError`], [`RpcError`], [`DatabaseError`], [`ConfigError`])
//! - **Unified error type** ([`NearscanError`]) for call sites that only need
//!   to propagate
//!
//! Producer failures inside the cache layer are never surfaced as raw errors to
//! handlers. They arrive as [`crate::cache::Fetched::Unavailable`] so every caller
//! decides explicitly between "null field" and "propagate".
//!
//! # Examples
//!
//! ```rust
//! use nearscan::{bind, Params, NearscanError, QueryError};
//!
//! fn build() -> Result<(), NearscanError> {
//!     let params = Params::new().with("account_id", "alice.near");
//!     let bound = bind("SELECT * FROM accounts WHERE account_id = :account_id", &params)?;
//!     assert_eq!(bound.text(), "SELECT * FROM accounts WHERE account_id = $1");
//!     Ok(())
//! }
//! # build().unwrap();
//! ```

mod cache;
mod config;
mod database;
mod query;
mod rpc;

pub use cache::CacheError;
pub use config::ConfigError;
pub use database::DatabaseError;
pub use query::QueryError;
pub use rpc::RpcError;

/// Unified error type for all nearscan operations.
///
/// All module-specific error types convert into `NearscanError` via `From`,
/// so `?` works across module boundaries.
#[derive(Debug, thiserror::Error)]
pub enum NearscanError {
    /// Query template could not be bound.
    #[error("Query binding error: {0}")]
    Query(#[from] QueryError),

    /// Cache store failure.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Blockchain RPC failure.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Relational database failure.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
