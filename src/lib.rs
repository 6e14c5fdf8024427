// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # nearscan
//!
//! Backend for a NEAR account explorer. Account data comes from two places:
//! the indexer database (identity, deployments, token holdings, actions) and
//! live NEAR RPC views (balances, contract code, access keys). Every read goes
//! through a shared cache-aside layer with per-key single-flight, so a burst
//! of requests for the same account costs one query.
//!
//! ## Layout
//!
//! - [`query`]: named-parameter binding for SQL templates
//! - [`db`]: the [`db::AccountRepository`] trait with Postgres and in-memory backends
//! - [`provider`]: NEAR JSON-RPC client over a rate-limited, logged transport
//! - [`cache`]: stores, keys and the single-flight [`cache::CachedFetcher`]
//! - [`api`]: axum handlers returning `{ "<field>": [ ... ] }` envelopes
//!
//! ## Binding a query
//!
//! ```rust
//! use nearscan::{bind, Params};
//!
//! let params = Params::new().with("account_id", "alice.near");
//! let bound = bind(
//!     "SELECT * FROM accounts WHERE account_id = :account_id AND created_at::TEXT <> ''",
//!     &params,
//! )
//! .unwrap();
//! assert_eq!(
//!     bound.text(),
//!     "SELECT * FROM accounts WHERE account_id = $1 AND created_at::TEXT <> ''"
//! );
//! ```

pub mod api;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod provider;
pub mod query;
pub mod tracing;
pub mod transport;
pub mod types;

pub use config::{CacheTtls, ExplorerConfig, ExplorerConfigBuilder, RepositoryBackend};
pub use errors::{CacheError, ConfigError, DatabaseError, NearscanError, QueryError, RpcError};
pub use query::{bind, BoundQuery, NamedParams, Params, QueryTemplate, SqlValue};
pub use types::account::{
    AccountId, AccountInfo, AccountRow, AccountView, BlockTimestamp, InvalidIdentifier, MethodName,
    TransactionRef,
};
pub use types::contract::{
    AccessKey, AccessKeyInfo, AccessKeyList, AccessKeyPermission, ActionRecord, ContractCodeView,
    ContractInfo, DeploymentRecord,
};
pub use types::holdings::{
    FtHolding, FtMetadata, Inventory, NftHolding, NftMetadata, TokenContracts,
};
