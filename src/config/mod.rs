// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration for the explorer service
//!
//! # Example: from the environment
//!
//! ```rust,no_run
//! use nearscan::ExplorerConfig;
//!
//! let config = ExplorerConfig::from_env()?;
//! # Ok::<(), nearscan::ConfigError>(())
//! ```
//!
//! # Example: programmatic
//!
//! ```rust
//! use nearscan::{CacheTtls, ExplorerConfigBuilder};
//! use nearscan::provider::ProviderConfig;
//! use std::time::Duration;
//!
//! let config = ExplorerConfigBuilder::with_defaults()
//!     .rpc(ProviderConfig::testnet())
//!     .fixtures("fixtures/dev.json")
//!     .ttls(CacheTtls::uniform(Duration::from_secs(2)))
//!     .build();
//! assert_eq!(config.ttls.action, Duration::from_secs(2));
//! ```
//!
//! # Environment variables
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `NEARSCAN_LISTEN_ADDR` | HTTP listen address | `0.0.0.0:3000` |
//! | `NEARSCAN_RPC_URL` | NEAR RPC endpoint | mainnet |
//! | `NEARSCAN_RPC_RATE_LIMIT` | requests per second | 5 |
//! | `NEARSCAN_RPC_TIMEOUT_MS` | per-request timeout | 10000 |
//! | `NEARSCAN_RPC_FINALITY` | `final` or `optimistic` | `final` |
//! | `NEARSCAN_FIXTURES` | serve from a JSON fixture file instead of Postgres | unset |
//! | `NEARSCAN_DB_*` | see [`DbConfig::from_env`] | |
//! | `NEARSCAN_CACHE_MAX_ENTRIES` | bound on the in-memory store | unbounded |
//! | `NEARSCAN_CACHE_DISABLED` | bypass the cache entirely | `false` |
//! | `NEARSCAN_LOG_JSON` | JSON log lines | `false` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::AccountResource;
use crate::db::DbConfig;
use crate::errors::ConfigError;
use crate::provider::{Finality, ProviderConfig};
use crate::tracing::LogFormat;

pub mod constants;
pub(crate) mod env;

use env::{flag, parse_opt, parse_or, process_env, string_or, Lookup};

/// Cache lifetime per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    /// Indexer identity row
    pub account: Duration,
    /// RPC `view_account`
    pub account_view: Duration,
    /// RPC `view_code`
    pub code: Duration,
    /// RPC `view_access_key_list`
    pub access_keys: Duration,
    /// First/last deployments
    pub deployments: Duration,
    /// Holdings
    pub inventory: Duration,
    /// Token contract lists
    pub tokens: Duration,
    /// Latest action
    pub action: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        use constants::ttl;
        Self {
            account: ttl::ACCOUNT,
            account_view: ttl::ACCOUNT_VIEW,
            code: ttl::CODE,
            access_keys: ttl::ACCESS_KEYS,
            deployments: ttl::DEPLOYMENTS,
            inventory: ttl::INVENTORY,
            tokens: ttl::TOKENS,
            action: ttl::ACTION,
        }
    }
}

impl CacheTtls {
    /// Same lifetime for every resource.
    pub fn uniform(ttl: Duration) -> Self {
        Self {
            account: ttl,
            account_view: ttl,
            code: ttl,
            access_keys: ttl,
            deployments: ttl,
            inventory: ttl,
            tokens: ttl,
            action: ttl,
        }
    }

    /// Lifetime for `resource`.
    pub fn for_resource(&self, resource: AccountResource) -> Duration {
        match resource {
            AccountResource::Identity => self.account,
            AccountResource::View => self.account_view,
            AccountResource::Code => self.code,
            AccountResource::AccessKeys => self.access_keys,
            AccountResource::Deployments => self.deployments,
            AccountResource::Inventory => self.inventory,
            AccountResource::Tokens => self.tokens,
            AccountResource::Action => self.action,
        }
    }
}

/// Where account data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryBackend {
    /// The indexer database
    Postgres(DbConfig),
    /// A JSON fixture file loaded into memory
    Fixtures(PathBuf),
}

/// Configuration for the explorer service
///
/// Use [`ExplorerConfigBuilder`] for a fluent API or
/// [`ExplorerConfig::from_env`] in the binary.
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// HTTP listen address
    pub listen_addr: SocketAddr,
    /// NEAR RPC client settings
    pub rpc: ProviderConfig,
    /// Account data source
    pub backend: RepositoryBackend,
    /// Cache lifetimes
    pub ttls: CacheTtls,
    /// Bound on the in-memory cache store (None = unbounded)
    pub cache_max_entries: Option<usize>,
    /// When false every fetch goes to the producer
    pub cache_enabled: bool,
    /// Log line format
    pub log_format: LogFormat,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            rpc: ProviderConfig::mainnet(),
            backend: RepositoryBackend::Postgres(DbConfig::default()),
            ttls: CacheTtls::default(),
            cache_max_entries: None,
            cache_enabled: true,
            log_format: LogFormat::Text,
        }
    }
}

impl ExplorerConfig {
    /// Loads configuration from `NEARSCAN_*` variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for any variable that is set but
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&process_env)
    }

    pub(crate) fn from_lookup(lookup: Lookup) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let listen_addr = parse_or(
            lookup,
            "NEARSCAN_LISTEN_ADDR",
            constants::DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or(defaults.listen_addr),
        )?;

        let mut rpc = ProviderConfig::public_endpoint(string_or(
            lookup,
            "NEARSCAN_RPC_URL",
            ProviderConfig::MAINNET_URL.to_string(),
        ));
        if let Some(rps) = parse_opt::<u32>(lookup, "NEARSCAN_RPC_RATE_LIMIT")? {
            rpc = rpc.with_rate_limit_opt((rps > 0).then_some(rps));
        }
        if let Some(ms) = parse_opt::<u64>(lookup, "NEARSCAN_RPC_TIMEOUT_MS")? {
            rpc = rpc.with_timeout(Duration::from_millis(ms));
        }
        rpc = rpc.with_finality(parse_or(lookup, "NEARSCAN_RPC_FINALITY", Finality::Final)?);

        let backend = match lookup("NEARSCAN_FIXTURES") {
            Some(path) if !path.trim().is_empty() => {
                RepositoryBackend::Fixtures(PathBuf::from(path))
            }
            _ => RepositoryBackend::Postgres(DbConfig::from_lookup(lookup)?),
        };

        let log_format = if flag(lookup, "NEARSCAN_LOG_JSON")? {
            LogFormat::Json
        } else {
            LogFormat::Text
        };

        Ok(Self {
            listen_addr,
            rpc,
            backend,
            ttls: CacheTtls::default(),
            cache_max_entries: parse_opt(lookup, "NEARSCAN_CACHE_MAX_ENTRIES")?,
            cache_enabled: !flag(lookup, "NEARSCAN_CACHE_DISABLED")?,
            log_format,
        })
    }
}

/// Builder for [`ExplorerConfig`]
///
/// ```rust
/// use nearscan::ExplorerConfigBuilder;
///
/// let config = ExplorerConfigBuilder::new()
///     .listen_addr(([127, 0, 0, 1], 8080).into())
///     .cache_max_entries(10_000)
///     .build();
/// assert_eq!(config.cache_max_entries, Some(10_000));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExplorerConfigBuilder {
    config: ExplorerConfig,
}

impl ExplorerConfigBuilder {
    /// Start from [`ExplorerConfig::default`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias of [`ExplorerConfigBuilder::new`]
    pub fn with_defaults() -> Self {
        Self::new()
    }

    /// Set the HTTP listen address
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.config.listen_addr = addr;
        self
    }

    /// Set RPC client settings
    pub fn rpc(mut self, rpc: ProviderConfig) -> Self {
        self.config.rpc = rpc;
        self
    }

    /// Read account data from Postgres
    pub fn postgres(mut self, db: DbConfig) -> Self {
        self.config.backend = RepositoryBackend::Postgres(db);
        self
    }

    /// Read account data from a JSON fixture file
    pub fn fixtures(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.backend = RepositoryBackend::Fixtures(path.into());
        self
    }

    /// Replace all cache lifetimes
    pub fn ttls(mut self, ttls: CacheTtls) -> Self {
        self.config.ttls = ttls;
        self
    }

    /// Bound the in-memory store
    pub fn cache_max_entries(mut self, max: usize) -> Self {
        self.config.cache_max_entries = Some(max);
        self
    }

    /// Bypass the cache
    pub fn disable_cache(mut self) -> Self {
        self.config.cache_enabled = false;
        self
    }

    /// Set the log format
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.log_format = format;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ExplorerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn default_ttls_match_resource_freshness() {
        let ttls = CacheTtls::default();
        assert_eq!(ttls.for_resource(AccountResource::Identity), Duration::from_secs(15));
        assert_eq!(ttls.for_resource(AccountResource::View), Duration::from_secs(5));
        assert_eq!(ttls.for_resource(AccountResource::Tokens), Duration::from_secs(10));
        assert_eq!(ttls.for_resource(AccountResource::Action), Duration::from_secs(1));
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ExplorerConfig::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(config.listen_addr, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert_eq!(config.rpc.url, ProviderConfig::MAINNET_URL);
        assert!(matches!(config.backend, RepositoryBackend::Postgres(_)));
        assert!(config.cache_enabled);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn environment_overrides() {
        let config = ExplorerConfig::from_lookup(&lookup_from(&[
            ("NEARSCAN_LISTEN_ADDR", "127.0.0.1:9000"),
            ("NEARSCAN_RPC_URL", "http://localhost:3030"),
            ("NEARSCAN_RPC_RATE_LIMIT", "0"),
            ("NEARSCAN_RPC_FINALITY", "optimistic"),
            ("NEARSCAN_FIXTURES", "dev.json"),
            ("NEARSCAN_CACHE_MAX_ENTRIES", "100"),
            ("NEARSCAN_CACHE_DISABLED", "true"),
            ("NEARSCAN_LOG_JSON", "1"),
        ]))
        .unwrap();

        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.rpc.url, "http://localhost:3030");
        assert_eq!(config.rpc.rate_limit_per_second, None);
        assert_eq!(config.rpc.finality, Finality::Optimistic);
        assert_eq!(config.backend, RepositoryBackend::Fixtures(PathBuf::from("dev.json")));
        assert_eq!(config.cache_max_entries, Some(100));
        assert!(!config.cache_enabled);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_errors() {
        let lookup = lookup_from(&[("NEARSCAN_LISTEN_ADDR", "nowhere")]);
        let result = ExplorerConfig::from_lookup(&lookup);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                name: "NEARSCAN_LISTEN_ADDR",
                ..
            })
        ));
    }
}
