// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Connection pool configuration

use std::time::Duration;

use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

use crate::config::env::{parse_or, process_env, string_or, Lookup};
use crate::errors::{ConfigError, DatabaseError};

/// Indexer database connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Wait and connect timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "indexer".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Reads `NEARSCAN_DB_{HOST,PORT,NAME,USER,PASSWORD,POOL_SIZE,TIMEOUT_SECS}`.
    ///
    /// Unset variables fall back to [`DbConfig::default`]; set but
    /// unparsable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&process_env)
    }

    pub(crate) fn from_lookup(lookup: Lookup) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: string_or(lookup, "NEARSCAN_DB_HOST", defaults.host),
            port: parse_or(lookup, "NEARSCAN_DB_PORT", defaults.port)?,
            dbname: string_or(lookup, "NEARSCAN_DB_NAME", defaults.dbname),
            user: string_or(lookup, "NEARSCAN_DB_USER", defaults.user),
            password: string_or(lookup, "NEARSCAN_DB_PASSWORD", defaults.password),
            max_size: parse_or(lookup, "NEARSCAN_DB_POOL_SIZE", defaults.max_size)?,
            timeout: Duration::from_secs(parse_or(
                lookup,
                "NEARSCAN_DB_TIMEOUT_SECS",
                defaults.timeout.as_secs(),
            )?),
        })
    }

    /// Creates a connection pool. Connections are opened lazily.
    pub fn create_pool(&self) -> Result<Pool, DatabaseError> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let mut pool = PoolConfig::new(self.max_size);
        pool.timeouts.wait = Some(self.timeout);
        pool.timeouts.create = Some(self.timeout);
        cfg.pool = Some(pool);

        Ok(cfg.create_pool(Some(Runtime::Tokio1), NoTls)?)
    }
}
