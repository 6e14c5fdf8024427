// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! RPC provider configuration

use std::fmt;
use std::time::Duration;

/// Block finality used for view queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Finality {
    /// Latest block, may be reorganised
    Optimistic,
    /// Latest final block
    #[default]
    Final,
}

impl Finality {
    /// Wire value of the `finality` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Finality::Optimistic => "optimistic",
            Finality::Final => "final",
        }
    }
}

impl fmt::Display for Finality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Finality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "final" => Ok(Finality::Final),
            "optimistic" => Ok(Finality::Optimistic),
            other => Err(format!("expected `final` or `optimistic`, got `{other}`")),
        }
    }
}

/// Configuration for the NEAR JSON-RPC client
///
/// # Example
///
/// ```rust
/// use nearscan::provider::ProviderConfig;
/// use std::time::Duration;
///
/// let config = ProviderConfig::new("https://rpc.mainnet.near.org")
///     .with_rate_limit(10)
///     .with_timeout(Duration::from_secs(10));
/// assert!(config.has_rate_limiting());
/// ```
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// RPC endpoint URL
    pub url: String,
    /// Rate limit in requests per second (None for unlimited)
    pub rate_limit_per_second: Option<u32>,
    /// Per-request timeout
    pub timeout: Option<Duration>,
    /// Minimum delay between requests (alternative to rate limiting)
    pub min_delay: Option<Duration>,
    /// Wrap the client in [`crate::transport::LoggingLayer`]
    pub logging_enabled: bool,
    /// Finality for view queries
    pub finality: Finality,
}

impl ProviderConfig {
    /// Default mainnet endpoint
    pub const MAINNET_URL: &'static str = "https://rpc.mainnet.near.org";
    /// Default testnet endpoint
    pub const TESTNET_URL: &'static str = "https://rpc.testnet.near.org";

    /// Create a configuration for `url` with no throttling and no timeout
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            rate_limit_per_second: None,
            timeout: None,
            min_delay: None,
            logging_enabled: true,
            finality: Finality::Final,
        }
    }

    /// Set rate limiting (requests per second)
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_second: u32) -> Self {
        self.rate_limit_per_second = Some(requests_per_second);
        self
    }

    /// Set rate limiting from an optional value
    #[must_use]
    pub fn with_rate_limit_opt(mut self, requests_per_second: Option<u32>) -> Self {
        self.rate_limit_per_second = requests_per_second;
        self
    }

    /// Set request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set minimum delay between requests
    ///
    /// Ignored when a per-second rate limit is also set.
    #[must_use]
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = Some(delay);
        self
    }

    /// Enable or disable RPC call logging
    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    /// Set the finality used for view queries
    #[must_use]
    pub fn with_finality(mut self, finality: Finality) -> Self {
        self.finality = finality;
        self
    }

    /// Check if this configuration includes rate limiting
    #[must_use]
    pub fn has_rate_limiting(&self) -> bool {
        self.rate_limit_per_second.is_some() || self.min_delay.is_some()
    }

    /// Public mainnet RPC with conservative throttling
    #[must_use]
    pub fn mainnet() -> Self {
        Self::public_endpoint(Self::MAINNET_URL)
    }

    /// Public testnet RPC with conservative throttling
    #[must_use]
    pub fn testnet() -> Self {
        Self::public_endpoint(Self::TESTNET_URL)
    }

    /// Preset for shared public endpoints
    #[must_use]
    pub fn public_endpoint(url: impl Into<String>) -> Self {
        Self::new(url)
            .with_rate_limit(5)
            .with_timeout(Duration::from_secs(10))
    }

    /// Preset for a dedicated node
    #[must_use]
    pub fn private_endpoint(url: impl Into<String>) -> Self {
        Self::new(url)
            .with_rate_limit(50)
            .with_timeout(Duration::from_secs(10))
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}
