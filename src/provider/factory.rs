// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! RPC client construction

use alloy_rpc_client::{ClientBuilder, RpcClient};

use crate::errors::RpcError;
use crate::transport::{LoggingLayer, RateLimitLayer};

use super::config::ProviderConfig;

/// Build an HTTP JSON-RPC client with the layers `config` asks for.
///
/// Logging wraps rate limiting so logged durations include time spent
/// waiting for a token.
///
/// # Errors
///
/// Returns [`RpcError::ProviderUrlInvalid`] if the URL does not parse.
pub fn create_rpc_client(config: &ProviderConfig) -> Result<RpcClient, RpcError> {
    let url: url::Url = config
        .url
        .parse()
        .map_err(|e| RpcError::ProviderUrlInvalid(format!("{}: {e}", config.url)))?;

    let limiter = match (config.rate_limit_per_second, config.min_delay) {
        (Some(rps), _) => Some(RateLimitLayer::per_second(rps)),
        (None, Some(delay)) => Some(RateLimitLayer::with_min_delay(delay)),
        (None, None) => None,
    };

    let client = match (limiter, config.logging_enabled) {
        (Some(limiter), true) => ClientBuilder::default()
            .layer(LoggingLayer::new())
            .layer(limiter)
            .http(url),
        (Some(limiter), false) => ClientBuilder::default().layer(limiter).http(url),
        (None, true) => ClientBuilder::default().layer(LoggingLayer::new()).http(url),
        (None, false) => ClientBuilder::default().http(url),
    };

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn builds_every_layer_combination() {
        let base = ProviderConfig::new("http://localhost:3030");
        let configs = [
            base.clone(),
            base.clone().with_logging(false),
            base.clone().with_rate_limit(10),
            base.clone().with_rate_limit(10).with_logging(false),
            base.with_min_delay(Duration::from_millis(100)),
        ];

        for config in &configs {
            assert!(create_rpc_client(config).is_ok());
        }
    }

    #[test]
    fn rejects_malformed_url() {
        let err = create_rpc_client(&ProviderConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, RpcError::ProviderUrlInvalid(_)));
    }
}
