// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Shared RPC error types for blockchain provider operations.
//!
//! These errors describe transport-level and provider-level failures of the
//! NEAR JSON-RPC view calls. They are recoverable: the cache layer converts
//! them into an explicit "unavailable" outcome rather than a failed request.

/// Errors that can occur during blockchain RPC operations.
///
/// # Examples
///
/// ```rust
/// use nearscan::RpcError;
///
/// let error = RpcError::UnknownAccount {
///     account_id: "ghost.near".to_string(),
/// };
/// println!("Error: {}", error);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// A `query` view call failed at the transport or provider level.
    ///
    /// This covers timeouts, connection failures, rate limiting responses and
    /// JSON-RPC error objects returned by the node.
    #[error("RPC {request_type} failed for {account_id}")]
    ViewFailed {
        /// NEAR query request type (e.g. "view_account")
        request_type: &'static str,
        /// Account being queried
        account_id: String,
        /// The underlying transport error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The account does not exist on chain.
    #[error("Account not found on chain: {account_id}")]
    UnknownAccount {
        /// The account that was not found
        account_id: String,
    },

    /// The account exists but has no contract code deployed.
    #[error("No contract code deployed on {account_id}")]
    NoContractCode {
        /// The account without code
        account_id: String,
    },

    /// The node did not answer within the configured timeout.
    #[error("RPC {request_type} for {account_id} timed out after {timeout_ms}ms")]
    Timeout {
        /// NEAR query request type
        request_type: &'static str,
        /// Account being queried
        account_id: String,
        /// Configured timeout
        timeout_ms: u64,
    },

    /// The configured provider URL could not be parsed.
    #[error("Invalid RPC provider URL: {0}")]
    ProviderUrlInvalid(String),
}

impl RpcError {
    /// Helper to create a `ViewFailed` error from any error type.
    pub fn view_failed(
        request_type: &'static str,
        account_id: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RpcError::ViewFailed {
            request_type,
            account_id: account_id.into(),
            source: Box::new(source),
        }
    }
}
