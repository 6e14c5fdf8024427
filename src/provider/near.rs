// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! NEAR `query` view calls over JSON-RPC

use std::time::Duration;

use alloy_json_rpc::RpcRecv;
use alloy_rpc_client::RpcClient;
use alloy_transport::TransportError;
use async_trait::async_trait;
use serde_json::json;
use tracing::Instrument;

use super::config::{Finality, ProviderConfig};
use super::factory::create_rpc_client;
use super::NearRpc;
use crate::errors::RpcError;
use crate::tracing::spans;
use crate::types::account::{AccountId, AccountView};
use crate::types::contract::{AccessKeyList, ContractCodeView};

const VIEW_ACCOUNT: &str = "view_account";
const VIEW_CODE: &str = "view_code";
const VIEW_ACCESS_KEY_LIST: &str = "view_access_key_list";

/// [`NearRpc`] over an alloy [`RpcClient`].
#[derive(Clone, Debug)]
pub struct JsonRpcProvider {
    client: RpcClient,
    finality: Finality,
    timeout: Option<Duration>,
}

impl JsonRpcProvider {
    /// Wraps an already-built client.
    pub fn new(client: RpcClient, finality: Finality, timeout: Option<Duration>) -> Self {
        Self {
            client,
            finality,
            timeout,
        }
    }

    /// Builds the client described by `config`.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, RpcError> {
        let client = create_rpc_client(config)?;
        Ok(Self::new(client, config.finality, config.timeout))
    }

    async fn view<R: RpcRecv>(
        &self,
        request_type: &'static str,
        account_id: &AccountId,
    ) -> Result<R, RpcError> {
        let params = json!({
            "request_type": request_type,
            "finality": self.finality.as_str(),
            "account_id": account_id.as_str(),
        });
        let call = self.client.request::<_, R>("query", params);

        let result = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(RpcError::Timeout {
                        request_type,
                        account_id: account_id.to_string(),
                        timeout_ms: timeout.as_millis() as u64,
                    })
                }
            },
            None => call.await,
        };

        result.map_err(|e| classify(request_type, account_id, e))
    }
}

#[async_trait]
impl NearRpc for JsonRpcProvider {
    async fn view_account(&self, account_id: &AccountId) -> Result<AccountView, RpcError> {
        self.view(VIEW_ACCOUNT, account_id)
            .instrument(spans::rpc_view(VIEW_ACCOUNT, account_id))
            .await
    }

    async fn view_code(&self, account_id: &AccountId) -> Result<ContractCodeView, RpcError> {
        self.view(VIEW_CODE, account_id)
            .instrument(spans::rpc_view(VIEW_CODE, account_id))
            .await
    }

    async fn view_access_keys(&self, account_id: &AccountId) -> Result<AccessKeyList, RpcError> {
        self.view(VIEW_ACCESS_KEY_LIST, account_id)
            .instrument(spans::rpc_view(VIEW_ACCESS_KEY_LIST, account_id))
            .await
    }
}

/// Node-reported failures worth distinguishing from transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KnownFailure {
    UnknownAccount,
    NoContractCode,
}

/// Recognises NEAR handler errors from the error payload text.
///
/// Nodes report them as `{"name": "HANDLER_ERROR", "cause": {"name": "UNKNOWN_ACCOUNT"}}`
/// with a human-readable `data` string; older nodes only send the string.
fn known_failure(text: &str) -> Option<KnownFailure> {
    if text.contains("UNKNOWN_ACCOUNT") || text.contains("does not exist while viewing") {
        Some(KnownFailure::UnknownAccount)
    } else if text.contains("NO_CONTRACT_CODE") || text.contains("has never been observed") {
        Some(KnownFailure::NoContractCode)
    } else {
        None
    }
}

fn classify(request_type: &'static str, account_id: &AccountId, error: TransportError) -> RpcError {
    let failure = error.as_error_resp().and_then(|payload| {
        let data = payload.data.as_ref().map(|d| d.get()).unwrap_or_default();
        known_failure(&format!("{} {data}", payload.message))
    });

    match failure {
        Some(KnownFailure::UnknownAccount) => RpcError::UnknownAccount {
            account_id: account_id.to_string(),
        },
        Some(KnownFailure::NoContractCode) => RpcError::NoContractCode {
            account_id: account_id.to_string(),
        },
        None => RpcError::view_failed(request_type, account_id.as_str(), error),
    }
}
