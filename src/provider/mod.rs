// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! NEAR JSON-RPC access
//!
//! Handlers depend on the [`NearRpc`] trait, not on a concrete client, so the
//! API can be exercised against an in-process fake.
//!
//! - [`JsonRpcProvider`] - the production implementation over an alloy `RpcClient`
//! - [`create_rpc_client`] - builds the client with logging and rate limiting layers
//! - [`ProviderConfig`] - endpoint, throttling, timeout and finality
//!
//! # Example
//!
//! ```rust,ignore
//! use nearscan::provider::{JsonRpcProvider, NearRpc, ProviderConfig};
//!
//! let rpc = JsonRpcProvider::from_config(&ProviderConfig::mainnet())?;
//! let view = rpc.view_account(&"alice.near".parse()?).await?;
//! println!("balance: {}", view.amount);
//! ```

use async_trait::async_trait;

use crate::errors::RpcError;
use crate::types::account::{AccountId, AccountView};
use crate::types::contract::{AccessKeyList, ContractCodeView};

mod config;
mod factory;
mod near;

pub use config::{Finality, ProviderConfig};
pub use factory::create_rpc_client;
pub use near::JsonRpcProvider;

/// The three NEAR view queries the explorer needs.
#[async_trait]
pub trait NearRpc: Send + Sync {
    /// `query` / `view_account`
    async fn view_account(&self, account_id: &AccountId) -> Result<AccountView, RpcError>;

    /// `query` / `view_code`
    async fn view_code(&self, account_id: &AccountId) -> Result<ContractCodeView, RpcError>;

    /// `query` / `view_access_key_list`
    async fn view_access_keys(&self, account_id: &AccountId) -> Result<AccessKeyList, RpcError>;
}
