// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for nearscan integration tests
//!
//! Provides mock implementations of the repository and RPC traits so the
//! service can be exercised without a database or a NEAR node.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use nearscan::api::{router, AppState};
use nearscan::cache::{CacheStore, MemoryStore};
use nearscan::db::{
    AccountRepository, FtBalanceChange, MemoryRepository, NftHoldingRow, ReceiptAction,
};
use nearscan::provider::NearRpc;
use nearscan::{
    AccessKey, AccessKeyInfo, AccessKeyList, AccessKeyPermission, AccountId, AccountRow,
    AccountView, ActionRecord, BlockTimestamp, CacheTtls, ContractCodeView, DatabaseError,
    DeploymentRecord, FtHolding, FtMetadata, MethodName, NftHolding, NftMetadata, RpcError,
    TokenContracts,
};
use serde_json::json;

pub fn account(id: &str) -> AccountId {
    id.parse().expect("valid account id")
}

/// Mock NEAR RPC
///
/// Counts calls per view and can be switched into failure mode at runtime.
#[derive(Debug, Default)]
pub struct MockRpc {
    pub view: Option<AccountView>,
    pub code: Option<ContractCodeView>,
    pub keys: Option<AccessKeyList>,
    failing: AtomicBool,
    pub view_calls: AtomicUsize,
    pub code_calls: AtomicUsize,
    pub key_calls: AtomicUsize,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(mut self, amount: &str) -> Self {
        self.view = Some(AccountView {
            amount: amount.to_string(),
            locked: "0".to_string(),
            code_hash: "11111111111111111111111111111111".to_string(),
            storage_usage: 182,
            block_height: 100,
        });
        self
    }

    pub fn with_code(mut self, code_base64: &str, hash: &str) -> Self {
        self.code = Some(ContractCodeView {
            code_base64: code_base64.to_string(),
            hash: hash.to_string(),
        });
        self
    }

    pub fn with_keys(mut self, full_access: bool) -> Self {
        let permission = if full_access {
            AccessKeyPermission::FullAccess
        } else {
            AccessKeyPermission::FunctionCall {
                allowance: None,
                receiver_id: "app.near".to_string(),
                method_names: vec![],
            }
        };
        self.keys = Some(AccessKeyList {
            keys: vec![AccessKeyInfo {
                public_key: "ed25519:6E8sCci9badyRkXb3JoRpBj5p8C6Tw41ELDZoiihKEtp".to_string(),
                access_key: AccessKey {
                    nonce: 7,
                    permission,
                },
            }],
        });
        self
    }

    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn answer<T: Clone>(
        &self,
        request_type: &'static str,
        account_id: &AccountId,
        value: &Option<T>,
    ) -> Result<T, RpcError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RpcError::view_failed(
                request_type,
                account_id.as_str(),
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "node down"),
            ));
        }
        value.clone().ok_or_else(|| RpcError::UnknownAccount {
            account_id: account_id.to_string(),
        })
    }
}

#[async_trait]
impl NearRpc for MockRpc {
    async fn view_account(&self, account_id: &AccountId) -> Result<AccountView, RpcError> {
        self.view_calls.fetch_add(1, Ordering::SeqCst);
        self.answer("view_account", account_id, &self.view)
    }

    async fn view_code(&self, account_id: &AccountId) -> Result<ContractCodeView, RpcError> {
        self.code_calls.fetch_add(1, Ordering::SeqCst);
        match self.answer("view_code", account_id, &self.code) {
            Err(RpcError::UnknownAccount { account_id }) => {
                Err(RpcError::NoContractCode { account_id })
            }
            other => other,
        }
    }

    async fn view_access_keys(&self, account_id: &AccountId) -> Result<AccessKeyList, RpcError> {
        self.key_calls.fetch_add(1, Ordering::SeqCst);
        self.answer("view_access_key_list", account_id, &self.keys)
    }
}

/// Repository whose every query fails
#[derive(Debug, Default)]
pub struct FailingRepository {
    pub calls: AtomicUsize,
}

impl FailingRepository {
    fn fail<T>(&self, query: &'static str) -> Result<T, DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DatabaseError::row_shape(query, "database unreachable"))
    }
}

#[async_trait]
impl AccountRepository for FailingRepository {
    async fn account(&self, _: &AccountId) -> Result<Option<AccountRow>, DatabaseError> {
        self.fail("account")
    }

    async fn first_last_deployments(
        &self,
        _: &AccountId,
    ) -> Result<Vec<DeploymentRecord>, DatabaseError> {
        self.fail("first_last_deployments")
    }

    async fn ft_holdings(&self, _: &AccountId) -> Result<Vec<FtHolding>, DatabaseError> {
        self.fail("ft_inventory")
    }

    async fn nft_holdings(&self, _: &AccountId) -> Result<Vec<NftHolding>, DatabaseError> {
        self.fail("nft_inventory")
    }

    async fn token_contracts(&self, _: &AccountId) -> Result<TokenContracts, DatabaseError> {
        self.fail("token_contracts")
    }

    async fn latest_action(
        &self,
        _: &AccountId,
        _: &MethodName,
    ) -> Result<Option<ActionRecord>, DatabaseError> {
        self.fail("latest_action")
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

pub fn ft_meta(symbol: &str) -> FtMetadata {
    FtMetadata {
        name: format!("{symbol} Token"),
        symbol: symbol.to_string(),
        decimals: 18,
        icon: None,
        reference: None,
    }
}

pub fn nft_meta(symbol: &str) -> NftMetadata {
    NftMetadata {
        name: format!("{symbol} Collection"),
        symbol: symbol.to_string(),
        icon: None,
        base_uri: Some("https://ipfs.io/ipfs".to_string()),
        reference: None,
    }
}

pub fn ft_change(contract: &str, account: &str, amount: &str) -> FtBalanceChange {
    FtBalanceChange {
        contract: contract.to_string(),
        account: account.to_string(),
        amount: BigDecimal::from_str(amount).expect("decimal amount"),
    }
}

/// Indexer contents shared by the integration tests.
///
/// `alice.near` exists, deployed three times (the middle deploy failed),
/// holds two fungible tokens (one netting to zero) and one NFT collection.
pub fn sample_repository() -> MemoryRepository {
    MemoryRepository::new()
        .with_account(AccountRow {
            account_id: account("alice.near"),
            created_by_transaction_hash: Some("CreateTx".to_string()),
            created_at: Some(BlockTimestamp(1_600_000_000_000_000_000)),
            deleted_by_transaction_hash: None,
            deleted_at: None,
        })
        .with_action(ReceiptAction::deploy("alice.near", "Deploy1", 100))
        .with_action(ReceiptAction::deploy("alice.near", "Deploy2", 300).failed())
        .with_action(ReceiptAction::deploy("alice.near", "Deploy3", 500))
        .with_action(ReceiptAction::function_call(
            "alice.near",
            "bob.near",
            "set_greeting",
            json!({"greeting": "hi"}),
            "Call1",
            200,
        ))
        .with_action(ReceiptAction::function_call(
            "alice.near",
            "carol.near",
            "set_greeting",
            json!({"greeting": "hello"}),
            "Call2",
            400,
        ))
        .with_ft_change(ft_change("usdt.near", "alice.near", "1500"))
        .with_ft_change(ft_change("usdt.near", "alice.near", "-500"))
        .with_ft_change(ft_change("wrap.near", "alice.near", "20"))
        .with_ft_change(ft_change("wrap.near", "alice.near", "-20"))
        .with_ft_metadata("usdt.near", ft_meta("USDT"))
        .with_ft_metadata("wrap.near", ft_meta("wNEAR"))
        .with_nft_holding(NftHoldingRow {
            contract: "paras.near".to_string(),
            account: "alice.near".to_string(),
            quantity: 3,
        })
        .with_nft_metadata("paras.near", nft_meta("PARAS"))
        .with_ft_event("usdt.near", "alice.near")
        .with_ft_event("wrap.near", "alice.near")
        .with_nft_event("paras.near", "alice.near")
}

/// Router over the given backends with a fresh memory store.
pub fn app(repo: Arc<dyn AccountRepository>, rpc: Arc<dyn NearRpc>) -> axum::Router {
    let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
    router(AppState::new(repo, rpc, store, CacheTtls::default()))
}
