// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-process account repository over fixture data
//!
//! Holds the same raw facts the indexer tables do (receipt actions with their
//! outcomes, per-period balance changes, metadata rows, token events) and
//! derives query results with the in-process counterparts in
//! [`deployments`](super::deployments) and [`holdings`](super::holdings).
//! Used for local development (`NEARSCAN_FIXTURES`) and tests.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::deployments::first_and_last;
use super::holdings::{aggregate_fungible, order_non_fungible, FtBalanceChange, NftHoldingRow};
use super::repository::AccountRepository;
use crate::errors::{ConfigError, DatabaseError};
use crate::types::account::{AccountId, AccountRow, BlockTimestamp, MethodName};
use crate::types::contract::{ActionRecord, DeploymentRecord};
use crate::types::holdings::{FtHolding, FtMetadata, NftHolding, NftMetadata, TokenContracts};

/// Kind of a receipt action (subset of the indexer's `action_kind`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// `DEPLOY_CONTRACT`
    DeployContract,
    /// `FUNCTION_CALL`
    FunctionCall,
    /// `TRANSFER`
    Transfer,
}

/// Execution outcome status of a receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// Succeeded with a value
    SuccessValue,
    /// Succeeded by spawning a receipt
    SuccessReceiptId,
    /// Failed
    Failure,
    /// Not yet executed
    Unknown,
}

impl ExecutionStatus {
    /// True for either success status.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::SuccessValue | Self::SuccessReceiptId)
    }
}

/// One action of a receipt together with its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptAction {
    /// Account the receipt is addressed to
    pub receiver_account_id: String,
    /// Account that sent the receipt
    pub predecessor_account_id: String,
    /// Originating transaction
    pub transaction_hash: String,
    /// Block timestamp of the receipt
    pub block_timestamp: BlockTimestamp,
    /// Action kind
    pub kind: ActionKind,
    /// Execution outcome
    pub status: ExecutionStatus,
    /// Method name for function calls
    #[serde(default)]
    pub method_name: Option<String>,
    /// JSON arguments for function calls
    #[serde(default)]
    pub args: Value,
}

impl ReceiptAction {
    /// Successful `DEPLOY_CONTRACT` sent by the receiver itself.
    pub fn deploy(receiver: &str, transaction_hash: &str, block_timestamp: i64) -> Self {
        Self {
            receiver_account_id: receiver.to_string(),
            predecessor_account_id: receiver.to_string(),
            transaction_hash: transaction_hash.to_string(),
            block_timestamp: BlockTimestamp(block_timestamp),
            kind: ActionKind::DeployContract,
            status: ExecutionStatus::SuccessValue,
            method_name: None,
            args: Value::Null,
        }
    }

    /// Successful `FUNCTION_CALL` of `method` on `receiver` by `caller`.
    pub fn function_call(
        receiver: &str,
        caller: &str,
        method: &str,
        args: Value,
        transaction_hash: &str,
        block_timestamp: i64,
    ) -> Self {
        Self {
            receiver_account_id: receiver.to_string(),
            predecessor_account_id: caller.to_string(),
            transaction_hash: transaction_hash.to_string(),
            block_timestamp: BlockTimestamp(block_timestamp),
            kind: ActionKind::FunctionCall,
            status: ExecutionStatus::SuccessValue,
            method_name: Some(method.to_string()),
            args,
        }
    }

    /// Same action with a failed outcome.
    #[must_use]
    pub fn failed(mut self) -> Self {
        self.status = ExecutionStatus::Failure;
        self
    }
}

/// Token event linking a contract to an affected account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEvent {
    /// Token contract
    pub contract_account_id: String,
    /// Account whose balance changed
    pub affected_account_id: String,
}

/// [`AccountRepository`] answering from fixture data held in memory.
///
/// # Example
///
/// ```rust
/// use nearscan::db::{AccountRepository, MemoryRepository, ReceiptAction};
///
/// # tokio_test_block_on(async {
/// let repo = MemoryRepository::new()
///     .with_action(ReceiptAction::deploy("alice.near", "tx1", 100))
///     .with_action(ReceiptAction::deploy("alice.near", "tx2", 300).failed())
///     .with_action(ReceiptAction::deploy("alice.near", "tx3", 500));
///
/// let deployments = repo.first_last_deployments(&"alice.near".parse().unwrap()).await.unwrap();
/// assert_eq!(deployments.len(), 2);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryRepository {
    accounts: HashMap<String, AccountRow>,
    actions: Vec<ReceiptAction>,
    ft_changes: Vec<FtBalanceChange>,
    ft_metadata: HashMap<String, FtMetadata>,
    nft_holdings: Vec<NftHoldingRow>,
    nft_metadata: HashMap<String, NftMetadata>,
    ft_events: Vec<TokenEvent>,
    nft_events: Vec<TokenEvent>,
}

impl MemoryRepository {
    /// Empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON fixture file with the same shape this type serializes to.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            name: "NEARSCAN_FIXTURES",
            reason,
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| invalid(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text).map_err(|e| invalid(format!("{}: {e}", path.display())))
    }

    /// Adds (or replaces) an account identity row.
    #[must_use]
    pub fn with_account(mut self, row: AccountRow) -> Self {
        self.accounts.insert(row.account_id.to_string(), row);
        self
    }

    /// Adds a receipt action.
    #[must_use]
    pub fn with_action(mut self, action: ReceiptAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Adds a fungible balance change.
    #[must_use]
    pub fn with_ft_change(mut self, change: FtBalanceChange) -> Self {
        self.ft_changes.push(change);
        self
    }

    /// Sets fungible metadata for `contract`.
    #[must_use]
    pub fn with_ft_metadata(mut self, contract: &str, metadata: FtMetadata) -> Self {
        self.ft_metadata.insert(contract.to_string(), metadata);
        self
    }

    /// Adds an NFT holding row.
    #[must_use]
    pub fn with_nft_holding(mut self, row: NftHoldingRow) -> Self {
        self.nft_holdings.push(row);
        self
    }

    /// Sets NFT metadata for `contract`.
    #[must_use]
    pub fn with_nft_metadata(mut self, contract: &str, metadata: NftMetadata) -> Self {
        self.nft_metadata.insert(contract.to_string(), metadata);
        self
    }

    /// Records a fungible token event for `account` on `contract`.
    #[must_use]
    pub fn with_ft_event(mut self, contract: &str, account: &str) -> Self {
        self.ft_events.push(TokenEvent {
            contract_account_id: contract.to_string(),
            affected_account_id: account.to_string(),
        });
        self
    }

    /// Records an NFT event for `account` on `contract`.
    #[must_use]
    pub fn with_nft_event(mut self, contract: &str, account: &str) -> Self {
        self.nft_events.push(TokenEvent {
            contract_account_id: contract.to_string(),
            affected_account_id: account.to_string(),
        });
        self
    }

    fn successful<'a>(
        &'a self,
        account_id: &'a AccountId,
        kind: ActionKind,
    ) -> impl Iterator<Item = &'a ReceiptAction> + 'a {
        self.actions.iter().filter(move |action| {
            action.receiver_account_id == account_id.as_str()
                && action.kind == kind
                && action.status.is_success()
        })
    }
}

fn distinct_contracts(events: &[TokenEvent], account_id: &AccountId) -> Vec<String> {
    events
        .iter()
        .filter(|event| event.affected_account_id == account_id.as_str())
        .map(|event| event.contract_account_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[async_trait]
impl AccountRepository for MemoryRepository {
    async fn account(&self, account_id: &AccountId) -> Result<Option<AccountRow>, DatabaseError> {
        Ok(self.accounts.get(account_id.as_str()).cloned())
    }

    async fn first_last_deployments(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<DeploymentRecord>, DatabaseError> {
        let deployments = self
            .successful(account_id, ActionKind::DeployContract)
            .map(|action| DeploymentRecord {
                transaction_hash: action.transaction_hash.clone(),
                block_timestamp: action.block_timestamp,
                predecessor_account_id: action.predecessor_account_id.clone(),
            })
            .collect();
        Ok(first_and_last(deployments))
    }

    async fn ft_holdings(&self, account_id: &AccountId) -> Result<Vec<FtHolding>, DatabaseError> {
        Ok(aggregate_fungible(&self.ft_changes, account_id, &self.ft_metadata))
    }

    async fn nft_holdings(&self, account_id: &AccountId) -> Result<Vec<NftHolding>, DatabaseError> {
        Ok(order_non_fungible(&self.nft_holdings, account_id, &self.nft_metadata))
    }

    async fn token_contracts(
        &self,
        account_id: &AccountId,
    ) -> Result<TokenContracts, DatabaseError> {
        Ok(TokenContracts {
            fts: distinct_contracts(&self.ft_events, account_id),
            nfts: distinct_contracts(&self.nft_events, account_id),
        })
    }

    async fn latest_action(
        &self,
        account_id: &AccountId,
        method: &MethodName,
    ) -> Result<Option<ActionRecord>, DatabaseError> {
        let latest = self
            .successful(account_id, ActionKind::FunctionCall)
            .filter(|action| action.method_name.as_deref() == Some(method.as_str()))
            .max_by_key(|action| action.block_timestamp);

        Ok(latest.map(|action| ActionRecord {
            transaction_hash: action.transaction_hash.clone(),
            block_timestamp: action.block_timestamp,
            predecessor_account_id: action.predecessor_account_id.clone(),
            method_name: method.to_string(),
            args: action.args.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
