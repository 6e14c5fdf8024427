// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Contract code and access key views

use serde::{Deserialize, Serialize};

use super::account::{AccountId, BlockTimestamp};

/// Result of the RPC `view_code` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCodeView {
    /// Base64-encoded WASM
    pub code_base64: String,
    /// Code hash (base58)
    pub hash: String,
}

/// Permission attached to an access key
///
/// Mirrors the RPC encoding: `"FullAccess"` or
/// `{"FunctionCall": {"allowance": ..., "receiver_id": ..., "method_names": [...]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessKeyPermission {
    /// Key can sign any transaction for the account
    FullAccess,
    /// Key is restricted to calls on one contract
    FunctionCall {
        /// Remaining gas allowance in yoctoNEAR, `None` for unlimited
        allowance: Option<String>,
        /// Contract the key may call
        receiver_id: String,
        /// Methods the key may call (empty = any)
        #[serde(default)]
        method_names: Vec<String>,
    },
}

impl AccessKeyPermission {
    /// True for a full-access key.
    pub fn is_full_access(&self) -> bool {
        matches!(self, AccessKeyPermission::FullAccess)
    }
}

/// Access key body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKey {
    /// Key nonce
    pub nonce: u64,
    /// What the key may do
    pub permission: AccessKeyPermission,
}

/// One entry of `view_access_key_list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessKeyInfo {
    /// Public key (`ed25519:...`)
    pub public_key: String,
    /// Key details
    pub access_key: AccessKey,
}

/// Result of the RPC `view_access_key_list` query
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessKeyList {
    /// All keys on the account
    pub keys: Vec<AccessKeyInfo>,
}

impl AccessKeyList {
    /// A contract is locked when no full-access key remains on the account.
    ///
    /// With no full-access key nobody can redeploy the code, so the contract
    /// can only change through its own methods.
    pub fn is_locked(&self) -> bool {
        !self
            .keys
            .iter()
            .any(|key| key.access_key.permission.is_full_access())
    }
}

/// `contract` response item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    /// Account the contract lives on
    pub account_id: AccountId,
    /// Code hash
    pub code_hash: String,
    /// Size of the WASM in bytes (decoded length of `code_base64`)
    pub code_size: usize,
    /// `Some(true)` when no full-access key exists, `None` if keys were unavailable
    pub locked: Option<bool>,
}

impl ContractInfo {
    /// Shapes the RPC views into a response item.
    pub fn new(
        account_id: &AccountId,
        code: &ContractCodeView,
        keys: Option<&AccessKeyList>,
    ) -> Self {
        Self {
            account_id: account_id.clone(),
            code_hash: code.hash.clone(),
            code_size: base64_decoded_len(&code.code_base64),
            locked: keys.map(AccessKeyList::is_locked),
        }
    }
}

/// Decoded byte length of a padded base64 string.
fn base64_decoded_len(encoded: &str) -> usize {
    let trimmed = encoded.trim_end();
    let padding = trimmed.bytes().rev().take_while(|b| *b == b'=').count();
    (trimmed.len() / 4 * 3).saturating_sub(padding)
}

/// A successful contract deployment, one row of the first/last deployment query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Transaction that carried the deploy action
    pub transaction_hash: String,
    /// Block timestamp of the deploy receipt
    pub block_timestamp: BlockTimestamp,
    /// Account that sent the deploy receipt
    pub predecessor_account_id: String,
}

/// Latest successful call of a method on an account's contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Transaction hash
    pub transaction_hash: String,
    /// Block timestamp
    pub block_timestamp: BlockTimestamp,
    /// Caller
    pub predecessor_account_id: String,
    /// Method called
    pub method_name: String,
    /// JSON arguments, `null` if not JSON
    pub args: serde_json::Value,
}
