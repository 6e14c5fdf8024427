// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! SQL templates for the indexer database
//!
//! Templates use `:name` markers and are bound with
//! [`QueryTemplate::bind`](crate::QueryTemplate::bind). They target the NEAR
//! Indexer for Explorer schema (`accounts`, `receipts`,
//! `action_receipt_actions`, `execution_outcomes`) plus the token tables
//! `ft_holders`, `nft_holders`, `ft_meta`, `nft_meta`, `ft_events` and
//! `nft_events`.
//!
//! Nanosecond timestamps are `NUMERIC(20, 0)` in the schema and are cast to
//! `BIGINT`; fungible sums are cast to `TEXT` to keep full precision.

use crate::errors::QueryError;
use crate::query::{NamedParams, QueryTemplate, SqlValue};
use crate::types::account::{AccountId, MethodName};

// Expands to a literal so templates can splice it in with `concat!`.
macro_rules! success_statuses {
    () => {
        "('SUCCESS_VALUE', 'SUCCESS_RECEIPT_ID')"
    };
}

/// Execution statuses that count as success.
pub const SUCCESS_STATUSES: &str = success_statuses!();

/// Account identity with creating and deleting transactions.
pub const ACCOUNT: &str = "
SELECT
  a.account_id,
  created.originated_from_transaction_hash AS created_by_transaction_hash,
  created.included_in_block_timestamp::BIGINT AS created_at,
  deleted.originated_from_transaction_hash AS deleted_by_transaction_hash,
  deleted.included_in_block_timestamp::BIGINT AS deleted_at
FROM accounts a
LEFT JOIN receipts created ON created.receipt_id = a.created_by_receipt_id
LEFT JOIN receipts deleted ON deleted.receipt_id = a.deleted_by_receipt_id
WHERE a.account_id = :account_id
LIMIT 1";

/// First and most recent successful deployment.
///
/// Ranks successful `DEPLOY_CONTRACT` actions by time and keeps rank 1 and
/// rank N. With one deployment the row matches both predicates and is
/// returned once.
pub const FIRST_LAST_DEPLOYMENTS: &str = concat!(
    "
SELECT transaction_hash, block_timestamp, predecessor_account_id
FROM (
  SELECT
    r.originated_from_transaction_hash AS transaction_hash,
    r.included_in_block_timestamp::BIGINT AS block_timestamp,
    r.predecessor_account_id,
    ROW_NUMBER() OVER (ORDER BY r.included_in_block_timestamp ASC, r.receipt_id ASC) AS rank,
    COUNT(*) OVER () AS total
  FROM action_receipt_actions ara
  JOIN receipts r ON r.receipt_id = ara.receipt_id
  JOIN execution_outcomes eo ON eo.receipt_id = ara.receipt_id
  WHERE ara.receipt_receiver_account_id = :account_id
    AND ara.action_kind = 'DEPLOY_CONTRACT'
    AND eo.status IN ",
    success_statuses!(),
    "
) ranked
WHERE rank = 1 OR rank = total
ORDER BY block_timestamp ASC"
);

/// Positive fungible balances with contract metadata.
///
/// `ft_holders` holds per-period balance changes; they are summed per
/// `(contract, account)`. The metadata join is an inner lateral join, so
/// holdings on contracts without metadata are dropped.
pub const FT_INVENTORY: &str = "
SELECT
  fh.contract,
  fh.amount::TEXT AS amount,
  fm.ft_meta
FROM (
  SELECT contract, account, SUM(amount) AS amount
  FROM ft_holders
  WHERE account = :account_id
  GROUP BY contract, account
  HAVING SUM(amount) > 0
) fh
INNER JOIN LATERAL (
  SELECT json_build_object(
    'name', m.name,
    'symbol', m.symbol,
    'decimals', m.decimals,
    'icon', m.icon,
    'reference', m.reference
  ) AS ft_meta
  FROM ft_meta m
  WHERE m.contract = fh.contract
  LIMIT 1
) fm ON TRUE
ORDER BY fh.amount DESC, fh.contract ASC";

/// NFT holdings with contract metadata, largest quantity first.
pub const NFT_INVENTORY: &str = "
SELECT
  nh.contract,
  nh.quantity::BIGINT AS quantity,
  nm.nft_meta
FROM nft_holders nh
INNER JOIN LATERAL (
  SELECT json_build_object(
    'name', m.name,
    'symbol', m.symbol,
    'icon', m.icon,
    'base_uri', m.base_uri,
    'reference', m.reference
  ) AS nft_meta
  FROM nft_meta m
  WHERE m.contract = nh.contract
  LIMIT 1
) nm ON TRUE
WHERE nh.account = :account_id
ORDER BY nh.quantity DESC, nh.contract ASC";

/// Fungible token contracts with events touching the account.
pub const FT_TOKEN_CONTRACTS: &str = "
SELECT DISTINCT contract_account_id
FROM ft_events
WHERE affected_account_id = :account_id
ORDER BY contract_account_id";

/// NFT contracts with events touching the account.
pub const NFT_TOKEN_CONTRACTS: &str = "
SELECT DISTINCT contract_account_id
FROM nft_events
WHERE affected_account_id = :account_id
ORDER BY contract_account_id";

/// Latest successful call of `:method` on the account's contract.
pub const LATEST_ACTION: &str = concat!(
    "
SELECT
  r.originated_from_transaction_hash AS transaction_hash,
  r.included_in_block_timestamp::BIGINT AS block_timestamp,
  r.predecessor_account_id,
  ara.args ->> 'method_name' AS method_name,
  ara.args -> 'args_json' AS args
FROM action_receipt_actions ara
JOIN receipts r ON r.receipt_id = ara.receipt_id
JOIN execution_outcomes eo ON eo.receipt_id = ara.receipt_id
WHERE ara.receipt_receiver_account_id = :account_id
  AND ara.action_kind = 'FUNCTION_CALL'
  AND ara.args ->> 'method_name' = :method
  AND eo.status IN ",
    success_statuses!(),
    "
ORDER BY r.included_in_block_timestamp DESC
LIMIT 1"
);

/// Every template, parsed once.
#[derive(Debug, Clone)]
pub struct Statements {
    /// [`ACCOUNT`]
    pub account: QueryTemplate,
    /// [`FIRST_LAST_DEPLOYMENTS`]
    pub first_last_deployments: QueryTemplate,
    /// [`FT_INVENTORY`]
    pub ft_inventory: QueryTemplate,
    /// [`NFT_INVENTORY`]
    pub nft_inventory: QueryTemplate,
    /// [`FT_TOKEN_CONTRACTS`]
    pub ft_token_contracts: QueryTemplate,
    /// [`NFT_TOKEN_CONTRACTS`]
    pub nft_token_contracts: QueryTemplate,
    /// [`LATEST_ACTION`]
    pub latest_action: QueryTemplate,
}

impl Statements {
    /// Parses all templates.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Unterminated`] if a template is malformed.
    pub fn parse() -> Result<Self, QueryError> {
        Ok(Self {
            account: QueryTemplate::parse(ACCOUNT)?,
            first_last_deployments: QueryTemplate::parse(FIRST_LAST_DEPLOYMENTS)?,
            ft_inventory: QueryTemplate::parse(FT_INVENTORY)?,
            nft_inventory: QueryTemplate::parse(NFT_INVENTORY)?,
            ft_token_contracts: QueryTemplate::parse(FT_TOKEN_CONTRACTS)?,
            nft_token_contracts: QueryTemplate::parse(NFT_TOKEN_CONTRACTS)?,
            latest_action: QueryTemplate::parse(LATEST_ACTION)?,
        })
    }
}

/// Parameters for the per-account queries (`:account_id`).
#[derive(Debug, Clone, Copy)]
pub struct AccountParams<'a> {
    /// Account the query is about
    pub account_id: &'a AccountId,
}

impl NamedParams for AccountParams<'_> {
    fn lookup(&self, name: &str) -> Option<SqlValue> {
        match name {
            "account_id" => Some(self.account_id.as_str().into()),
            _ => None,
        }
    }
}

/// Parameters for [`LATEST_ACTION`] (`:account_id`, `:method`).
#[derive(Debug, Clone, Copy)]
pub struct ActionParams<'a> {
    /// Contract account
    pub account_id: &'a AccountId,
    /// Method name
    pub method: &'a MethodName,
}

impl NamedParams for ActionParams<'_> {
    fn lookup(&self, name: &str) -> Option<SqlValue> {
        match name {
            "account_id" => Some(self.account_id.as_str().into()),
            "method" => Some(self.method.as_str().into()),
            _ => None,
        }
    }
}
