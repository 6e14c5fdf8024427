// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Account repository trait

use async_trait::async_trait;

use crate::errors::DatabaseError;
use crate::types::account::{AccountId, AccountRow, MethodName};
use crate::types::contract::{ActionRecord, DeploymentRecord};
use crate::types::holdings::{FtHolding, NftHolding, TokenContracts};

/// Read access to the indexer database for one account at a time.
///
/// Errors propagate: the API answers them with a server error and the cache
/// never stores them.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Identity row, `None` if the indexer has never seen the account.
    async fn account(&self, account_id: &AccountId) -> Result<Option<AccountRow>, DatabaseError>;

    /// First and most recent successful deployment (0, 1 or 2 records,
    /// ascending by time).
    async fn first_last_deployments(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<DeploymentRecord>, DatabaseError>;

    /// Positive fungible balances, largest first.
    async fn ft_holdings(&self, account_id: &AccountId) -> Result<Vec<FtHolding>, DatabaseError>;

    /// NFT holdings, largest quantity first.
    async fn nft_holdings(&self, account_id: &AccountId) -> Result<Vec<NftHolding>, DatabaseError>;

    /// Token contracts with events touching the account.
    async fn token_contracts(
        &self,
        account_id: &AccountId,
    ) -> Result<TokenContracts, DatabaseError>;

    /// Latest successful call of `method` on the account's contract.
    async fn latest_action(
        &self,
        account_id: &AccountId,
        method: &MethodName,
    ) -> Result<Option<ActionRecord>, DatabaseError>;

    /// Returns a human-readable name for this backend, used in logs
    fn name(&self) -> &'static str;
}
