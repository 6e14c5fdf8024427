// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! PostgreSQL-backed account repository

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use deadpool_postgres::Pool;
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;
use tracing::{Instrument, Span};

use super::config::DbConfig;
use super::queries::{AccountParams, ActionParams, Statements};
use super::repository::AccountRepository;
use crate::errors::DatabaseError;
use crate::query::{NamedParams, QueryTemplate};
use crate::tracing::spans;
use crate::types::account::{AccountId, AccountRow, BlockTimestamp, MethodName};
use crate::types::contract::{ActionRecord, DeploymentRecord};
use crate::types::holdings::{FtHolding, FtMetadata, NftHolding, NftMetadata, TokenContracts};

/// [`AccountRepository`] over a deadpool-managed PostgreSQL pool.
///
/// Templates are parsed once at construction; each call binds, prepares
/// (cached per connection) and executes.
#[derive(Clone)]
pub struct PgRepository {
    pool: Pool,
    statements: Arc<Statements>,
}

impl PgRepository {
    /// Wraps an existing pool.
    pub fn new(pool: Pool) -> Result<Self, DatabaseError> {
        Ok(Self {
            pool,
            statements: Arc::new(Statements::parse()?),
        })
    }

    /// Creates the pool from `config`.
    pub fn from_config(config: &DbConfig) -> Result<Self, DatabaseError> {
        Self::new(config.create_pool()?)
    }

    /// Current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    async fn query(
        &self,
        name: &'static str,
        template: &QueryTemplate,
        params: &impl NamedParams,
    ) -> Result<Vec<Row>, DatabaseError> {
        let bound = template.bind(params)?;
        let conn = self.pool.get().await?;
        let statement = conn
            .prepare_cached(bound.text())
            .await
            .map_err(|e| DatabaseError::query(name, e))?;
        let rows = conn
            .query(&statement, &bound.params())
            .await
            .map_err(|e| DatabaseError::query(name, e))?;

        Span::current().record("rows", rows.len() as u64);
        Ok(rows)
    }
}

fn column<'a, T: FromSql<'a>>(
    row: &'a Row,
    query: &'static str,
    name: &str,
) -> Result<T, DatabaseError> {
    row.try_get(name).map_err(|e| DatabaseError::query(query, e))
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &Row,
    query: &'static str,
    name: &str,
) -> Result<T, DatabaseError> {
    let value: serde_json::Value = column(row, query, name)?;
    serde_json::from_value(value)
        .map_err(|e| DatabaseError::row_shape(query, format!("column {name}: {e}")))
}

const ACCOUNT: &str = "account";
const FIRST_LAST_DEPLOYMENTS: &str = "first_last_deployments";
const FT_INVENTORY: &str = "ft_inventory";
const NFT_INVENTORY: &str = "nft_inventory";
const FT_TOKEN_CONTRACTS: &str = "ft_token_contracts";
const NFT_TOKEN_CONTRACTS: &str = "nft_token_contracts";
const LATEST_ACTION: &str = "latest_action";

fn account_row(row: &Row) -> Result<AccountRow, DatabaseError> {
    let account_id: String = column(row, ACCOUNT, "account_id")?;
    let created_at: Option<i64> = column(row, ACCOUNT, "created_at")?;
    let deleted_at: Option<i64> = column(row, ACCOUNT, "deleted_at")?;

    Ok(AccountRow {
        account_id: account_id.parse().map_err(|e| {
            DatabaseError::row_shape(ACCOUNT, format!("account_id {account_id:?}: {e}"))
        })?,
        created_by_transaction_hash: column(row, ACCOUNT, "created_by_transaction_hash")?,
        created_at: created_at.map(BlockTimestamp),
        deleted_by_transaction_hash: column(row, ACCOUNT, "deleted_by_transaction_hash")?,
        deleted_at: deleted_at.map(BlockTimestamp),
    })
}

fn deployment_row(row: &Row) -> Result<DeploymentRecord, DatabaseError> {
    Ok(DeploymentRecord {
        transaction_hash: column(row, FIRST_LAST_DEPLOYMENTS, "transaction_hash")?,
        block_timestamp: BlockTimestamp(column(row, FIRST_LAST_DEPLOYMENTS, "block_timestamp")?),
        predecessor_account_id: column(row, FIRST_LAST_DEPLOYMENTS, "predecessor_account_id")?,
    })
}

fn ft_row(row: &Row) -> Result<FtHolding, DatabaseError> {
    let amount: String = column(row, FT_INVENTORY, "amount")?;
    Ok(FtHolding {
        contract: column(row, FT_INVENTORY, "contract")?,
        amount: BigDecimal::from_str(&amount).map_err(|e| {
            DatabaseError::row_shape(FT_INVENTORY, format!("amount {amount:?}: {e}"))
        })?,
        ft_meta: json_column::<FtMetadata>(row, FT_INVENTORY, "ft_meta")?,
    })
}

fn nft_row(row: &Row) -> Result<NftHolding, DatabaseError> {
    Ok(NftHolding {
        contract: column(row, NFT_INVENTORY, "contract")?,
        quantity: column(row, NFT_INVENTORY, "quantity")?,
        nft_meta: json_column::<NftMetadata>(row, NFT_INVENTORY, "nft_meta")?,
    })
}

fn action_row(row: &Row) -> Result<ActionRecord, DatabaseError> {
    let args: Option<serde_json::Value> = column(row, LATEST_ACTION, "args")?;
    Ok(ActionRecord {
        transaction_hash: column(row, LATEST_ACTION, "transaction_hash")?,
        block_timestamp: BlockTimestamp(column(row, LATEST_ACTION, "block_timestamp")?),
        predecessor_account_id: column(row, LATEST_ACTION, "predecessor_account_id")?,
        method_name: column(row, LATEST_ACTION, "method_name")?,
        args: args.unwrap_or(serde_json::Value::Null),
    })
}

impl PgRepository {
    async fn load_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<AccountRow>, DatabaseError> {
        let params = AccountParams { account_id };
        let rows = self.query(ACCOUNT, &self.statements.account, &params).await?;
        rows.first().map(account_row).transpose()
    }

    async fn load_deployments(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<DeploymentRecord>, DatabaseError> {
        let params = AccountParams { account_id };
        let rows = self
            .query(FIRST_LAST_DEPLOYMENTS, &self.statements.first_last_deployments, &params)
            .await?;
        if rows.len() > 2 {
            return Err(DatabaseError::row_shape(
                FIRST_LAST_DEPLOYMENTS,
                format!("expected at most 2 rows, got {}", rows.len()),
            ));
        }
        rows.iter().map(deployment_row).collect()
    }

    async fn load_ft_holdings(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<FtHolding>, DatabaseError> {
        let params = AccountParams { account_id };
        let rows = self
            .query(FT_INVENTORY, &self.statements.ft_inventory, &params)
            .await?;
        rows.iter().map(ft_row).collect()
    }

    async fn load_nft_holdings(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<NftHolding>, DatabaseError> {
        let params = AccountParams { account_id };
        let rows = self
            .query(NFT_INVENTORY, &self.statements.nft_inventory, &params)
            .await?;
        rows.iter().map(nft_row).collect()
    }

    async fn load_contract_ids(
        &self,
        query: &'static str,
        template: &QueryTemplate,
        account_id: &AccountId,
    ) -> Result<Vec<String>, DatabaseError> {
        let rows = self.query(query, template, &AccountParams { account_id }).await?;
        rows.iter()
            .map(|row| column(row, query, "contract_account_id"))
            .collect()
    }

    async fn load_latest_action(
        &self,
        account_id: &AccountId,
        method: &MethodName,
    ) -> Result<Option<ActionRecord>, DatabaseError> {
        let params = ActionParams { account_id, method };
        let rows = self
            .query(LATEST_ACTION, &self.statements.latest_action, &params)
            .await?;
        rows.first().map(action_row).transpose()
    }
}

#[async_trait]
impl AccountRepository for PgRepository {
    async fn account(&self, account_id: &AccountId) -> Result<Option<AccountRow>, DatabaseError> {
        self.load_account(account_id)
            .instrument(spans::db_query(ACCOUNT, account_id))
            .await
    }

    async fn first_last_deployments(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<DeploymentRecord>, DatabaseError> {
        self.load_deployments(account_id)
            .instrument(spans::db_query(FIRST_LAST_DEPLOYMENTS, account_id))
            .await
    }

    async fn ft_holdings(&self, account_id: &AccountId) -> Result<Vec<FtHolding>, DatabaseError> {
        self.load_ft_holdings(account_id)
            .instrument(spans::db_query(FT_INVENTORY, account_id))
            .await
    }

    async fn nft_holdings(&self, account_id: &AccountId) -> Result<Vec<NftHolding>, DatabaseError> {
        self.load_nft_holdings(account_id)
            .instrument(spans::db_query(NFT_INVENTORY, account_id))
            .await
    }

    async fn token_contracts(
        &self,
        account_id: &AccountId,
    ) -> Result<TokenContracts, DatabaseError> {
        let statements = &self.statements;
        let fts = self
            .load_contract_ids(FT_TOKEN_CONTRACTS, &statements.ft_token_contracts, account_id)
            .instrument(spans::db_query(FT_TOKEN_CONTRACTS, account_id));
        let nfts = self
            .load_contract_ids(NFT_TOKEN_CONTRACTS, &statements.nft_token_contracts, account_id)
            .instrument(spans::db_query(NFT_TOKEN_CONTRACTS, account_id));

        let (fts, nfts) = tokio::try_join!(fts, nfts)?;
        Ok(TokenContracts { fts, nfts })
    }

    async fn latest_action(
        &self,
        account_id: &AccountId,
        method: &MethodName,
    ) -> Result<Option<ActionRecord>, DatabaseError> {
        self.load_latest_action(account_id, method)
            .instrument(spans::db_query(LATEST_ACTION, account_id))
            .await
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
