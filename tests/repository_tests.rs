// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the in-memory account repository
//!
//! The memory backend answers the same questions as the indexer queries, so
//! these tests pin down the query semantics: success-only deployments reduced
//! to first and last, positive fungible sums joined with metadata, and the
//! latest successful call per method.

mod helpers;

use std::io::Write;

use bigdecimal::BigDecimal;
use helpers::{account, sample_repository};
use nearscan::db::{AccountRepository, MemoryRepository, ReceiptAction};
use nearscan::{BlockTimestamp, MethodName};

#[tokio::test]
async fn test_known_and_unknown_accounts() {
    let repo = sample_repository();

    let row = repo.account(&account("alice.near")).await.unwrap().unwrap();
    assert_eq!(row.created_by_transaction_hash.as_deref(), Some("CreateTx"));
    assert_eq!(row.deleted_at, None);

    assert_eq!(repo.account(&account("nobody.near")).await.unwrap(), None);
}

/// Failed deploys are ignored before picking first and last
#[tokio::test]
async fn test_deployments_are_first_and_last_successful() {
    let repo = sample_repository();
    let deployments = repo.first_last_deployments(&account("alice.near")).await.unwrap();

    let hashes: Vec<_> = deployments.iter().map(|d| d.transaction_hash.as_str()).collect();
    assert_eq!(hashes, ["Deploy1", "Deploy3"]);
    assert_eq!(deployments[0].block_timestamp, BlockTimestamp(100));
    assert_eq!(deployments[1].predecessor_account_id, "alice.near");
}

#[tokio::test]
async fn test_single_deployment_is_reported_once() {
    let repo = MemoryRepository::new().with_action(ReceiptAction::deploy("solo.near", "Only", 7));
    let deployments = repo.first_last_deployments(&account("solo.near")).await.unwrap();
    assert_eq!(deployments.len(), 1);

    let none = repo.first_last_deployments(&account("alice.near")).await.unwrap();
    assert!(none.is_empty());
}

/// Balances that net to zero are not holdings
#[tokio::test]
async fn test_fungible_holdings_sum_changes() {
    let repo = sample_repository();
    let fts = repo.ft_holdings(&account("alice.near")).await.unwrap();

    assert_eq!(fts.len(), 1);
    assert_eq!(fts[0].contract, "usdt.near");
    assert_eq!(fts[0].amount, BigDecimal::from(1000));
    assert_eq!(fts[0].ft_meta.symbol, "USDT");
}

#[tokio::test]
async fn test_nft_holdings_and_token_contracts() {
    let repo = sample_repository();
    let alice = account("alice.near");

    let nfts = repo.nft_holdings(&alice).await.unwrap();
    assert_eq!(nfts.len(), 1);
    assert_eq!(nfts[0].quantity, 3);
    assert_eq!(nfts[0].nft_meta.symbol, "PARAS");

    let tokens = repo.token_contracts(&alice).await.unwrap();
    assert_eq!(tokens.fts, ["usdt.near", "wrap.near"]);
    assert_eq!(tokens.nfts, ["paras.near"]);
}

#[tokio::test]
async fn test_latest_action_per_method() {
    let repo = sample_repository();
    let alice = account("alice.near");

    let method: MethodName = "set_greeting".parse().unwrap();
    let action = repo.latest_action(&alice, &method).await.unwrap().unwrap();
    assert_eq!(action.transaction_hash, "Call2");
    assert_eq!(action.predecessor_account_id, "carol.near");
    assert_eq!(action.args["greeting"], "hello");

    let other: MethodName = "ft_transfer".parse().unwrap();
    assert!(repo.latest_action(&alice, &other).await.unwrap().is_none());
}

/// Fixture files use the repository's own serialized shape
#[tokio::test]
async fn test_fixture_file_round_trip() {
    let original = sample_repository();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&original).unwrap().as_bytes())
        .unwrap();

    let loaded = MemoryRepository::from_json_file(file.path()).unwrap();
    let alice = account("alice.near");
    assert_eq!(
        loaded.first_last_deployments(&alice).await.unwrap(),
        original.first_last_deployments(&alice).await.unwrap()
    );
    assert_eq!(loaded.name(), "memory");
}

#[test]
fn test_fixture_file_errors_name_the_variable() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();

    let err = MemoryRepository::from_json_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("NEARSCAN_FIXTURES"));
}
