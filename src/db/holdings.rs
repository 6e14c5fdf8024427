// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Holdings aggregation
//!
//! In-process counterparts of [`FT_INVENTORY`](super::queries::FT_INVENTORY)
//! and [`NFT_INVENTORY`](super::queries::NFT_INVENTORY). Holdings on
//! contracts without metadata are dropped, matching the inner lateral join.

use std::collections::{BTreeMap, HashMap};

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::account::AccountId;
use crate::types::holdings::{FtHolding, FtMetadata, NftHolding, NftMetadata};

/// One per-period fungible balance change (a row of `ft_holders`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtBalanceChange {
    /// Token contract
    pub contract: String,
    /// Holder
    pub account: String,
    /// Signed change
    pub amount: BigDecimal,
}

/// Precomputed NFT count (a row of `nft_holders`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftHoldingRow {
    /// NFT contract
    pub contract: String,
    /// Holder
    pub account: String,
    /// Tokens held
    pub quantity: i64,
}

/// Sums `account`'s changes per contract and keeps strictly positive totals,
/// largest first.
pub fn aggregate_fungible<'a>(
    changes: impl IntoIterator<Item = &'a FtBalanceChange>,
    account: &AccountId,
    metadata: &HashMap<String, FtMetadata>,
) -> Vec<FtHolding> {
    let mut totals: BTreeMap<&str, BigDecimal> = BTreeMap::new();
    for change in changes {
        if change.account == account.as_str() {
            *totals
                .entry(change.contract.as_str())
                .or_insert_with(|| BigDecimal::from(0)) += &change.amount;
        }
    }

    let zero = BigDecimal::from(0);
    let mut holdings: Vec<FtHolding> = totals
        .into_iter()
        .filter(|(_, amount)| *amount > zero)
        .filter_map(|(contract, amount)| {
            metadata.get(contract).map(|meta| FtHolding {
                contract: contract.to_string(),
                amount,
                ft_meta: meta.clone(),
            })
        })
        .collect();

    holdings.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.contract.cmp(&b.contract)));
    holdings
}

/// `account`'s NFT holdings with metadata, largest quantity first.
pub fn order_non_fungible<'a>(
    rows: impl IntoIterator<Item = &'a NftHoldingRow>,
    account: &AccountId,
    metadata: &HashMap<String, NftMetadata>,
) -> Vec<NftHolding> {
    let mut holdings: Vec<NftHolding> = rows
        .into_iter()
        .filter(|row| row.account == account.as_str())
        .filter_map(|row| {
            metadata.get(&row.contract).map(|meta| NftHolding {
                contract: row.contract.clone(),
                quantity: row.quantity,
                nft_meta: meta.clone(),
            })
        })
        .collect();

    holdings.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.contract.cmp(&b.contract)));
    holdings
}
