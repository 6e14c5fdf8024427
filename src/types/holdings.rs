// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Token holdings and token metadata

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Fungible token metadata (NEP-148 subset)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtMetadata {
    /// Token name
    pub name: String,
    /// Ticker
    pub symbol: String,
    /// Decimals of the smallest unit
    pub decimals: u8,
    /// Data URL icon
    #[serde(default)]
    pub icon: Option<String>,
    /// Off-chain reference
    #[serde(default)]
    pub reference: Option<String>,
}

/// NFT contract metadata (NEP-177 subset)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMetadata {
    /// Collection name
    pub name: String,
    /// Collection symbol
    pub symbol: String,
    /// Data URL icon
    #[serde(default)]
    pub icon: Option<String>,
    /// Base URI for token media
    #[serde(default)]
    pub base_uri: Option<String>,
    /// Off-chain reference
    #[serde(default)]
    pub reference: Option<String>,
}

/// Positive fungible balance held on one contract
///
/// `amount` is the signed sum of all recorded balance changes, in the token's
/// smallest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtHolding {
    /// Token contract
    pub contract: String,
    /// Net balance
    pub amount: BigDecimal,
    /// Contract metadata
    pub ft_meta: FtMetadata,
}

/// Number of NFTs held on one contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftHolding {
    /// NFT contract
    pub contract: String,
    /// Tokens held
    pub quantity: i64,
    /// Contract metadata
    pub nft_meta: NftMetadata,
}

/// `inventory` response item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// Fungible holdings, largest balance first
    pub fts: Vec<FtHolding>,
    /// NFT holdings, largest quantity first
    pub nfts: Vec<NftHolding>,
}

/// `tokens` response item: contracts the account has token events on
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenContracts {
    /// Fungible token contracts
    pub fts: Vec<String>,
    /// NFT contracts
    pub nfts: Vec<String>,
}
