// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Default values

use std::time::Duration;

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Default cache lifetimes per resource
pub mod ttl {
    use super::Duration;

    /// Indexer identity row
    pub const ACCOUNT: Duration = Duration::from_secs(15);
    /// RPC `view_account` (balances move quickly)
    pub const ACCOUNT_VIEW: Duration = Duration::from_secs(5);
    /// RPC `view_code`
    pub const CODE: Duration = Duration::from_secs(15);
    /// RPC `view_access_key_list`
    pub const ACCESS_KEYS: Duration = Duration::from_secs(5);
    /// First/last deployments
    pub const DEPLOYMENTS: Duration = Duration::from_secs(15);
    /// FT + NFT holdings
    pub const INVENTORY: Duration = Duration::from_secs(5);
    /// Token contract lists
    pub const TOKENS: Duration = Duration::from_secs(10);
    /// Latest action per method
    pub const ACTION: Duration = Duration::from_secs(1);
}
