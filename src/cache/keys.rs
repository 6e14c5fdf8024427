// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cache key construction.
//!
//! Keys are plain strings of the form `account:<id>[:<resource>[:<extra>]]` so
//! they read the same in an external store as in logs.

use std::fmt;

use crate::types::account::AccountId;

/// Per-account resources that are cached independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountResource {
    /// Database identity row
    Identity,
    /// RPC `view_account`
    View,
    /// RPC `view_code`
    Code,
    /// RPC `view_access_key_list`
    AccessKeys,
    /// First/last deployment query
    Deployments,
    /// FT + NFT holdings
    Inventory,
    /// Token contracts the account has events on
    Tokens,
    /// Latest function-call action for a method
    Action,
}

impl AccountResource {
    /// Key segment for this resource, `None` for the bare identity key.
    pub fn segment(&self) -> Option<&'static str> {
        match self {
            Self::Identity => None,
            Self::View => Some("view"),
            Self::Code => Some("code"),
            Self::AccessKeys => Some("keys"),
            Self::Deployments => Some("deployments"),
            Self::Inventory => Some("inventory"),
            Self::Tokens => Some("tokens"),
            Self::Action => Some("action"),
        }
    }
}

/// Opaque cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wraps an arbitrary key string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key for one resource of an account, e.g. `account:alice.near:inventory`.
    pub fn account(account_id: &AccountId, resource: AccountResource) -> Self {
        match resource.segment() {
            Some(segment) => Self(format!("account:{account_id}:{segment}")),
            None => Self(format!("account:{account_id}")),
        }
    }

    /// Appends a further `:segment` (e.g. a method name).
    #[must_use]
    pub fn with_segment(mut self, segment: &str) -> Self {
        self.0.push(':');
        self.0.push_str(segment);
        self
    }

    /// The key as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
