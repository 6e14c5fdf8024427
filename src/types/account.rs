// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Account identifiers and account-level views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Validated NEAR account ID
///
/// Rules: 2 to 64 characters of `a-z`, `0-9` and the separators `-`, `_`, `.`;
/// a separator may not start or end the ID or follow another separator.
///
/// # Examples
///
/// ```
/// use nearscan::AccountId;
///
/// let id: AccountId = "alice.near".parse().unwrap();
/// assert_eq!(id.as_str(), "alice.near");
/// assert!("Alice.near".parse::<AccountId>().is_err());
/// assert!("a..near".parse::<AccountId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

/// Why an account ID or method name was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidIdentifier {
    /// Outside the permitted length range
    #[error("length {len} is outside {min}..={max}")]
    Length {
        /// Actual length in bytes
        len: usize,
        /// Minimum length
        min: usize,
        /// Maximum length
        max: usize,
    },
    /// Contains a disallowed character
    #[error("invalid character {ch:?} at position {position}")]
    Character {
        /// The offending character
        ch: char,
        /// Byte position
        position: usize,
    },
    /// Separator at the edge or doubled
    #[error("misplaced separator at position {position}")]
    Separator {
        /// Byte position
        position: usize,
    },
}

impl AccountId {
    /// Minimum account ID length
    pub const MIN_LEN: usize = 2;
    /// Maximum account ID length
    pub const MAX_LEN: usize = 64;

    /// The ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), InvalidIdentifier> {
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&id.len()) {
            return Err(InvalidIdentifier::Length {
                len: id.len(),
                min: Self::MIN_LEN,
                max: Self::MAX_LEN,
            });
        }

        let mut previous_was_separator = true;
        for (position, ch) in id.char_indices() {
            let is_separator = matches!(ch, '-' | '_' | '.');
            if is_separator {
                if previous_was_separator {
                    return Err(InvalidIdentifier::Separator { position });
                }
            } else if !(ch.is_ascii_lowercase() || ch.is_ascii_digit()) {
                return Err(InvalidIdentifier::Character { ch, position });
            }
            previous_was_separator = is_separator;
        }

        if previous_was_separator {
            return Err(InvalidIdentifier::Separator {
                position: id.len() - 1,
            });
        }
        Ok(())
    }
}

impl FromStr for AccountId {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::validate(&value)?;
        Ok(Self(value))
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated contract method name (`[A-Za-z0-9_]`, 1 to 256 chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MethodName(String);

impl MethodName {
    /// Maximum method name length
    pub const MAX_LEN: usize = 256;

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MethodName {
    type Err = InvalidIdentifier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > Self::MAX_LEN {
            return Err(InvalidIdentifier::Length {
                len: s.len(),
                min: 1,
                max: Self::MAX_LEN,
            });
        }
        if let Some((position, ch)) = s
            .char_indices()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '_'))
        {
            return Err(InvalidIdentifier::Character { ch, position });
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for MethodName {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MethodName> for String {
    fn from(name: MethodName) -> Self {
        name.0
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Block timestamp in nanoseconds since the Unix epoch
///
/// Serialized as a decimal string so JSON consumers with 53-bit numbers do not
/// lose precision; numbers are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BlockTimestamp(pub i64);

impl BlockTimestamp {
    /// Creates a timestamp from nanoseconds
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Nanoseconds since the Unix epoch
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// UTC date-time (nanosecond precision)
    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

impl fmt::Display for BlockTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for BlockTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BlockTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(i64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(nanos) => Ok(Self(nanos)),
            Repr::Text(text) => text.parse().map(Self).map_err(serde::de::Error::custom),
        }
    }
}

/// Account identity as recorded by the indexer database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRow {
    /// The account
    pub account_id: AccountId,
    /// Transaction that created the account, if known
    pub created_by_transaction_hash: Option<String>,
    /// Creation time, if known
    pub created_at: Option<BlockTimestamp>,
    /// Transaction that deleted the account, if deleted
    pub deleted_by_transaction_hash: Option<String>,
    /// Deletion time, if deleted
    pub deleted_at: Option<BlockTimestamp>,
}

/// Result of the RPC `view_account` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountView {
    /// Liquid balance in yoctoNEAR (decimal string)
    pub amount: String,
    /// Staked balance in yoctoNEAR (decimal string)
    pub locked: String,
    /// Hash of the deployed code, `11111111111111111111111111111111` when none
    pub code_hash: String,
    /// Bytes of storage used
    pub storage_usage: u64,
    /// Block height the view was taken at
    #[serde(default)]
    pub block_height: u64,
}

/// `account` response item: DB identity merged with the live RPC view
///
/// RPC-derived fields are `None` when the provider call failed; identity
/// fields are `None` when the indexer has no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// The account
    pub account_id: AccountId,
    /// Liquid balance (yoctoNEAR)
    pub amount: Option<String>,
    /// Staked balance (yoctoNEAR)
    pub locked: Option<String>,
    /// Code hash
    pub code_hash: Option<String>,
    /// Storage used
    pub storage_usage: Option<u64>,
    /// Creating transaction
    pub created: Option<TransactionRef>,
    /// Deleting transaction
    pub deleted: Option<TransactionRef>,
}

/// Transaction hash with its block timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRef {
    /// Transaction hash
    pub transaction_hash: Option<String>,
    /// Block timestamp
    pub block_timestamp: BlockTimestamp,
}

impl AccountInfo {
    /// Merges the two independently fetched halves of an account response.
    ///
    /// Returns `None` when neither source knows the account.
    pub fn merge(
        account_id: &AccountId,
        row: Option<AccountRow>,
        view: Option<AccountView>,
    ) -> Option<Self> {
        if row.is_none() && view.is_none() {
            return None;
        }

        let (created, deleted) = match row {
            Some(row) => (
                row.created_at.map(|block_timestamp| TransactionRef {
                    transaction_hash: row.created_by_transaction_hash,
                    block_timestamp,
                }),
                row.deleted_at.map(|block_timestamp| TransactionRef {
                    transaction_hash: row.deleted_by_transaction_hash,
                    block_timestamp,
                }),
            ),
            None => (None, None),
        };

        Some(Self {
            account_id: account_id.clone(),
            amount: view.as_ref().map(|v| v.amount.clone()),
            locked: view.as_ref().map(|v| v.locked.clone()),
            code_hash: view.as_ref().map(|v| v.code_hash.clone()),
            storage_usage: view.as_ref().map(|v| v.storage_usage),
            created,
            deleted,
        })
    }
}
