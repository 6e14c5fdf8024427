// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for the explorer's domain.
//!
//! This module provides:
//! - Validated identifiers ([`AccountId`], [`MethodName`])
//! - Block timestamps in nanoseconds
//! - Database rows and RPC views for accounts and contracts
//! - Token holdings and token metadata

pub mod account;
pub mod contract;
pub mod holdings;

// Note: Public types are re-exported from lib.rs, not here
