// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Indexer database access
//!
//! - [`AccountRepository`]: the per-account queries handlers need
//! - [`PgRepository`]: PostgreSQL over a deadpool pool, using the templates in [`queries`]
//! - [`MemoryRepository`]: fixture-backed implementation for development and tests
//! - [`first_and_last`], [`aggregate_fungible`], [`order_non_fungible`]: in-process
//!   counterparts of the deployment window query and the holdings queries

mod config;
mod deployments;
mod holdings;
mod memory;
mod postgres;
pub mod queries;
mod repository;

pub use config::DbConfig;
pub use deployments::first_and_last;
pub use holdings::{aggregate_fungible, order_non_fungible, FtBalanceChange, NftHoldingRow};
pub use memory::{ActionKind, ExecutionStatus, MemoryRepository, ReceiptAction, TokenEvent};
pub use postgres::PgRepository;
pub use repository::AccountRepository;
