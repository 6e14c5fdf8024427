// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower middleware for the NEAR JSON-RPC client.
//!
//! Both layers compose with `alloy_rpc_client::ClientBuilder`:
//!
//! ```rust,ignore
//! use nearscan::transport::{LoggingLayer, RateLimitLayer};
//! use alloy_rpc_client::ClientBuilder;
//!
//! let client = ClientBuilder::default()
//!     .layer(LoggingLayer::new())
//!     .layer(RateLimitLayer::per_second(20))
//!     .http(rpc_url);
//! ```
//!
//! NEAR multiplexes every view through the single `query` method, so
//! [`LoggingLayer`] labels calls with the `request_type` parameter
//! (`query/view_account`, `query/view_code`, ...).

mod logging;
mod rate_limit;

pub use logging::{LoggingLayer, LoggingService};
pub use rate_limit::{RateLimitLayer, RateLimitService};
