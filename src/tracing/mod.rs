// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Observability and tracing utilities.
//!
//! Structured spans for nearscan operations, plus subscriber setup for the
//! binary.

pub(crate) mod spans;

mod subscriber;

pub use subscriber::{init_subscriber, LogFormat};
