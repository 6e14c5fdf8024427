// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Safe construction of parameterized SQL.

mod binder;

pub use binder::{bind, BoundQuery, NamedParams, Params, QueryTemplate, SqlValue};
