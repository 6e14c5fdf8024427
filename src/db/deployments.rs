// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! First/last deployment selection
//!
//! In-process counterpart of [`FIRST_LAST_DEPLOYMENTS`](super::queries::FIRST_LAST_DEPLOYMENTS),
//! used by the memory repository. Input is the already-filtered set of
//! successful deployments for one account.

use crate::types::contract::DeploymentRecord;

/// Keeps the earliest and latest deployment, ascending by timestamp.
///
/// Rows are ranked 1..=N by timestamp (stable for ties) and kept when
/// `rank == 1 || rank == N`, so a single deployment is returned once and an
/// empty history stays empty.
pub fn first_and_last(mut deployments: Vec<DeploymentRecord>) -> Vec<DeploymentRecord> {
    deployments.sort_by_key(|d| d.block_timestamp);
    let total = deployments.len();

    deployments
        .into_iter()
        .enumerate()
        .filter(|(index, _)| {
            let rank = index + 1;
            rank == 1 || rank == total
        })
        .map(|(_, deployment)| deployment)
        .collect()
}
