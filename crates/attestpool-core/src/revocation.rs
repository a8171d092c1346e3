// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

//! Reason-bound revocation.
//!
//! A revocation is only finalized while a [`ReasonGrant`] for that exact
//! claim is alive, and the same grant is what lets the paired revoke-reason
//! claim through. Grants are minted only inside
//! [`crate::engine::PoolEngine::revoke_with_reason`] and die with that call.

use serde::{Deserialize, Serialize};

use crate::types::ClaimId;

/// Authorization to finalize one revocation and bind one reason to it.
///
/// Not `Clone`, not constructible outside this crate.
#[derive(Debug)]
pub struct ReasonGrant {
    revoked: ClaimId,
}

impl ReasonGrant {
    pub(crate) fn open(revoked: ClaimId) -> Self {
        tracing::debug!(target: "attestpool.revocation", claim_id = %revoked, "reason window opened");
        Self { revoked }
    }

    pub fn revoked(&self) -> ClaimId {
        self.revoked
    }

    /// True if this grant covers `claim`.
    pub fn covers(&self, claim: &ClaimId) -> bool {
        &self.revoked == claim
    }
}

impl Drop for ReasonGrant {
    fn drop(&mut self) {
        tracing::debug!(target: "attestpool.revocation", claim_id = %self.revoked, "reason window closed");
    }
}

/// Result of a completed reason-bound revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationReceipt {
    pub revoked: ClaimId,
    pub reason_claim: ClaimId,
}
