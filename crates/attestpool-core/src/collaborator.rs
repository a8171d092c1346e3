// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

//! Seams to the systems the engine reacts to but does not own.

use crate::error::{StoreError, TreasuryError};
use crate::types::{
    Address, Amount, Claim, ClaimId, ClaimRequest, DelegatedRevocation, SchemaId, Timestamp,
    VerifiedRevocation,
};

/// The append-only attestation ledger.
///
/// Submission is split in two so the engine can decide on a claim before it
/// becomes permanent: `draft` assigns the id and timestamp, `commit` makes it
/// visible to `get_claim`. A drafted claim that is never committed is simply
/// forgotten. Delegated revocation is split the same way.
pub trait ClaimStore {
    fn register_schema(&mut self, definition: &str, revocable: bool) -> Result<SchemaId, StoreError>;

    fn draft(&mut self, attester: Address, request: ClaimRequest) -> Result<Claim, StoreError>;

    fn commit(&mut self, claim: Claim) -> Result<(), StoreError>;

    /// Checks signature, nonce, deadline, schema match, revocability and that
    /// the revoker attested the claim. Must not mutate the store.
    fn verify_revocation(
        &self,
        request: &DelegatedRevocation,
    ) -> Result<VerifiedRevocation, StoreError>;

    /// Marks the claim revoked at `at` and consumes the revoker's nonce.
    fn commit_revocation(
        &mut self,
        request: &DelegatedRevocation,
        at: Timestamp,
    ) -> Result<(), StoreError>;

    fn get_claim(&self, id: &ClaimId) -> Option<Claim>;

    fn now(&self) -> Timestamp;
}

/// Native value movements in and out of engine custody.
pub trait Treasury {
    /// Takes value attached to an accepted claim from its attester.
    fn receive(&mut self, from: Address, amount: Amount) -> Result<(), TreasuryError>;

    /// Pays out of engine custody.
    fn pay(&mut self, to: Address, amount: Amount) -> Result<(), TreasuryError>;
}
