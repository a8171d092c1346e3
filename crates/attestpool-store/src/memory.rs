// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use attestpool_core::collaborator::ClaimStore;
use attestpool_core::error::StoreError;
use attestpool_core::types::{
    Address, Claim, ClaimId, ClaimRequest, DelegatedRevocation, SchemaId, Timestamp,
    VerifiedRevocation, NO_EXPIRY,
};
use sha2::{Digest, Sha256};

use crate::delegation::verify_revocation_signature;

const CLAIM_DOMAIN: &[u8] = b"attestpool/claim/v1";
const SCHEMA_DOMAIN: &[u8] = b"attestpool/schema/v1";

/// Clock value of a fresh store. Non-zero so that a revocation time of zero
/// keeps meaning "not revoked".
pub const GENESIS_TIME: Timestamp = 1_700_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRecord {
    pub definition: String,
    pub revocable: bool,
}

/// Append-only in-memory claim store with a manually driven clock.
#[derive(Debug, Clone)]
pub struct MemoryClaimStore {
    schemas: BTreeMap<SchemaId, SchemaRecord>,
    claims: BTreeMap<ClaimId, Claim>,
    nonces: BTreeMap<Address, u64>,
    next_seq: u64,
    now: Timestamp,
}

impl Default for MemoryClaimStore {
    fn default() -> Self {
        Self {
            schemas: BTreeMap::new(),
            claims: BTreeMap::new(),
            nonces: BTreeMap::new(),
            next_seq: 0,
            now: GENESIS_TIME,
        }
    }
}

impl MemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, seconds: Timestamp) {
        self.now = self.now.saturating_add(seconds);
    }

    pub fn set_now(&mut self, now: Timestamp) {
        self.now = now;
    }

    /// Next nonce `revoker` must sign.
    pub fn nonce_of(&self, revoker: &Address) -> u64 {
        self.nonces.get(revoker).copied().unwrap_or(0)
    }

    pub fn schema(&self, id: &SchemaId) -> Option<&SchemaRecord> {
        self.schemas.get(id)
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    pub fn claims(&self) -> impl Iterator<Item = &Claim> + '_ {
        self.claims.values()
    }

    fn schema_id(definition: &str, revocable: bool) -> SchemaId {
        let mut h = Sha256::new();
        h.update(SCHEMA_DOMAIN);
        h.update((definition.len() as u32).to_be_bytes());
        h.update(definition.as_bytes());
        h.update([u8::from(revocable)]);
        SchemaId(h.finalize().into())
    }

    fn claim_id(&self, attester: &Address, request: &ClaimRequest) -> ClaimId {
        let mut h = Sha256::new();
        h.update(CLAIM_DOMAIN);
        h.update(self.next_seq.to_be_bytes());
        h.update(request.schema.0);
        h.update(attester.0);
        h.update(request.recipient.0);
        h.update(request.reference_id.0);
        h.update(self.now.to_be_bytes());
        h.update((request.payload.len() as u32).to_be_bytes());
        h.update(&request.payload);
        ClaimId(h.finalize().into())
    }
}

impl ClaimStore for MemoryClaimStore {
    fn register_schema(&mut self, definition: &str, revocable: bool) -> Result<SchemaId, StoreError> {
        let id = Self::schema_id(definition, revocable);
        if self.schemas.contains_key(&id) {
            return Err(StoreError::InvalidArgument(format!(
                "schema already registered: {definition}"
            )));
        }
        self.schemas.insert(
            id,
            SchemaRecord {
                definition: definition.to_string(),
                revocable,
            },
        );
        tracing::debug!(target: "attestpool.store", schema = %id.to_hex(), definition, revocable, "schema registered");
        Ok(id)
    }

    fn draft(&mut self, attester: Address, request: ClaimRequest) -> Result<Claim, StoreError> {
        let schema = self
            .schemas
            .get(&request.schema)
            .ok_or(StoreError::SchemaNotRegistered)?;
        if request.revocable && !schema.revocable {
            return Err(StoreError::InvalidArgument(
                "revocable claim under an irrevocable schema".to_string(),
            ));
        }
        if request.expiry != NO_EXPIRY && request.expiry <= self.now {
            return Err(StoreError::InvalidArgument("expiry is not in the future".to_string()));
        }
        let id = self.claim_id(&attester, &request);
        self.next_seq = self.next_seq.wrapping_add(1);
        Ok(Claim {
            id,
            schema: request.schema,
            attester,
            recipient: request.recipient,
            reference_id: request.reference_id,
            payload: request.payload,
            value: request.value,
            time: self.now,
            expiry: request.expiry,
            revocation_time: 0,
            revocable: request.revocable,
        })
    }

    fn commit(&mut self, claim: Claim) -> Result<(), StoreError> {
        if !self.schemas.contains_key(&claim.schema) {
            return Err(StoreError::SchemaNotRegistered);
        }
        if self.claims.contains_key(&claim.id) {
            return Err(StoreError::DuplicateClaim(claim.id));
        }
        tracing::debug!(target: "attestpool.store", claim_id = %claim.id, attester = %claim.attester, "claim committed");
        self.claims.insert(claim.id, claim);
        Ok(())
    }

    fn verify_revocation(
        &self,
        request: &DelegatedRevocation,
    ) -> Result<VerifiedRevocation, StoreError> {
        let claim = self
            .claims
            .get(&request.claim_id)
            .ok_or(StoreError::ClaimNotFound(request.claim_id))?;
        if claim.schema != request.schema {
            return Err(StoreError::SchemaMismatch);
        }
        if claim.is_revoked() {
            return Err(StoreError::AlreadyRevoked(claim.id));
        }
        if !claim.revocable {
            return Err(StoreError::NotRevocable(claim.id));
        }
        if request.deadline != NO_EXPIRY && request.deadline < self.now {
            return Err(StoreError::DeadlineExpired);
        }
        let revoker = verify_revocation_signature(request)?;
        if revoker != claim.attester {
            return Err(StoreError::NotAttester);
        }
        let expected = self.nonce_of(&revoker);
        if request.nonce != expected {
            return Err(StoreError::BadNonce {
                expected,
                got: request.nonce,
            });
        }
        Ok(VerifiedRevocation {
            claim: claim.clone(),
            revoker,
        })
    }

    fn commit_revocation(
        &mut self,
        request: &DelegatedRevocation,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        let VerifiedRevocation { revoker, .. } = self.verify_revocation(request)?;
        let claim = self
            .claims
            .get_mut(&request.claim_id)
            .ok_or(StoreError::ClaimNotFound(request.claim_id))?;
        claim.revocation_time = at.max(1);
        let nonce = self.nonces.entry(revoker).or_insert(0);
        *nonce = nonce.saturating_add(1);
        tracing::debug!(target: "attestpool.store", claim_id = %request.claim_id, %revoker, "claim revoked");
        Ok(())
    }

    fn get_claim(&self, id: &ClaimId) -> Option<Claim> {
        self.claims.get(id).cloned()
    }

    fn now(&self) -> Timestamp {
        self.now
    }
}
