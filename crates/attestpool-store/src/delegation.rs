// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

//! ed25519 signatures over delegated revocations.

use attestpool_core::error::StoreError;
use attestpool_core::types::{Address, ClaimId, DelegatedRevocation, SchemaId, Timestamp};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

const REVOCATION_DOMAIN: &str = "attestpool/revoke/v1";

/// The account address controlled by `key`: the first 20 bytes of
/// `sha256(key)`.
pub fn address_of(key: &VerifyingKey) -> Address {
    let digest = Sha256::digest(key.to_bytes());
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[..20]);
    Address(out)
}

fn encode_len_prefixed(out: &mut Vec<u8>, value: &[u8]) {
    out.extend_from_slice(&(value.len() as u32).to_be_bytes());
    out.extend_from_slice(value);
}

fn signing_payload(schema: &SchemaId, claim_id: &ClaimId, nonce: u64, deadline: Timestamp) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + REVOCATION_DOMAIN.len() + 32 + 32 + 8 + 8);
    encode_len_prefixed(&mut out, REVOCATION_DOMAIN.as_bytes());
    out.extend_from_slice(&schema.0);
    out.extend_from_slice(&claim_id.0);
    out.extend_from_slice(&nonce.to_be_bytes());
    out.extend_from_slice(&deadline.to_be_bytes());
    out
}

pub fn sign_revocation(
    signing_key: &SigningKey,
    schema: SchemaId,
    claim_id: ClaimId,
    nonce: u64,
    deadline: Timestamp,
) -> DelegatedRevocation {
    let payload = signing_payload(&schema, &claim_id, nonce, deadline);
    let signature = signing_key.sign(&payload);
    DelegatedRevocation {
        schema,
        claim_id,
        revoker_key: signing_key.verifying_key().to_bytes(),
        nonce,
        deadline,
        signature: signature.to_bytes().to_vec(),
    }
}

/// Checks the signature and returns the signer's address.
pub fn verify_revocation_signature(request: &DelegatedRevocation) -> Result<Address, StoreError> {
    let key =
        VerifyingKey::from_bytes(&request.revoker_key).map_err(|_| StoreError::BadSignature)?;
    let sig = Signature::from_slice(&request.signature).map_err(|_| StoreError::BadSignature)?;
    let payload = signing_payload(&request.schema, &request.claim_id, request.nonce, request.deadline);
    key.verify(&payload, &sig)
        .map_err(|_| StoreError::BadSignature)?;
    Ok(address_of(&key))
}
