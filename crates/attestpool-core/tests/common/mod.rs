// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use attestpool_core::{
    Address, Amount, Claim, ClaimBody, ClaimId, ClaimKind, ClaimRequest, ClaimStore,
    DelegatedRevocation, EngineConfig, PoolEngine, PoolId, SchemaId, StoreError, Submission,
    Timestamp, Treasury, TreasuryError, VerifiedRevocation,
};

pub const ENGINE: Address = Address::tagged(1);
pub const ALICE: Address = Address::tagged(0xa1);
pub const BOB: Address = Address::tagged(0xb0);
pub const CAROL: Address = Address::tagged(0xc0);
pub const START: Timestamp = 1_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("attestpool=debug")
        .with_test_writer()
        .try_init();
}

/// Claim store double. Delegated revocations are "signed" by putting the
/// revoker's address in the first 20 bytes of `revoker_key`; an empty
/// signature fails verification.
#[derive(Debug, Default)]
pub struct ScriptedStore {
    schemas: BTreeMap<SchemaId, bool>,
    pub claims: BTreeMap<ClaimId, Claim>,
    pub nonces: BTreeMap<Address, u64>,
    seq: u64,
    pub now: Timestamp,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            now: START,
            ..Self::default()
        }
    }
}

pub fn revoker_key(revoker: Address) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..20].copy_from_slice(&revoker.0);
    key
}

fn revoker_of(request: &DelegatedRevocation) -> Address {
    let mut out = [0u8; 20];
    out.copy_from_slice(&request.revoker_key[..20]);
    Address(out)
}

impl ClaimStore for ScriptedStore {
    fn register_schema(&mut self, definition: &str, revocable: bool) -> Result<SchemaId, StoreError> {
        if definition.is_empty() {
            return Err(StoreError::InvalidArgument("empty definition".to_string()));
        }
        let mut id = [0u8; 32];
        id[0] = 0x5c;
        id[1] = self.schemas.len() as u8 + 1;
        let id = SchemaId(id);
        self.schemas.insert(id, revocable);
        Ok(id)
    }

    fn draft(&mut self, attester: Address, request: ClaimRequest) -> Result<Claim, StoreError> {
        if !self.schemas.contains_key(&request.schema) {
            return Err(StoreError::SchemaNotRegistered);
        }
        self.seq += 1;
        let mut id = [0u8; 32];
        id[..8].copy_from_slice(&self.seq.to_be_bytes());
        id[8] = 0xcc;
        Ok(Claim {
            id: ClaimId(id),
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
        if self.claims.contains_key(&claim.id) {
            return Err(StoreError::DuplicateClaim(claim.id));
        }
        self.claims.insert(claim.id, claim);
        Ok(())
    }

    fn verify_revocation(&self, request: &DelegatedRevocation) -> Result<VerifiedRevocation, StoreError> {
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
        if request.signature.is_empty() {
            return Err(StoreError::BadSignature);
        }
        let revoker = revoker_of(request);
        if revoker != claim.attester {
            return Err(StoreError::NotAttester);
        }
        let expected = self.nonces.get(&revoker).copied().unwrap_or(0);
        if expected != request.nonce {
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

    fn commit_revocation(&mut self, request: &DelegatedRevocation, at: Timestamp) -> Result<(), StoreError> {
        let verified = self.verify_revocation(request)?;
        if let Some(claim) = self.claims.get_mut(&request.claim_id) {
            claim.revocation_time = at;
        }
        *self.nonces.entry(verified.revoker).or_insert(0) += 1;
        Ok(())
    }

    fn get_claim(&self, id: &ClaimId) -> Option<Claim> {
        self.claims.get(id).cloned()
    }

    fn now(&self) -> Timestamp {
        self.now
    }
}

/// Treasury double with unlimited external accounts.
#[derive(Debug, Default)]
pub struct Vault {
    pub held: Amount,
    pub paid: BTreeMap<Address, Amount>,
    pub received: Amount,
    pub refusing: BTreeSet<Address>,
}

impl Treasury for Vault {
    fn receive(&mut self, _from: Address, amount: Amount) -> Result<(), TreasuryError> {
        self.held += amount;
        self.received += amount;
        Ok(())
    }

    fn pay(&mut self, to: Address, amount: Amount) -> Result<(), TreasuryError> {
        if self.refusing.contains(&to) {
            return Err(TreasuryError::PayoutRefused);
        }
        if amount > self.held {
            return Err(TreasuryError::InsufficientFunds {
                requested: amount,
                available: self.held,
            });
        }
        self.held -= amount;
        *self.paid.entry(to).or_insert(0) += amount;
        Ok(())
    }
}

pub type Engine = PoolEngine<ScriptedStore, Vault>;

pub fn multi_pool() -> Engine {
    init_tracing();
    PoolEngine::multi_pool(ScriptedStore::new(), Vault::default(), EngineConfig::default())
        .expect("engine")
}

pub fn submit(
    engine: &mut Engine,
    attester: Address,
    recipient: Address,
    reference: ClaimId,
    body: ClaimBody,
    value: Amount,
) -> Submission {
    let request = engine
        .request_for(recipient, reference, &body)
        .expect("request")
        .with_value(value);
    engine.attest(attester, request).expect("attest")
}

pub fn invite(name: &str) -> ClaimBody {
    ClaimBody::Invite {
        name: name.to_string(),
        reason: "friend".to_string(),
    }
}

pub fn block() -> ClaimBody {
    ClaimBody::Block {
        reason: "spam".to_string(),
    }
}

pub fn deposit() -> ClaimBody {
    ClaimBody::Deposit {
        reason: "savings".to_string(),
    }
}

pub fn transfer(amount: Amount) -> ClaimBody {
    ClaimBody::Transfer {
        amount,
        reason: "rent".to_string(),
    }
}

/// Creates a pool attested by `creator` and returns its id.
pub fn create_pool(engine: &mut Engine, creator: Address) -> PoolId {
    let body = ClaimBody::PoolCreation {
        name: "testPool".to_string(),
        description: "shared fund".to_string(),
        creator_name: "Alice".to_string(),
    };
    submit(engine, creator, Address::ZERO, ClaimId::ZERO, body, 0)
        .accepted()
        .expect("pool created")
}

pub fn signed_by(revoker: Address, engine: &Engine, claim: ClaimId, kind: ClaimKind) -> DelegatedRevocation {
    DelegatedRevocation {
        schema: engine.schema_id(kind).expect("schema"),
        claim_id: claim,
        revoker_key: revoker_key(revoker),
        nonce: engine.store().nonces.get(&revoker).copied().unwrap_or(0),
        deadline: 0,
        signature: vec![1],
    }
}
