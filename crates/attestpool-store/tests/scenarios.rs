// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use attestpool_core::{
    Address, ClaimBody, ClaimId, ClaimKind, ClaimStore, EngineConfig, EngineError, PoolEngine,
    PoolId, Rejection, Submission, TreasuryError, UNIT,
};
use attestpool_store::{address_of, sign_revocation, MemoryClaimStore, MemoryTreasury};
use ed25519_dalek::SigningKey;

type Engine = PoolEngine<MemoryClaimStore, MemoryTreasury>;

struct Party {
    key: SigningKey,
    address: Address,
}

impl Party {
    fn new(seed: u8) -> Self {
        let key = SigningKey::from_bytes(&[seed; 32]);
        let address = address_of(&key.verifying_key());
        Self { key, address }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("attestpool=debug")
        .with_test_writer()
        .try_init();
}

fn engine() -> Engine {
    init_tracing();
    PoolEngine::multi_pool(
        MemoryClaimStore::new(),
        MemoryTreasury::new(),
        EngineConfig::default(),
    )
    .expect("engine")
}

fn submit(engine: &mut Engine, from: &Party, to: Address, reference: ClaimId, body: ClaimBody) -> Submission {
    let request = engine.request_for(to, reference, &body).expect("request");
    engine.attest(from.address, request).expect("attest")
}

fn create_pool(engine: &mut Engine, creator: &Party) -> PoolId {
    let body = ClaimBody::PoolCreation {
        name: "testPool".to_string(),
        description: "a pool for testing".to_string(),
        creator_name: "Alice".to_string(),
    };
    submit(engine, creator, Address::ZERO, ClaimId::ZERO, body)
        .accepted()
        .expect("pool")
}

fn revocation(engine: &Engine, revoker: &Party, claim: ClaimId, kind: ClaimKind) -> attestpool_core::DelegatedRevocation {
    let nonce = engine.store().nonce_of(&revoker.address);
    let schema = engine.schema_id(kind).expect("schema");
    sign_revocation(&revoker.key, schema, claim, nonce, 0)
}

fn invite(name: &str) -> ClaimBody {
    ClaimBody::Invite {
        name: name.to_string(),
        reason: "friend".to_string(),
    }
}

#[test]
fn pool_creation_bootstraps_the_creator() {
    let alice = Party::new(1);
    let mut engine = engine();
    let pool = create_pool(&mut engine, &alice);

    assert!(engine.is_invited(pool, alice.address));
    assert!(!engine.is_blocked(pool, alice.address));
    assert_eq!(engine.store().claim_count(), 2);
    let invite_id = engine.invite_claims(pool, alice.address)[0];
    let invite = engine.store().get_claim(&invite_id).expect("invite");
    assert_eq!(invite.attester, engine.address());
    assert_eq!(invite.reference_id, pool);
}

#[test]
fn invite_block_then_revoke_block_with_reason() {
    let alice = Party::new(1);
    let bob = Party::new(2);
    let mut engine = engine();
    let pool = create_pool(&mut engine, &alice);

    let invite_id = submit(&mut engine, &alice, bob.address, pool, invite("Bob"))
        .accepted()
        .expect("invite");
    let block_id = submit(
        &mut engine,
        &alice,
        bob.address,
        pool,
        ClaimBody::Block {
            reason: "spam".to_string(),
        },
    )
    .accepted()
    .expect("block");
    assert!(engine.is_blocked(pool, bob.address));

    let request = revocation(&engine, &alice, block_id, ClaimKind::Block);
    let receipt = engine
        .revoke_with_reason(request, "it was a misunderstanding")
        .expect("revoke");

    assert!(!engine.is_blocked(pool, bob.address));
    assert!(engine.is_invited(pool, bob.address));
    assert_eq!(engine.invite_claims(pool, bob.address), vec![invite_id]);
    assert!(engine.store().get_claim(&block_id).expect("block").is_revoked());
    let reason = engine
        .store()
        .get_claim(&receipt.reason_claim)
        .expect("reason");
    assert_eq!(reason.attester, alice.address);
    assert_eq!(reason.reference_id, block_id);
    assert_eq!(engine.store().nonce_of(&alice.address), 1);
}

#[test]
fn expiring_invite_is_swept_after_time_passes() {
    let alice = Party::new(1);
    let bob = Party::new(2);
    let mut engine = engine();
    let pool = create_pool(&mut engine, &alice);

    let expiry = engine.store().now() + 1_000;
    let request = engine
        .request_for(bob.address, pool, &invite("Bob"))
        .expect("request")
        .with_expiry(expiry);
    assert!(engine.attest(alice.address, request).expect("attest").is_accepted());

    assert!(engine.update_expired(pool, bob.address).expect("sweep").is_empty());
    assert!(engine.is_invited(pool, bob.address));

    engine.store_mut().advance(1_001);
    assert_eq!(engine.update_expired(pool, bob.address).expect("sweep").invites_removed, 1);
    assert!(!engine.is_invited(pool, bob.address));
    assert!(engine.update_expired(pool, bob.address).expect("sweep").is_empty());
}

#[test]
fn transfer_scenario_with_real_treasury() {
    let alice = Party::new(1);
    let bob = Party::new(2);
    let mut engine = engine();
    let pool = create_pool(&mut engine, &alice);
    engine.treasury_mut().fund(alice.address, UNIT).expect("fund");

    let deposit = engine
        .request_for(
            Address::ZERO,
            pool,
            &ClaimBody::Deposit {
                reason: "seed".to_string(),
            },
        )
        .expect("request")
        .with_value(UNIT);
    assert!(engine.attest(alice.address, deposit).expect("deposit").is_accepted());
    assert_eq!(engine.balance(pool), UNIT);
    assert_eq!(engine.treasury().balance_of(&alice.address), 0);

    let too_much = ClaimBody::Transfer {
        amount: UNIT + UNIT / 10,
        reason: "rent".to_string(),
    };
    assert_eq!(
        submit(&mut engine, &alice, bob.address, pool, too_much),
        Submission::Rejected(Rejection::InsufficientBalance)
    );

    let tenth = ClaimBody::Transfer {
        amount: UNIT / 10,
        reason: "rent".to_string(),
    };
    assert!(submit(&mut engine, &alice, bob.address, pool, tenth).is_accepted());
    assert_eq!(engine.balance(pool), UNIT - UNIT / 10);
    assert_eq!(engine.treasury().balance_of(&bob.address), UNIT / 10);
    assert_eq!(engine.treasury().held(), UNIT - UNIT / 10);
}

#[test]
fn unfunded_deposit_commits_nothing() {
    let alice = Party::new(1);
    let carol = Party::new(3);
    let mut engine = engine();
    let pool = create_pool(&mut engine, &alice);
    let claims = engine.store().claim_count();

    let deposit = engine
        .request_for(
            Address::ZERO,
            pool,
            &ClaimBody::Deposit {
                reason: "broke".to_string(),
            },
        )
        .expect("request")
        .with_value(5);
    let err = engine.attest(carol.address, deposit).expect_err("no funds");
    assert!(matches!(
        err,
        EngineError::Treasury(TreasuryError::InsufficientFunds { requested: 5, available: 0 })
    ));
    assert_eq!(engine.balance(pool), 0);
    assert_eq!(engine.store().claim_count(), claims);
}

#[test]
fn failed_reason_revocation_keeps_nonce_and_claim() {
    let alice = Party::new(1);
    let bob = Party::new(2);
    let mut engine = engine();
    let pool = create_pool(&mut engine, &alice);
    let invite_id = submit(&mut engine, &alice, bob.address, pool, invite("Bob"))
        .accepted()
        .expect("invite");

    let direct = revocation(&engine, &alice, invite_id, ClaimKind::Invite);
    assert!(matches!(
        engine.revoke(direct),
        Err(EngineError::RevocationRefused(_, Rejection::NoReasonGrant))
    ));

    let request = revocation(&engine, &alice, invite_id, ClaimKind::Invite);
    let oversized = "r".repeat(engine.config().max_text_bytes + 1);
    assert!(matches!(
        engine.revoke_with_reason(request.clone(), &oversized),
        Err(EngineError::ReasonRefused(_, Rejection::MalformedPayload))
    ));
    assert_eq!(engine.store().nonce_of(&alice.address), 0);
    assert!(!engine.store().get_claim(&invite_id).expect("invite").is_revoked());
    assert!(engine.is_invited(pool, bob.address));

    engine
        .revoke_with_reason(request, "moved away")
        .expect("same signature still valid");
    assert!(!engine.is_invited(pool, bob.address));
}

#[test]
fn forged_revocations_fail_in_the_store() {
    let alice = Party::new(1);
    let mallory = Party::new(9);
    let mut engine = engine();
    let pool = create_pool(&mut engine, &alice);
    let invite_id = submit(&mut engine, &alice, mallory.address, pool, invite("M"))
        .accepted()
        .expect("invite");

    let forged = revocation(&engine, &mallory, invite_id, ClaimKind::Invite);
    assert!(matches!(
        engine.revoke_with_reason(forged, "mine now"),
        Err(EngineError::Store(attestpool_core::StoreError::NotAttester))
    ));

    let mut tampered = revocation(&engine, &alice, invite_id, ClaimKind::Invite);
    tampered.deadline = 42;
    assert!(matches!(
        engine.revoke_with_reason(tampered, "x"),
        Err(EngineError::Store(_))
    ));
    assert!(engine.is_invited(pool, mallory.address));
}

#[test]
fn single_pool_deployment_over_memory_store() {
    init_tracing();
    let alice = Party::new(1);
    let bob = Party::new(2);
    let mut engine = PoolEngine::single_pool(
        MemoryClaimStore::new(),
        MemoryTreasury::new(),
        EngineConfig::default(),
        alice.address,
    )
    .expect("engine");
    let pool = engine.deployment_pool().expect("pool");

    assert!(engine.is_member(pool, alice.address));
    assert!(submit(&mut engine, &alice, bob.address, ClaimId::ZERO, invite("Bob")).is_accepted());
    assert!(engine.is_member(pool, bob.address));
}
