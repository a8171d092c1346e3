// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use attestpool_core::{
    Address, Amount, ClaimBody, ClaimId, ClaimKind, EngineConfig, PoolEngine, PoolId, Submission,
};
use attestpool_store::{address_of, sign_revocation, MemoryClaimStore, MemoryTreasury};
use ed25519_dalek::SigningKey;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    CreatePool { who: u8, value: u16 },
    Invite { who: u8, to: u8, pool: u8 },
    Block { who: u8, to: u8, pool: u8 },
    Deposit { who: u8, pool: u8, value: u16 },
    Transfer { who: u8, to: u8, pool: u8, amount: u16 },
    RevokeWithReason { who: u8, claim: u8 },
    Sweep { pool: u8, holder: u8 },
    Advance { seconds: u16 },
}

const PARTIES: u8 = 4;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(ops) = Vec::<Op>::arbitrary(&mut u) else {
        return;
    };

    let keys: Vec<SigningKey> = (1..=PARTIES).map(|s| SigningKey::from_bytes(&[s; 32])).collect();
    let addrs: Vec<Address> = keys.iter().map(|k| address_of(&k.verifying_key())).collect();
    let mut treasury = MemoryTreasury::new();
    for a in &addrs {
        treasury.fund(*a, Amount::from(u32::MAX)).expect("fund");
    }
    let Ok(mut engine) =
        PoolEngine::multi_pool(MemoryClaimStore::new(), treasury, EngineConfig::default())
    else {
        return;
    };

    let mut pools: Vec<PoolId> = Vec::new();
    let mut membership_claims: Vec<(ClaimId, ClaimKind)> = Vec::new();
    let party = |n: u8| usize::from(n % PARTIES);
    let pool_at = |pools: &[PoolId], n: u8| {
        if pools.is_empty() {
            ClaimId::ZERO
        } else {
            pools[usize::from(n) % pools.len()]
        }
    };

    for op in ops.into_iter().take(64) {
        let (attester, to, reference, body, value) = match op {
            Op::CreatePool { who, value } => (
                party(who),
                Address::ZERO,
                ClaimId::ZERO,
                ClaimBody::PoolCreation {
                    name: "p".into(),
                    description: String::new(),
                    creator_name: "c".into(),
                },
                Amount::from(value),
            ),
            Op::Invite { who, to, pool } => (
                party(who),
                addrs[party(to)],
                pool_at(&pools, pool),
                ClaimBody::Invite {
                    name: "n".into(),
                    reason: "r".into(),
                },
                0,
            ),
            Op::Block { who, to, pool } => (
                party(who),
                addrs[party(to)],
                pool_at(&pools, pool),
                ClaimBody::Block { reason: "r".into() },
                0,
            ),
            Op::Deposit { who, pool, value } => (
                party(who),
                Address::ZERO,
                pool_at(&pools, pool),
                ClaimBody::Deposit { reason: "r".into() },
                Amount::from(value),
            ),
            Op::Transfer {
                who,
                to,
                pool,
                amount,
            } => (
                party(who),
                addrs[party(to)],
                pool_at(&pools, pool),
                ClaimBody::Transfer {
                    amount: Amount::from(amount),
                    reason: "r".into(),
                },
                0,
            ),
            Op::RevokeWithReason { who, claim } => {
                if !membership_claims.is_empty() {
                    let (id, kind) = membership_claims[usize::from(claim) % membership_claims.len()];
                    let revoker = party(who);
                    let Some(schema) = engine.schema_id(kind) else {
                        continue;
                    };
                    let nonce = engine.store().nonce_of(&addrs[revoker]);
                    let request = sign_revocation(&keys[revoker], schema, id, nonce, 0);
                    let _ = engine.revoke_with_reason(request, "fuzz");
                }
                continue;
            }
            Op::Sweep { pool, holder } => {
                let _ = engine.update_expired(pool_at(&pools, pool), addrs[party(holder)]);
                continue;
            }
            Op::Advance { seconds } => {
                engine.store_mut().advance(u64::from(seconds));
                continue;
            }
        };

        let kind = body.kind();
        let Ok(request) = engine.request_for(to, reference, &body) else {
            continue;
        };
        let outcome = engine.attest(addrs[attester], request.with_value(value));
        if let Ok(Submission::Accepted(id)) = outcome {
            match kind {
                ClaimKind::PoolCreation => pools.push(id),
                ClaimKind::Invite | ClaimKind::Block => membership_claims.push((id, kind)),
                _ => {}
            }
        }

        let allocated: Amount = pools.iter().map(|p| engine.balance(*p)).sum();
        assert_eq!(
            allocated + engine.unallocated(),
            engine.treasury().held(),
            "custody must match treasury"
        );
        for p in &pools {
            for a in &addrs {
                assert_eq!(
                    engine.is_invited(*p, *a),
                    !engine.invite_claims(*p, *a).is_empty()
                );
            }
        }
    }
});
