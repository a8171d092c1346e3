// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;

use crate::collaborator::{ClaimStore, Treasury};
use crate::config::EngineConfig;
use crate::custody::{CustodyEvent, CustodyLedger, CustodyOverlay};
use crate::error::{ConfigError, EngineError, EngineResult};
use crate::membership::{MembershipKind, MembershipLedger, MembershipOverlay};
use crate::revocation::{ReasonGrant, RevocationReceipt};
use crate::router::{Decision, PendingDecision, Rejection};
use crate::schema::{ClaimBody, ClaimKind, SchemaBook};
use crate::sweeper::{sweep, SweepReport};
use crate::telemetry::Telemetry;
use crate::types::{
    Address, Amount, Claim, ClaimId, ClaimRequest, DelegatedRevocation, PoolId, SchemaId,
    Timestamp, VerifiedRevocation,
};

/// How pools come into existence for this deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// Pools are created by pool-creation claims; a claim's pool is its
    /// reference id.
    MultiPool,
    /// One pool, seeded at construction with the deployer's own invite.
    SinglePool { pool: PoolId, deployer: Address },
}

#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub(crate) membership: MembershipLedger,
    pub(crate) custody: CustodyLedger,
    pub(crate) reasoned: BTreeSet<ClaimId>,
}

/// Everything one call wants to change, staged against the live state.
/// Dropping it discards the whole call.
#[derive(Debug, Default)]
pub(crate) struct Transaction {
    pub(crate) membership: MembershipOverlay,
    pub(crate) custody: CustodyOverlay,
    reasoned: Vec<ClaimId>,
    claims: Vec<Claim>,
    revocations: Vec<(DelegatedRevocation, Timestamp)>,
    receipts: Vec<(Address, Amount)>,
    payouts: Vec<(Address, Amount)>,
    accepted: Vec<PendingDecision>,
}

impl Transaction {
    pub(crate) fn stage_claim(&mut self, claim: Claim) {
        self.claims.push(claim);
    }

    /// Value attached to an accepted claim is taken from its attester.
    fn stage_receipt(&mut self, claim: &Claim) {
        if claim.value > 0 {
            self.receipts.push((claim.attester, claim.value));
        }
    }

    pub(crate) fn stage_reason(&mut self, revoked: ClaimId) {
        self.reasoned.push(revoked);
    }

    pub(crate) fn stage_accepted(&mut self, decision: PendingDecision) {
        self.accepted.push(decision);
    }

    pub(crate) fn stage_payout(&mut self, to: Address, amount: Amount) {
        self.payouts.push((to, amount));
    }

    pub(crate) fn staged_claim(&self, id: &ClaimId) -> Option<&Claim> {
        self.claims.iter().find(|c| &c.id == id)
    }
}

/// Outcome of submitting a claim through the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Accepted(ClaimId),
    Rejected(Rejection),
}

impl Submission {
    pub fn accepted(&self) -> Option<ClaimId> {
        match self {
            Self::Accepted(id) => Some(*id),
            Self::Rejected(_) => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// The membership and custody engine.
///
/// Every mutating entry point takes `&mut self` and either completes or
/// leaves engine, store and treasury untouched.
pub struct PoolEngine<S, T> {
    pub(crate) store: S,
    treasury: T,
    pub(crate) schemas: SchemaBook,
    pub(crate) config: EngineConfig,
    pub(crate) deployment: Deployment,
    pub(crate) state: EngineState,
    pub(crate) telemetry: Telemetry,
}

impl<S: ClaimStore, T: Treasury> PoolEngine<S, T> {
    /// Registers the six multi-pool schemas and starts with no pools.
    pub fn multi_pool(mut store: S, treasury: T, config: EngineConfig) -> EngineResult<Self> {
        let schemas = SchemaBook::register(&mut store, &ClaimKind::MULTI_POOL)?;
        tracing::info!(target: "attestpool.engine", engine = %config.engine_address, "multi-pool engine ready");
        Ok(Self {
            store,
            treasury,
            schemas,
            config,
            deployment: Deployment::MultiPool,
            state: EngineState::default(),
            telemetry: Telemetry::default(),
        })
    }

    /// Registers the five single-pool schemas and invites `deployer` with a
    /// claim it attests to itself. That claim's id names the pool.
    pub fn single_pool(
        mut store: S,
        treasury: T,
        config: EngineConfig,
        deployer: Address,
    ) -> EngineResult<Self> {
        if deployer.is_zero() {
            return Err(ConfigError::InvalidAddress("deployer must be non-zero".to_string()).into());
        }
        let schemas = SchemaBook::register(&mut store, &ClaimKind::SINGLE_POOL)?;
        let invite_schema = schemas
            .id_of(ClaimKind::Invite)
            .ok_or_else(|| EngineError::Internal("invite schema missing".to_string()))?;
        let payload = ClaimBody::Invite {
            name: "deployer".to_string(),
            reason: config.bootstrap_reason.clone(),
        }
        .encode()?;
        let seed = store.draft(
            deployer,
            ClaimRequest::new(invite_schema, deployer, ClaimId::ZERO, payload),
        )?;
        let pool = seed.id;
        store.commit(seed)?;

        let mut state = EngineState::default();
        state
            .membership
            .insert(MembershipKind::Invite, pool, deployer, pool);
        tracing::info!(target: "attestpool.engine", %pool, %deployer, "single-pool engine ready");
        Ok(Self {
            store,
            treasury,
            schemas,
            config,
            deployment: Deployment::SinglePool { pool, deployer },
            state,
            telemetry: Telemetry::default(),
        })
    }

    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Builds a request carrying `body` under the schema registered for its
    /// kind. Kinds this deployment never registered are an error.
    pub fn request_for(
        &self,
        recipient: Address,
        reference_id: ClaimId,
        body: &ClaimBody,
    ) -> EngineResult<ClaimRequest> {
        let kind = body.kind();
        let schema = self
            .schemas
            .id_of(kind)
            .ok_or(EngineError::UnsupportedInVariant(kind.as_str()))?;
        Ok(ClaimRequest::new(schema, recipient, reference_id, body.encode()?))
    }

    /// Submits a claim with this engine as its resolver: the store drafts it,
    /// the router decides, and only an accepted claim is committed (with its
    /// attached value and every nested effect).
    pub fn attest(&mut self, attester: Address, request: ClaimRequest) -> EngineResult<Submission> {
        let claim = self.store.draft(attester, request)?;
        let mut txn = Transaction::default();
        match self.route_accept(&mut txn, &claim, None)? {
            Decision::Accept => {
                txn.stage_receipt(&claim);
                let id = claim.id;
                txn.claims.insert(0, claim);
                self.apply(txn)?;
                Ok(Submission::Accepted(id))
            }
            Decision::Reject(reason) => Ok(Submission::Rejected(reason)),
        }
    }

    /// Accept callback for a store that drives the engine itself. The store
    /// commits `claim` when this returns `Ok(true)`; its attached value has
    /// already been received into custody by then.
    pub fn on_claim_accepted(&mut self, claim: &Claim) -> EngineResult<bool> {
        let mut txn = Transaction::default();
        let decision = self.route_accept(&mut txn, claim, None)?;
        if decision.is_accept() {
            txn.stage_receipt(claim);
            self.apply(txn)?;
        }
        Ok(decision.is_accept())
    }

    /// Revoke callback for a store that drives the engine itself. A
    /// revocation arriving this way carries no reason grant and is refused.
    pub fn on_claim_revoked(&mut self, claim: &Claim) -> bool {
        let mut txn = Transaction::default();
        self.route_revoke(&mut txn, claim, None).is_accept()
    }

    /// Delegated revocation without a reason. Always refused by the router;
    /// nothing is committed.
    pub fn revoke(&mut self, request: DelegatedRevocation) -> EngineResult<()> {
        let VerifiedRevocation { claim, .. } = self.store.verify_revocation(&request)?;
        let now = self.store.now();
        let mut txn = Transaction::default();
        match self.route_revoke(&mut txn, &claim, None) {
            Decision::Accept => {
                txn.revocations.push((request, now));
                self.apply(txn)
            }
            Decision::Reject(reason) => Err(EngineError::RevocationRefused(claim.id, reason)),
        }
    }

    /// Revokes a membership claim and binds `reason` to it with a
    /// revoke-reason claim attested by the revoker.
    pub fn revoke_with_reason(
        &mut self,
        request: DelegatedRevocation,
        reason: &str,
    ) -> EngineResult<RevocationReceipt> {
        let VerifiedRevocation { claim, revoker } =
            self.store.verify_revocation(&request).map_err(|err| {
                tracing::warn!(target: "attestpool.revocation", claim_id = %request.claim_id, error = %err, "delegated revocation failed verification");
                err
            })?;
        let reason_schema = self
            .schemas
            .id_of(ClaimKind::RevokeReason)
            .ok_or_else(|| EngineError::Internal("revoke-reason schema missing".to_string()))?;
        let now = self.store.now();
        let mut txn = Transaction::default();
        let grant = ReasonGrant::open(claim.id);

        if let Decision::Reject(r) = self.route_revoke(&mut txn, &claim, Some(&grant)) {
            return Err(EngineError::RevocationRefused(claim.id, r));
        }
        txn.revocations.push((request, now));

        let payload = ClaimBody::RevokeReason {
            reason: reason.to_string(),
        }
        .encode()?;
        let reason_request =
            ClaimRequest::new(reason_schema, claim.recipient, claim.id, payload).irrevocable();
        let reason_claim = self.store.draft(revoker, reason_request)?;
        if let Decision::Reject(r) = self.route_accept(&mut txn, &reason_claim, Some(&grant))? {
            return Err(EngineError::ReasonRefused(claim.id, r));
        }
        let receipt = RevocationReceipt {
            revoked: claim.id,
            reason_claim: reason_claim.id,
        };
        txn.stage_claim(reason_claim);
        drop(grant);

        self.apply(txn)?;
        self.telemetry.record_revocation();
        tracing::info!(
            target: "attestpool.revocation",
            claim_id = %receipt.revoked,
            reason_claim = %receipt.reason_claim,
            %revoker,
            "claim revoked with reason"
        );
        Ok(receipt)
    }

    /// Drops invite and block entries of `holder` in `pool` whose claims
    /// expired before the store's current time.
    pub fn update_expired(&mut self, pool: PoolId, holder: Address) -> EngineResult<SweepReport> {
        let now = self.store.now();
        let report = sweep(&mut self.state.membership, &self.store, pool, holder, now);
        self.telemetry.record_sweep(&report);
        if !report.is_empty() {
            tracing::info!(
                target: "attestpool.sweep",
                %pool,
                %holder,
                invites_removed = report.invites_removed,
                blocks_removed = report.blocks_removed,
                "expired entries removed"
            );
        }
        Ok(report)
    }

    /// Moves value, commits staged claims and revocations, then merges the
    /// staged state and reports the accepted decisions. A call stages at
    /// most one value movement, so a treasury failure here leaves nothing
    /// behind.
    fn apply(&mut self, txn: Transaction) -> EngineResult<()> {
        let Transaction {
            membership,
            custody,
            reasoned,
            claims,
            revocations,
            receipts,
            payouts,
            accepted,
        } = txn;
        for (from, amount) in receipts {
            self.treasury.receive(from, amount).map_err(|err| {
                tracing::warn!(target: "attestpool.engine", %from, amount = %amount, error = %err, "value receipt failed");
                err
            })?;
        }
        for (to, amount) in payouts {
            self.treasury.pay(to, amount).map_err(|err| {
                tracing::warn!(target: "attestpool.engine", %to, amount = %amount, error = %err, "payout failed");
                err
            })?;
        }
        for claim in claims {
            self.store.commit(claim)?;
        }
        for (request, at) in revocations {
            self.store.commit_revocation(&request, at)?;
        }
        membership.merge_into(&mut self.state.membership);
        custody.merge_into(&mut self.state.custody);
        self.state.reasoned.extend(reasoned);
        for decision in accepted {
            self.publish_accepted(decision);
        }
        Ok(())
    }

    pub fn is_invited(&self, pool: PoolId, holder: Address) -> bool {
        self.state.membership.is_invited(pool, holder)
    }

    pub fn is_blocked(&self, pool: PoolId, holder: Address) -> bool {
        self.state.membership.is_blocked(pool, holder)
    }

    pub fn is_member(&self, pool: PoolId, holder: Address) -> bool {
        self.state.membership.is_member(pool, holder)
    }

    pub fn invite_claims(&self, pool: PoolId, holder: Address) -> Vec<ClaimId> {
        self.state
            .membership
            .claims(MembershipKind::Invite, pool, holder)
    }

    pub fn block_claims(&self, pool: PoolId, holder: Address) -> Vec<ClaimId> {
        self.state
            .membership
            .claims(MembershipKind::Block, pool, holder)
    }

    pub fn balance(&self, pool: PoolId) -> Amount {
        self.state.custody.balance(&pool)
    }

    pub fn unallocated(&self) -> Amount {
        self.state.custody.unallocated()
    }

    pub fn custody_events(&self) -> &[CustodyEvent] {
        self.state.custody.events()
    }

    pub fn has_reason(&self, claim: &ClaimId) -> bool {
        self.state.reasoned.contains(claim)
    }

    /// The engine accepts value attached to claims.
    pub fn is_payable(&self) -> bool {
        true
    }

    pub fn address(&self) -> Address {
        self.config.engine_address
    }

    pub fn deployment(&self) -> Deployment {
        self.deployment
    }

    pub fn deployment_pool(&self) -> Option<PoolId> {
        match self.deployment {
            Deployment::MultiPool => None,
            Deployment::SinglePool { pool, .. } => Some(pool),
        }
    }

    pub fn schemas(&self) -> &SchemaBook {
        &self.schemas
    }

    pub fn schema_id(&self, kind: ClaimKind) -> Option<SchemaId> {
        self.schemas.id_of(kind)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access, e.g. to move a test clock. Claims committed this
    /// way bypass the router.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn treasury(&self) -> &T {
        &self.treasury
    }

    pub fn treasury_mut(&mut self) -> &mut T {
        &mut self.treasury
    }
}
