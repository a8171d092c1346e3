// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

//! Claim accept and revoke dispatch.

use serde::{Deserialize, Serialize};

use crate::collaborator::{ClaimStore, Treasury};
use crate::custody::CustodyError;
use crate::engine::{Deployment, PoolEngine, Transaction};
use crate::error::{EngineError, EngineResult};
use crate::membership::MembershipKind;
use crate::revocation::ReasonGrant;
use crate::schema::{ClaimBody, ClaimKind};
use crate::types::{Address, Claim, ClaimId, ClaimRequest, PoolId};

/// Why a claim (or a revocation) was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rejection {
    UnknownSchema,
    MalformedPayload,
    MissingPool,
    ZeroDeposit,
    NotPayable,
    BalanceOverflow,
    NotMember,
    SelfInvite,
    ZeroRecipient,
    ZeroAmount,
    InsufficientBalance,
    NoReasonGrant,
    ReferenceNotFound,
    AttesterMismatch,
    NotRevocable,
    BootstrapFailed,
    KindNotRevocable,
}

impl Rejection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownSchema => "UNKNOWN_SCHEMA",
            Self::MalformedPayload => "MALFORMED_PAYLOAD",
            Self::MissingPool => "MISSING_POOL",
            Self::ZeroDeposit => "ZERO_DEPOSIT",
            Self::NotPayable => "NOT_PAYABLE",
            Self::BalanceOverflow => "BALANCE_OVERFLOW",
            Self::NotMember => "NOT_MEMBER",
            Self::SelfInvite => "SELF_INVITE",
            Self::ZeroRecipient => "ZERO_RECIPIENT",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
            Self::NoReasonGrant => "NO_REASON_GRANT",
            Self::ReferenceNotFound => "REFERENCE_NOT_FOUND",
            Self::AttesterMismatch => "ATTESTER_MISMATCH",
            Self::NotRevocable => "NOT_REVOCABLE",
            Self::BootstrapFailed => "BOOTSTRAP_FAILED",
            Self::KindNotRevocable => "KIND_NOT_REVOCABLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject(Rejection),
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// An accepted decision that is counted and logged only once its call
/// commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingDecision {
    Claim {
        kind: ClaimKind,
        claim: ClaimId,
        pool: ClaimId,
        attester: Address,
    },
    Revocation {
        kind: ClaimKind,
        claim: ClaimId,
        attester: Address,
    },
}

impl From<CustodyError> for Rejection {
    fn from(err: CustodyError) -> Self {
        match err {
            CustodyError::ZeroAmount => Rejection::ZeroAmount,
            CustodyError::Insufficient { .. } => Rejection::InsufficientBalance,
            CustodyError::Overflow => Rejection::BalanceOverflow,
        }
    }
}

impl<S: ClaimStore, T: Treasury> PoolEngine<S, T> {
    /// Decides on a proposed claim, recording side effects in `txn`.
    ///
    /// `Err` is reserved for collaborator failures; every policy outcome is a
    /// [`Decision`].
    pub(crate) fn route_accept(
        &mut self,
        txn: &mut Transaction,
        claim: &Claim,
        grant: Option<&ReasonGrant>,
    ) -> EngineResult<Decision> {
        let Some(kind) = self.schemas.kind_of(&claim.schema) else {
            return Ok(self.note_accept(txn, None, claim, Decision::Reject(Rejection::UnknownSchema)));
        };
        let body = match ClaimBody::decode(kind, &claim.payload, self.config.max_text_bytes) {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(target: "attestpool.router", claim_id = %claim.id, kind = kind.as_str(), error = %err, "payload rejected");
                return Ok(self.note_accept(
                    txn,
                    Some(kind),
                    claim,
                    Decision::Reject(Rejection::MalformedPayload),
                ));
            }
        };

        let decision = match body {
            ClaimBody::PoolCreation { creator_name, .. } => {
                self.accept_pool_creation(txn, claim, creator_name)?
            }
            body => match self.resolve_pool(claim) {
                Some(pool) => self.accept_in_pool(txn, claim, pool, body, grant),
                None => Decision::Reject(Rejection::MissingPool),
            },
        };
        Ok(self.note_accept(txn, Some(kind), claim, decision))
    }

    fn accept_pool_creation(
        &mut self,
        txn: &mut Transaction,
        claim: &Claim,
        creator_name: String,
    ) -> EngineResult<Decision> {
        if matches!(self.deployment, Deployment::SinglePool { .. }) {
            return Ok(Decision::Reject(Rejection::UnknownSchema));
        }
        let invite_schema = self
            .schemas
            .id_of(ClaimKind::Invite)
            .ok_or_else(|| EngineError::Internal("invite schema missing".to_string()))?;
        let payload = ClaimBody::Invite {
            name: creator_name,
            reason: self.config.bootstrap_reason.clone(),
        }
        .encode()?;
        let request = ClaimRequest::new(invite_schema, claim.attester, claim.id, payload);
        let invite = self.store.draft(self.config.engine_address, request)?;

        match self.route_accept(txn, &invite, None)? {
            Decision::Accept => {}
            Decision::Reject(reason) => {
                tracing::warn!(target: "attestpool.router", pool = %claim.id, reason = reason.as_str(), "creator invite refused");
                return Ok(Decision::Reject(Rejection::BootstrapFailed));
            }
        }
        if let Err(err) =
            txn.custody
                .hold_unallocated(&self.state.custody, claim.id, claim.id, claim.value)
        {
            return Ok(Decision::Reject(err.into()));
        }
        txn.stage_claim(invite);
        Ok(Decision::Accept)
    }

    fn accept_in_pool(
        &self,
        txn: &mut Transaction,
        claim: &Claim,
        pool: PoolId,
        body: ClaimBody,
        grant: Option<&ReasonGrant>,
    ) -> Decision {
        if let ClaimBody::Deposit { .. } = body {
            if claim.value == 0 {
                return Decision::Reject(Rejection::ZeroDeposit);
            }
            return match txn
                .custody
                .deposit(&self.state.custody, pool, claim.id, claim.value)
            {
                Ok(_) => Decision::Accept,
                Err(err) => Decision::Reject(err.into()),
            };
        }
        if claim.value != 0 {
            return Decision::Reject(Rejection::NotPayable);
        }

        match body {
            ClaimBody::PoolCreation { .. } | ClaimBody::Deposit { .. } => {
                Decision::Reject(Rejection::UnknownSchema)
            }
            ClaimBody::RevokeReason { .. } => self.accept_revoke_reason(txn, claim, grant),
            ClaimBody::Invite { .. } | ClaimBody::Block { .. } | ClaimBody::Transfer { .. }
                if !self.may_act(txn, pool, claim.attester) =>
            {
                Decision::Reject(Rejection::NotMember)
            }
            ClaimBody::Invite { .. } => {
                if claim.recipient.is_zero() {
                    return Decision::Reject(Rejection::ZeroRecipient);
                }
                if claim.recipient == claim.attester {
                    return Decision::Reject(Rejection::SelfInvite);
                }
                txn.membership.insert(
                    &self.state.membership,
                    MembershipKind::Invite,
                    pool,
                    claim.recipient,
                    claim.id,
                );
                Decision::Accept
            }
            ClaimBody::Block { .. } => {
                txn.membership.insert(
                    &self.state.membership,
                    MembershipKind::Block,
                    pool,
                    claim.recipient,
                    claim.id,
                );
                Decision::Accept
            }
            ClaimBody::Transfer { amount, .. } => {
                if claim.recipient.is_zero() {
                    return Decision::Reject(Rejection::ZeroRecipient);
                }
                if amount == 0 {
                    return Decision::Reject(Rejection::ZeroAmount);
                }
                match txn
                    .custody
                    .withdraw(&self.state.custody, pool, claim.id, amount)
                {
                    Ok(_) => {
                        txn.stage_payout(claim.recipient, amount);
                        Decision::Accept
                    }
                    Err(err) => Decision::Reject(err.into()),
                }
            }
        }
    }

    fn accept_revoke_reason(
        &self,
        txn: &mut Transaction,
        claim: &Claim,
        grant: Option<&ReasonGrant>,
    ) -> Decision {
        if !grant.is_some_and(|g| g.covers(&claim.reference_id)) {
            return Decision::Reject(Rejection::NoReasonGrant);
        }
        let target = txn
            .staged_claim(&claim.reference_id)
            .cloned()
            .or_else(|| self.store.get_claim(&claim.reference_id));
        let Some(target) = target else {
            return Decision::Reject(Rejection::ReferenceNotFound);
        };
        if target.attester != claim.attester {
            return Decision::Reject(Rejection::AttesterMismatch);
        }
        if !target.revocable {
            return Decision::Reject(Rejection::NotRevocable);
        }
        txn.stage_reason(target.id);
        Decision::Accept
    }

    /// Decides on the revocation of `claim`. Without a grant covering this
    /// exact claim the answer is always no.
    pub(crate) fn route_revoke(
        &self,
        txn: &mut Transaction,
        claim: &Claim,
        grant: Option<&ReasonGrant>,
    ) -> Decision {
        let kind = self.schemas.kind_of(&claim.schema);
        let decision = self.decide_revoke(txn, claim, kind, grant);
        match (decision, kind) {
            (Decision::Accept, Some(kind)) => txn.stage_accepted(PendingDecision::Revocation {
                kind,
                claim: claim.id,
                attester: claim.attester,
            }),
            (Decision::Accept, None) => {}
            (Decision::Reject(reason), _) => {
                self.telemetry.record_revoke_decision(kind, &decision);
                tracing::debug!(
                    target: "attestpool.router",
                    claim_id = %claim.id,
                    kind = kind.map_or("unknown", ClaimKind::as_str),
                    attester = %claim.attester,
                    reason = reason.as_str(),
                    "revocation rejected"
                );
            }
        }
        decision
    }

    fn decide_revoke(
        &self,
        txn: &mut Transaction,
        claim: &Claim,
        kind: Option<ClaimKind>,
        grant: Option<&ReasonGrant>,
    ) -> Decision {
        if !grant.is_some_and(|g| g.covers(&claim.id)) {
            return Decision::Reject(Rejection::NoReasonGrant);
        }
        let Some(kind) = kind else {
            return Decision::Reject(Rejection::UnknownSchema);
        };
        let Some(pool) = self.resolve_pool(claim) else {
            return Decision::Reject(Rejection::MissingPool);
        };
        if !txn
            .membership
            .is_member(&self.state.membership, pool, claim.attester)
        {
            return Decision::Reject(Rejection::NotMember);
        }
        let set = match kind {
            ClaimKind::Invite => MembershipKind::Invite,
            ClaimKind::Block => MembershipKind::Block,
            ClaimKind::PoolCreation
            | ClaimKind::Deposit
            | ClaimKind::Transfer
            | ClaimKind::RevokeReason => return Decision::Reject(Rejection::KindNotRevocable),
        };
        txn.membership
            .remove(&self.state.membership, set, pool, claim.recipient, &claim.id);
        Decision::Accept
    }

    pub(crate) fn resolve_pool(&self, claim: &Claim) -> Option<PoolId> {
        match self.deployment {
            Deployment::MultiPool => (!claim.reference_id.is_zero()).then_some(claim.reference_id),
            Deployment::SinglePool { pool, .. } => Some(pool),
        }
    }

    /// The engine's own claims skip the membership gate.
    fn may_act(&self, txn: &Transaction, pool: PoolId, attester: Address) -> bool {
        attester == self.config.engine_address
            || txn
                .membership
                .is_member(&self.state.membership, pool, attester)
    }

    /// Rejections are final and reported at once. Acceptances wait in `txn`
    /// until the call commits.
    fn note_accept(
        &self,
        txn: &mut Transaction,
        kind: Option<ClaimKind>,
        claim: &Claim,
        decision: Decision,
    ) -> Decision {
        match (decision, kind) {
            (Decision::Accept, Some(kind)) => txn.stage_accepted(PendingDecision::Claim {
                kind,
                claim: claim.id,
                pool: claim.reference_id,
                attester: claim.attester,
            }),
            (Decision::Accept, None) => {}
            (Decision::Reject(reason), _) => {
                self.telemetry.record_accept_decision(kind, &decision);
                tracing::debug!(
                    target: "attestpool.router",
                    claim_id = %claim.id,
                    kind = kind.map_or("unknown", ClaimKind::as_str),
                    pool = %claim.reference_id,
                    attester = %claim.attester,
                    reason = reason.as_str(),
                    "claim rejected"
                );
            }
        }
        decision
    }

    pub(crate) fn publish_accepted(&self, decision: PendingDecision) {
        match decision {
            PendingDecision::Claim {
                kind,
                claim,
                pool,
                attester,
            } => {
                self.telemetry
                    .record_accept_decision(Some(kind), &Decision::Accept);
                tracing::info!(
                    target: "attestpool.router",
                    claim_id = %claim,
                    kind = kind.as_str(),
                    %pool,
                    %attester,
                    "claim accepted"
                );
            }
            PendingDecision::Revocation {
                kind,
                claim,
                attester,
            } => {
                self.telemetry
                    .record_revoke_decision(Some(kind), &Decision::Accept);
                tracing::info!(
                    target: "attestpool.router",
                    claim_id = %claim,
                    kind = kind.as_str(),
                    %attester,
                    "revocation accepted"
                );
            }
        }
    }
}
