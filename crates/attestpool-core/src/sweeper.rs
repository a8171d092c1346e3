// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::collaborator::ClaimStore;
use crate::membership::{MembershipKind, MembershipLedger};
use crate::types::{Address, PoolId, Timestamp};

/// Entries dropped by one sweep of a `(pool, holder)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub invites_removed: usize,
    pub blocks_removed: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.invites_removed == 0 && self.blocks_removed == 0
    }

    pub fn total(&self) -> usize {
        self.invites_removed + self.blocks_removed
    }
}

/// Removes every invite and block entry of `holder` in `pool` whose claim
/// expired strictly before `now`. Claims the store no longer knows are kept.
pub(crate) fn sweep<S: ClaimStore + ?Sized>(
    membership: &mut MembershipLedger,
    store: &S,
    pool: PoolId,
    holder: Address,
    now: Timestamp,
) -> SweepReport {
    let mut removed = [0usize; 2];
    for (slot, kind) in MembershipKind::ALL.into_iter().enumerate() {
        removed[slot] = membership.remove_where(kind, pool, holder, |id| {
            store
                .get_claim(id)
                .is_some_and(|claim| claim.is_expired_at(now))
        });
    }
    SweepReport {
        invites_removed: removed[0],
        blocks_removed: removed[1],
    }
}
