// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::{Address, ClaimId, PoolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipKind {
    Invite,
    Block,
}

impl MembershipKind {
    pub const ALL: [MembershipKind; 2] = [MembershipKind::Invite, MembershipKind::Block];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invite => "invite",
            Self::Block => "block",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct MemberSets {
    invites: BTreeSet<ClaimId>,
    blocks: BTreeSet<ClaimId>,
}

impl MemberSets {
    fn set(&self, kind: MembershipKind) -> &BTreeSet<ClaimId> {
        match kind {
            MembershipKind::Invite => &self.invites,
            MembershipKind::Block => &self.blocks,
        }
    }

    fn set_mut(&mut self, kind: MembershipKind) -> &mut BTreeSet<ClaimId> {
        match kind {
            MembershipKind::Invite => &mut self.invites,
            MembershipKind::Block => &mut self.blocks,
        }
    }

    fn is_empty(&self) -> bool {
        self.invites.is_empty() && self.blocks.is_empty()
    }
}

/// Per-pool, per-address invite and block claim ids.
///
/// Status queries read raw set membership. Entries whose claim has expired
/// keep counting until [`crate::sweeper`] removes them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipLedger {
    entries: BTreeMap<(PoolId, Address), MemberSets>,
}

impl MembershipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the claim id was already present.
    pub fn insert(
        &mut self,
        kind: MembershipKind,
        pool: PoolId,
        holder: Address,
        claim: ClaimId,
    ) -> bool {
        self.entries
            .entry((pool, holder))
            .or_default()
            .set_mut(kind)
            .insert(claim)
    }

    /// Returns false if the claim id was not present.
    pub fn remove(
        &mut self,
        kind: MembershipKind,
        pool: PoolId,
        holder: Address,
        claim: &ClaimId,
    ) -> bool {
        let key = (pool, holder);
        let Some(sets) = self.entries.get_mut(&key) else {
            return false;
        };
        let removed = sets.set_mut(kind).remove(claim);
        if sets.is_empty() {
            self.entries.remove(&key);
        }
        removed
    }

    /// Drops every entry of `kind` for which `expired` returns true and
    /// returns how many were dropped.
    pub fn remove_where<F>(
        &mut self,
        kind: MembershipKind,
        pool: PoolId,
        holder: Address,
        mut expired: F,
    ) -> usize
    where
        F: FnMut(&ClaimId) -> bool,
    {
        let key = (pool, holder);
        let Some(sets) = self.entries.get_mut(&key) else {
            return 0;
        };
        let set = sets.set_mut(kind);
        let before = set.len();
        set.retain(|id| !expired(id));
        let removed = before - set.len();
        if sets.is_empty() {
            self.entries.remove(&key);
        }
        removed
    }

    pub fn contains(&self, kind: MembershipKind, pool: PoolId, holder: Address, claim: &ClaimId) -> bool {
        self.entries
            .get(&(pool, holder))
            .is_some_and(|sets| sets.set(kind).contains(claim))
    }

    pub fn claims(&self, kind: MembershipKind, pool: PoolId, holder: Address) -> Vec<ClaimId> {
        self.entries
            .get(&(pool, holder))
            .map(|sets| sets.set(kind).iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_invited(&self, pool: PoolId, holder: Address) -> bool {
        self.has_any(MembershipKind::Invite, pool, holder)
    }

    pub fn is_blocked(&self, pool: PoolId, holder: Address) -> bool {
        self.has_any(MembershipKind::Block, pool, holder)
    }

    /// Invited and not blocked.
    pub fn is_member(&self, pool: PoolId, holder: Address) -> bool {
        self.is_invited(pool, holder) && !self.is_blocked(pool, holder)
    }

    fn has_any(&self, kind: MembershipKind, pool: PoolId, holder: Address) -> bool {
        self.entries
            .get(&(pool, holder))
            .is_some_and(|sets| !sets.set(kind).is_empty())
    }
}

/// Writes one call makes against a [`MembershipLedger`].
///
/// A `(pool, holder)` entry is copied from the base the first time the call
/// touches it, so staging costs grow with what the call changes rather than
/// with the size of the ledger.
#[derive(Debug, Default)]
pub(crate) struct MembershipOverlay {
    touched: BTreeMap<(PoolId, Address), MemberSets>,
}

impl MembershipOverlay {
    fn sets<'a>(
        &'a self,
        base: &'a MembershipLedger,
        pool: PoolId,
        holder: Address,
    ) -> Option<&'a MemberSets> {
        let key = (pool, holder);
        self.touched.get(&key).or_else(|| base.entries.get(&key))
    }

    fn sets_mut(&mut self, base: &MembershipLedger, pool: PoolId, holder: Address) -> &mut MemberSets {
        let key = (pool, holder);
        self.touched
            .entry(key)
            .or_insert_with(|| base.entries.get(&key).cloned().unwrap_or_default())
    }

    pub(crate) fn is_member(&self, base: &MembershipLedger, pool: PoolId, holder: Address) -> bool {
        self.sets(base, pool, holder).is_some_and(|sets| {
            !sets.set(MembershipKind::Invite).is_empty() && sets.set(MembershipKind::Block).is_empty()
        })
    }

    pub(crate) fn insert(
        &mut self,
        base: &MembershipLedger,
        kind: MembershipKind,
        pool: PoolId,
        holder: Address,
        claim: ClaimId,
    ) -> bool {
        self.sets_mut(base, pool, holder).set_mut(kind).insert(claim)
    }

    pub(crate) fn remove(
        &mut self,
        base: &MembershipLedger,
        kind: MembershipKind,
        pool: PoolId,
        holder: Address,
        claim: &ClaimId,
    ) -> bool {
        self.sets_mut(base, pool, holder).set_mut(kind).remove(claim)
    }

    pub(crate) fn merge_into(self, base: &mut MembershipLedger) {
        for (key, sets) in self.touched {
            if sets.is_empty() {
                base.entries.remove(&key);
            } else {
                base.entries.insert(key, sets);
            }
        }
    }
}
