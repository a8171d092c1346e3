// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Amount, ClaimId, PoolId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("insufficient pool balance: requested {requested}, available {available}")]
    Insufficient { requested: Amount, available: Amount },

    #[error("balance overflow")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyEventKind {
    Deposit,
    Payout,
    Unallocated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyEvent {
    pub kind: CustodyEventKind,
    pub pool: PoolId,
    pub claim: ClaimId,
    pub amount: Amount,
}

/// Per-pool balances of value held by the engine.
///
/// `sum(balances) + unallocated` is the value received minus the value paid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyLedger {
    balances: BTreeMap<PoolId, Amount>,
    unallocated: Amount,
    events: Vec<CustodyEvent>,
}

impl CustodyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, pool: &PoolId) -> Amount {
        self.balances.get(pool).copied().unwrap_or(0)
    }

    pub fn unallocated(&self) -> Amount {
        self.unallocated
    }

    pub fn events(&self) -> &[CustodyEvent] {
        &self.events
    }

    pub fn total_held(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(self.unallocated, |acc, b| acc.checked_add(*b))
    }

    /// Credits `amount` to `pool` and returns the new balance.
    pub fn deposit(&mut self, pool: PoolId, claim: ClaimId, amount: Amount) -> Result<Amount, CustodyError> {
        let next = credit(self.balance(&pool), amount)?;
        self.balances.insert(pool, next);
        self.events.push(event(CustodyEventKind::Deposit, pool, claim, amount));
        Ok(next)
    }

    /// Debits `amount` from `pool` and returns the remaining balance. Never
    /// takes a balance below zero.
    pub fn withdraw(&mut self, pool: PoolId, claim: ClaimId, amount: Amount) -> Result<Amount, CustodyError> {
        let next = debit(self.balance(&pool), amount)?;
        self.balances.insert(pool, next);
        self.events.push(event(CustodyEventKind::Payout, pool, claim, amount));
        Ok(next)
    }

    /// Records value received with a claim that credits no pool.
    pub fn hold_unallocated(&mut self, pool: PoolId, claim: ClaimId, amount: Amount) -> Result<Amount, CustodyError> {
        if amount == 0 {
            return Ok(self.unallocated);
        }
        self.unallocated = credit(self.unallocated, amount)?;
        self.events.push(event(CustodyEventKind::Unallocated, pool, claim, amount));
        Ok(self.unallocated)
    }
}

fn credit(current: Amount, amount: Amount) -> Result<Amount, CustodyError> {
    if amount == 0 {
        return Err(CustodyError::ZeroAmount);
    }
    current.checked_add(amount).ok_or(CustodyError::Overflow)
}

fn debit(current: Amount, amount: Amount) -> Result<Amount, CustodyError> {
    if amount == 0 {
        return Err(CustodyError::ZeroAmount);
    }
    if amount > current {
        return Err(CustodyError::Insufficient {
            requested: amount,
            available: current,
        });
    }
    Ok(current - amount)
}

fn event(kind: CustodyEventKind, pool: PoolId, claim: ClaimId, amount: Amount) -> CustodyEvent {
    CustodyEvent {
        kind,
        pool,
        claim,
        amount,
    }
}

/// Balance changes and journal entries staged by one call against a
/// [`CustodyLedger`]. Only touched pools are copied; the journal is appended
/// on merge.
#[derive(Debug, Default)]
pub(crate) struct CustodyOverlay {
    balances: BTreeMap<PoolId, Amount>,
    unallocated: Option<Amount>,
    events: Vec<CustodyEvent>,
}

impl CustodyOverlay {
    pub(crate) fn balance(&self, base: &CustodyLedger, pool: &PoolId) -> Amount {
        self.balances
            .get(pool)
            .copied()
            .unwrap_or_else(|| base.balance(pool))
    }

    pub(crate) fn deposit(
        &mut self,
        base: &CustodyLedger,
        pool: PoolId,
        claim: ClaimId,
        amount: Amount,
    ) -> Result<Amount, CustodyError> {
        let next = credit(self.balance(base, &pool), amount)?;
        self.balances.insert(pool, next);
        self.events.push(event(CustodyEventKind::Deposit, pool, claim, amount));
        Ok(next)
    }

    pub(crate) fn withdraw(
        &mut self,
        base: &CustodyLedger,
        pool: PoolId,
        claim: ClaimId,
        amount: Amount,
    ) -> Result<Amount, CustodyError> {
        let next = debit(self.balance(base, &pool), amount)?;
        self.balances.insert(pool, next);
        self.events.push(event(CustodyEventKind::Payout, pool, claim, amount));
        Ok(next)
    }

    pub(crate) fn hold_unallocated(
        &mut self,
        base: &CustodyLedger,
        pool: PoolId,
        claim: ClaimId,
        amount: Amount,
    ) -> Result<Amount, CustodyError> {
        let current = self.unallocated.unwrap_or(base.unallocated);
        if amount == 0 {
            return Ok(current);
        }
        let next = credit(current, amount)?;
        self.unallocated = Some(next);
        self.events.push(event(CustodyEventKind::Unallocated, pool, claim, amount));
        Ok(next)
    }

    pub(crate) fn merge_into(self, base: &mut CustodyLedger) {
        base.balances.extend(self.balances);
        if let Some(unallocated) = self.unallocated {
            base.unallocated = unallocated;
        }
        base.events.extend(self.events);
    }
}
