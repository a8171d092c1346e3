// Copyright (c) 2026 attestpool contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};

use attestpool_core::collaborator::Treasury;
use attestpool_core::error::TreasuryError;
use attestpool_core::types::{Address, Amount};

/// Native balances of external accounts plus the value held by the engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryTreasury {
    accounts: BTreeMap<Address, Amount>,
    held: Amount,
    refusing: BTreeSet<Address>,
}

impl MemoryTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fund(&mut self, account: Address, amount: Amount) -> Result<Amount, TreasuryError> {
        let entry = self.accounts.entry(account).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(TreasuryError::Overflow)?;
        Ok(*entry)
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.accounts.get(account).copied().unwrap_or(0)
    }

    /// Value currently in engine custody.
    pub fn held(&self) -> Amount {
        self.held
    }

    /// Makes every payout to `account` fail, like a recipient that rejects
    /// incoming value.
    pub fn refuse_payouts_to(&mut self, account: Address) {
        self.refusing.insert(account);
    }

    pub fn accept_payouts_to(&mut self, account: &Address) {
        self.refusing.remove(account);
    }
}

impl Treasury for MemoryTreasury {
    fn receive(&mut self, from: Address, amount: Amount) -> Result<(), TreasuryError> {
        let available = self.balance_of(&from);
        if amount > available {
            return Err(TreasuryError::InsufficientFunds {
                requested: amount,
                available,
            });
        }
        let held = self.held.checked_add(amount).ok_or(TreasuryError::Overflow)?;
        self.accounts.insert(from, available - amount);
        self.held = held;
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
        let credited = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or(TreasuryError::Overflow)?;
        self.held -= amount;
        self.accounts.insert(to, credited);
        Ok(())
    }
}
