//! Mutable ledger state: contribution mapping, funder registry, held balance.
//!
//! Always owned behind the controller's mutex; methods here assume exclusive
//! access and never touch the outside world. Between operations the held
//! balance equals the sum of all ledger entries.

use std::collections::HashMap;

use crate::{
    account::AccountId,
    error::{LedgerError, Result},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LedgerState {
    entries: HashMap<AccountId, u128>,
    funders: Vec<AccountId>,
    balance: u128,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted contribution. The registry append is unconditional:
    /// repeat contributions from one identity leave duplicate registry
    /// entries, and the drain loop tolerates the redundant zeroing.
    ///
    /// Both totals are checked before anything is written, so an overflowing
    /// contribution leaves ledger, registry, and balance untouched.
    ///
    /// Returns the contributor's new cumulative total.
    pub(crate) fn record_contribution(&mut self, from: AccountId, amount: u128) -> Result<u128> {
        let entry_total = self
            .amount_funded(from)
            .checked_add(amount)
            .ok_or(LedgerError::ContributionOverflow { amount })?;
        let balance_total = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::ContributionOverflow { amount })?;
        self.entries.insert(from, entry_total);
        self.funders.push(from);
        self.balance = balance_total;
        Ok(entry_total)
    }

    pub(crate) fn zero_entry(&mut self, funder: AccountId) {
        self.entries.insert(funder, 0);
    }

    pub(crate) fn clear_registry(&mut self) {
        self.funders.clear();
    }

    pub(crate) fn take_balance(&mut self) -> u128 {
        std::mem::take(&mut self.balance)
    }

    /// Cumulative amount contributed by `account`; zero when never seen.
    pub fn amount_funded(&self, account: AccountId) -> u128 {
        self.entries.get(&account).copied().unwrap_or(0)
    }

    pub fn funder(&self, index: usize) -> Result<AccountId> {
        self.funders
            .get(index)
            .copied()
            .ok_or(LedgerError::IndexOutOfRange {
                index,
                len: self.funders.len(),
            })
    }

    pub fn funder_count(&self) -> usize {
        self.funders.len()
    }

    /// Registry in insertion order, duplicates included.
    pub fn funders(&self) -> &[AccountId] {
        &self.funders
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Sum of all ledger entries.
    pub fn ledger_sum(&self) -> u128 {
        self.entries.values().sum()
    }
}
