//! Outbound side of a withdrawal.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::account::AccountId;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Receives the swept balance. The recipient may reject the credit, in which
/// case the withdrawal as a whole must not land.
pub trait BalanceSink: Send + Sync {
    fn credit(&self, account: AccountId, amount: u128) -> Result<(), BoxError>;
}

/// In-memory wallet keeping a per-account balance.
#[derive(Default)]
pub struct CreditWallet {
    balances: Mutex<HashMap<AccountId, u128>>,
}

impl CreditWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, account: AccountId) -> u128 {
        self.balances.lock().get(&account).copied().unwrap_or(0)
    }
}

impl BalanceSink for CreditWallet {
    fn credit(&self, account: AccountId, amount: u128) -> Result<(), BoxError> {
        let mut balances = self.balances.lock();
        let entry = balances.entry(account).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| -> BoxError { format!("wallet balance overflow for {account}").into() })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credits_accumulate() {
        let wallet = CreditWallet::new();
        let account = AccountId::from_low_u64(1);
        wallet.credit(account, 40).unwrap();
        wallet.credit(account, 2).unwrap();
        assert_eq!(wallet.balance(account), 42);
        assert_eq!(wallet.balance(AccountId::from_low_u64(2)), 0);
    }

    #[test]
    fn overflowing_credit_is_rejected() {
        let wallet = CreditWallet::new();
        let account = AccountId::from_low_u64(1);
        wallet.credit(account, u128::MAX).unwrap();
        assert!(wallet.credit(account, 1).is_err());
        assert_eq!(wallet.balance(account), u128::MAX);
    }
}
