use std::sync::Arc;

use log::{info, warn};
use parking_lot::Mutex;
use price_feed::PriceFeed;

use crate::{
    account::AccountId,
    config::LedgerConfig,
    error::{LedgerError, Result},
    ledger::LedgerState,
    wallet::BalanceSink,
};

/// How the drain loop walks the funder registry.
///
/// Both strategies zero the same entries in the same (insertion) order;
/// `Snapshot` copies the registry once up front instead of re-reading the
/// live sequence on every step. End states are identical either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainStrategy {
    ReadThrough,
    Snapshot,
}

/// Funding and withdrawal surface.
///
/// One mutex guards ledger, registry, and balance together, so `fund`,
/// `withdraw`, and `cheaper_withdraw` serialize against each other and no
/// caller ever observes a partially-applied operation.
pub struct FundController {
    config: LedgerConfig,
    owner: AccountId,
    price_feed: Arc<dyn PriceFeed>,
    sink: Arc<dyn BalanceSink>,
    state: Mutex<LedgerState>,
}

impl FundController {
    /// The creating caller becomes the owner; the feed and sink references
    /// are fixed for the lifetime of the controller.
    pub fn new(
        config: LedgerConfig,
        owner: AccountId,
        price_feed: Arc<dyn PriceFeed>,
        sink: Arc<dyn BalanceSink>,
    ) -> Self {
        Self {
            config,
            owner,
            price_feed,
            sink,
            state: Mutex::new(LedgerState::new()),
        }
    }

    /// Accept `amount` native base units from `from` if their USD-equivalent
    /// under the feed's current quote meets the configured floor.
    ///
    /// Returns the contributor's new cumulative total. Not idempotent: every
    /// accepted call increments the ledger and appends to the registry.
    pub fn fund(&self, from: AccountId, amount: u128) -> Result<u128> {
        let quote = self.price_feed.latest_quote()?;
        let value_usd = price_feed::usd_value(amount, &quote)?;
        if value_usd < self.config.minimum_usd {
            return Err(LedgerError::InsufficientContribution {
                value_usd,
                minimum_usd: self.config.minimum_usd,
            });
        }
        let mut state = self.state.lock();
        let total = state.record_contribution(from, amount)?;
        info!(
            "[{}] accepted {} from {} ({} usd-1e18, cumulative {})",
            self.config.label, amount, from, value_usd, total
        );
        Ok(total)
    }

    /// Sweep the full balance to the owner, zeroing every registry entry's
    /// ledger amount and emptying the registry. Returns the swept amount.
    pub fn withdraw(&self, caller: AccountId) -> Result<u128> {
        self.drain(caller, DrainStrategy::ReadThrough)
    }

    /// Behaviorally identical to [`withdraw`](Self::withdraw); iterates a
    /// transient copy of the registry instead of the live sequence.
    pub fn cheaper_withdraw(&self, caller: AccountId) -> Result<u128> {
        self.drain(caller, DrainStrategy::Snapshot)
    }

    fn drain(&self, caller: AccountId, strategy: DrainStrategy) -> Result<u128> {
        if caller != self.owner {
            return Err(LedgerError::NotOwner { caller });
        }
        let mut state = self.state.lock();
        let rollback = state.clone();
        match strategy {
            DrainStrategy::ReadThrough => {
                // Re-reads the live registry length and entry on every step.
                let mut index = 0;
                while index < state.funder_count() {
                    let funder = state.funders()[index];
                    state.zero_entry(funder);
                    index += 1;
                }
            }
            DrainStrategy::Snapshot => {
                let funders = state.funders().to_vec();
                for funder in funders {
                    state.zero_entry(funder);
                }
            }
        }
        state.clear_registry();
        let amount = state.take_balance();
        if let Err(source) = self.sink.credit(self.owner, amount) {
            *state = rollback;
            warn!(
                "[{}] withdrawal transfer of {} rejected: {}",
                self.config.label, amount, source
            );
            return Err(LedgerError::TransferFailed { source });
        }
        info!(
            "[{}] swept {} to owner {} via {:?}",
            self.config.label, amount, self.owner, strategy
        );
        Ok(amount)
    }

    /// Cumulative amount contributed by `account`; zero when never seen.
    pub fn amount_funded(&self, account: AccountId) -> u128 {
        self.state.lock().amount_funded(account)
    }

    pub fn funder(&self, index: usize) -> Result<AccountId> {
        self.state.lock().funder(index)
    }

    pub fn funder_count(&self) -> usize {
        self.state.lock().funder_count()
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn price_feed(&self) -> Arc<dyn PriceFeed> {
        Arc::clone(&self.price_feed)
    }

    pub fn balance(&self) -> u128 {
        self.state.lock().balance()
    }

    /// Sum of all ledger entries; equals [`balance`](Self::balance) between
    /// operations.
    pub fn ledger_sum(&self) -> u128 {
        self.state.lock().ledger_sum()
    }
}
