//! Crowdfunding ledger core.
//!
//! The crate exposes:
//! - [`FundController`]: serialized funding/withdrawal surface over the ledger state.
//! - [`LedgerState`]: contribution mapping, funder registry, and held balance.
//! - [`BalanceSink`] / [`CreditWallet`]: outbound transfer seam used by withdrawals.

pub mod account;
pub mod config;
pub mod controller;
pub mod error;
pub mod ledger;
pub mod wallet;

pub use account::{AccountId, ACCOUNT_ID_LEN};
pub use config::{LedgerConfig, DEFAULT_MINIMUM_USD};
pub use controller::{DrainStrategy, FundController};
pub use error::{LedgerError, Result};
pub use ledger::LedgerState;
pub use wallet::{BalanceSink, BoxError, CreditWallet};
