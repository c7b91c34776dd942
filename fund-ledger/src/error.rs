use price_feed::PriceFeedError;
use thiserror::Error;

use crate::{account::AccountId, wallet::BoxError};

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("contribution worth {value_usd} usd-1e18 is below the {minimum_usd} minimum")]
    InsufficientContribution { value_usd: u128, minimum_usd: u128 },
    #[error("caller {caller} is not the owner")]
    NotOwner { caller: AccountId },
    #[error("funder index {index} out of range (registry has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("contribution of {amount} overflows the ledger totals")]
    ContributionOverflow { amount: u128 },
    #[error("balance transfer to owner failed: {source}")]
    TransferFailed {
        #[source]
        source: BoxError,
    },
    #[error("price feed error: {0}")]
    PriceFeed(#[from] PriceFeedError),
}
