//! Price-oracle seam for the funding ledger.
//!
//! Contributions are valued in USD before they are accepted. This crate owns
//! the oracle-facing [`PriceFeed`] trait, the [`PriceQuote`] value type, and
//! the fixed-point rescaling that makes quotes at arbitrary decimal precision
//! comparable against a USD floor expressed at [`USD_DECIMALS`].

use parking_lot::Mutex;
use thiserror::Error;

/// Fixed-point precision every USD comparison is performed at. Native-currency
/// amounts are expected at the same precision (1e18 base units per whole unit).
pub const USD_DECIMALS: u32 = 18;

/// Widest decimal declaration a quote may carry before the rescaling factor
/// stops fitting in u128.
pub const MAX_QUOTE_DECIMALS: u32 = 38;

pub type Result<T> = std::result::Result<T, PriceFeedError>;

#[derive(Debug, Error)]
pub enum PriceFeedError {
    #[error("price feed unavailable: {0}")]
    Unavailable(String),
    #[error("quote declares {decimals} decimals, max supported is {MAX_QUOTE_DECIMALS}")]
    InvalidDecimals { decimals: u32 },
    #[error("usd conversion overflow for amount {amount}")]
    ValueOverflow { amount: u128 },
}

/// Latest oracle observation: a scaled integer price and the fixed-point
/// precision it was scaled to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: u128,
    pub decimals: u32,
}

impl PriceQuote {
    pub fn new(price: u128, decimals: u32) -> Self {
        Self { price, decimals }
    }
}

/// Read-only external collaborator queried synchronously during funding.
pub trait PriceFeed: Send + Sync {
    fn latest_quote(&self) -> Result<PriceQuote>;
}

/// USD-equivalent of `amount` native base units under `quote`, at
/// [`USD_DECIMALS`] fixed point.
///
/// `amount * price / 10^decimals` is algebraically the same as rescaling the
/// price to 18 decimals first and dividing the product by 1e18. The product
/// of an 18-decimal amount and an 18-decimal price does not fit in u128, so
/// the multiplication runs at full 256-bit width; only a quotient outside
/// u128 is an error.
pub fn usd_value(amount: u128, quote: &PriceQuote) -> Result<u128> {
    if quote.decimals > MAX_QUOTE_DECIMALS {
        return Err(PriceFeedError::InvalidDecimals {
            decimals: quote.decimals,
        });
    }
    mul_div(amount, quote.price, 10u128.pow(quote.decimals))
        .ok_or(PriceFeedError::ValueOverflow { amount })
}

/// `(a * b) / denom` with a 256-bit intermediate product. `None` when the
/// quotient itself exceeds u128.
fn mul_div(a: u128, b: u128, denom: u128) -> Option<u128> {
    let (hi, lo) = widening_mul(a, b);
    if hi == 0 {
        return Some(lo / denom);
    }
    if hi >= denom {
        return None;
    }
    // Restoring long division of (hi, lo) by denom, one bit of `lo` at a
    // time. `rem` stays below denom, so the shifted value is below 2*denom
    // and a single conditional subtraction restores it.
    let mut rem = hi;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= denom {
            rem = rem.wrapping_sub(denom);
            quot |= 1;
        }
    }
    Some(quot)
}

fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    const MASK: u128 = (1 << 64) - 1;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);
    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;
    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let lo = (mid << 64) | (ll & MASK);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// In-memory feed with an updatable quote. Stands in for a live aggregator in
/// tests and local wiring.
pub struct FixedPriceFeed {
    quote: Mutex<PriceQuote>,
}

impl FixedPriceFeed {
    pub fn new(quote: PriceQuote) -> Self {
        Self {
            quote: Mutex::new(quote),
        }
    }

    pub fn set_quote(&self, quote: PriceQuote) {
        *self.quote.lock() = quote;
    }
}

impl PriceFeed for FixedPriceFeed {
    fn latest_quote(&self) -> Result<PriceQuote> {
        Ok(*self.quote.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_E18: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn eight_decimal_quote_rescales() {
        // 2000 USD per unit at 8 decimals.
        let quote = PriceQuote::new(2_000_00000000, 8);
        let value = usd_value(ONE_E18, &quote).unwrap();
        assert_eq!(value, 2_000 * ONE_E18);

        // 0.03 units is worth 60 USD.
        let value = usd_value(3 * ONE_E18 / 100, &quote).unwrap();
        assert_eq!(value, 60 * ONE_E18);
    }

    #[test]
    fn eighteen_and_wider_decimal_quotes_agree() {
        let amount = 5 * ONE_E18 / 10;
        let at_18 = usd_value(amount, &PriceQuote::new(1_500 * ONE_E18, 18)).unwrap();
        let at_20 = usd_value(amount, &PriceQuote::new(1_500 * ONE_E18 * 100, 20)).unwrap();
        assert_eq!(at_18, at_20);
        assert_eq!(at_18, 750 * ONE_E18);
    }

    #[test]
    fn eighteen_decimal_quote_uses_the_full_width_product() {
        // 1 unit at 2000 USD, both sides at 18 decimals: the intermediate
        // product is 2e39 and only fits at 256-bit width.
        let quote = PriceQuote::new(2_000 * ONE_E18, 18);
        assert_eq!(usd_value(ONE_E18, &quote).unwrap(), 2_000 * ONE_E18);
        assert_eq!(
            usd_value(7 * ONE_E18 / 4, &quote).unwrap(),
            3_500 * ONE_E18
        );
    }

    #[test]
    fn mul_div_is_exact_on_wide_products() {
        assert_eq!(mul_div(u128::MAX, 1_000, 1_000), Some(u128::MAX));
        assert_eq!(mul_div(u128::MAX, 6, 3), None);
        assert_eq!(mul_div(1u128 << 100, 1u128 << 27, 1u128 << 7), Some(1u128 << 120));
        assert_eq!(mul_div(0, u128::MAX, 7), Some(0));
    }

    #[test]
    fn overflow_is_reported() {
        let quote = PriceQuote::new(u128::MAX / 2, 8);
        let err = usd_value(ONE_E18, &quote).unwrap_err();
        assert!(matches!(err, PriceFeedError::ValueOverflow { .. }));
    }

    #[test]
    fn absurd_decimal_declaration_is_rejected() {
        let quote = PriceQuote::new(1, 39);
        let err = usd_value(ONE_E18, &quote).unwrap_err();
        assert!(matches!(err, PriceFeedError::InvalidDecimals { decimals: 39 }));
    }

    #[test]
    fn fixed_feed_serves_updated_quotes() {
        let feed = FixedPriceFeed::new(PriceQuote::new(100, 8));
        assert_eq!(feed.latest_quote().unwrap(), PriceQuote::new(100, 8));
        feed.set_quote(PriceQuote::new(200, 8));
        assert_eq!(feed.latest_quote().unwrap(), PriceQuote::new(200, 8));
    }
}
