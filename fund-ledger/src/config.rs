/// Default contribution floor: 50 USD at 1e18 fixed point.
pub const DEFAULT_MINIMUM_USD: u128 = 50_000_000_000_000_000_000;

#[derive(Clone, Debug)]
pub struct LedgerConfig {
    pub label: String,
    /// Minimum USD-equivalent per contribution, at [`price_feed::USD_DECIMALS`].
    pub minimum_usd: u128,
}

impl LedgerConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            minimum_usd: DEFAULT_MINIMUM_USD,
        }
    }

    pub fn with_minimum_usd(mut self, minimum_usd: u128) -> Self {
        self.minimum_usd = minimum_usd;
        self
    }
}
