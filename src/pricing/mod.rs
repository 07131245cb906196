//! Live market price lookup
//!
//! The engine only ever sees `Option<Decimal>`: an unavailable price is a
//! valid state that clears the live valuation fields, never an error.

use async_trait::async_trait;
use rust_decimal::Decimal;

mod yahoo;

pub use yahoo::YahooPriceSource;

/// Source of live spot prices
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current price for a normalized ticker.
    ///
    /// Returns None for any failure: rate limiting, non-2xx status,
    /// malformed payload, unknown ticker, or network error.
    async fn fetch(&self, ticker: &str) -> Option<Decimal>;
}
