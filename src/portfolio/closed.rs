//! Closed-trades ledger
//!
//! Append-only record of realized sale legs. Rows are never mutated or
//! deleted once committed; the only sanctioned update is clearing a leg's
//! write-ahead pending marker after the matching position reduction has
//! been persisted.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::portfolio::types::ClosedTradeLeg;
use crate::portfolio::PortfolioError;
use crate::storage::LedgerStore;

pub struct ClosedTradeLedger {
    store: Arc<dyn LedgerStore>,
    legs: Vec<ClosedTradeLeg>,
}

impl ClosedTradeLedger {
    /// Load the ledger from the store
    pub fn load(store: Arc<dyn LedgerStore>) -> Result<Self, PortfolioError> {
        let legs = store.load_closed_trades()?;
        Ok(Self { store, legs })
    }

    pub fn legs(&self) -> &[ClosedTradeLeg] {
        &self.legs
    }

    /// Legs whose position reduction has not been confirmed yet
    pub fn pending_legs(&self) -> Vec<ClosedTradeLeg> {
        self.legs.iter().filter(|l| l.pending).cloned().collect()
    }

    /// Append a realized leg and persist
    pub fn record(&mut self, leg: ClosedTradeLeg) -> Result<(), PortfolioError> {
        if leg.qty_sold == 0 {
            return Err(PortfolioError::InvalidQuantity(
                "non-positive".to_string(),
            ));
        }
        if leg.sell_price <= Decimal::ZERO {
            return Err(PortfolioError::InvalidPrice(leg.sell_price));
        }

        info!(
            ticker = %leg.ticker,
            leg_id = %leg.leg_id,
            qty_sold = leg.qty_sold,
            pnl_final = %leg.pnl_final,
            "Recorded closed trade leg"
        );
        self.legs.push(leg);
        self.persist()
    }

    /// Clear one leg's pending marker and persist
    pub fn commit(&mut self, leg_id: Uuid) -> Result<(), PortfolioError> {
        let leg = self
            .legs
            .iter_mut()
            .find(|l| l.leg_id == leg_id)
            .ok_or_else(|| {
                PortfolioError::Storage(anyhow::anyhow!("no closed leg with id {}", leg_id))
            })?;
        leg.pending = false;
        self.persist()
    }

    fn persist(&self) -> Result<(), PortfolioError> {
        self.store.save_closed_trades(&self.legs)?;
        Ok(())
    }
}
