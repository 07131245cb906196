//! Open-positions ledger
//!
//! Holds the current set of open lots and owns creation, live-valuation
//! write-through and mutation on sale. Every mutating call persists the
//! whole ledger through the injected store before returning.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::portfolio::types::{Position, ReduceOutcome};
use crate::portfolio::PortfolioError;
use crate::storage::LedgerStore;

pub struct PositionLedger {
    store: Arc<dyn LedgerStore>,
    positions: Vec<Position>,
}

impl PositionLedger {
    /// Load the ledger from the store
    pub fn load(store: Arc<dyn LedgerStore>) -> Result<Self, PortfolioError> {
        let positions = store.load_positions()?;
        Ok(Self { store, positions })
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn by_lot(&self, lot_id: Uuid) -> Option<&Position> {
        self.positions.iter().find(|p| p.lot_id == lot_id)
    }

    /// Open a new lot and persist the ledger
    pub fn open(
        &mut self,
        ticker: &str,
        buy_price: Decimal,
        qty: u32,
        date_buy: NaiveDate,
    ) -> Result<Position, PortfolioError> {
        if ticker.trim().is_empty() {
            return Err(PortfolioError::InvalidInput(
                "ticker must not be empty".to_string(),
            ));
        }
        if buy_price <= Decimal::ZERO {
            return Err(PortfolioError::InvalidInput(format!(
                "buy price must be positive, got {}",
                buy_price
            )));
        }
        if qty == 0 {
            return Err(PortfolioError::InvalidInput(
                "quantity must be positive".to_string(),
            ));
        }

        let position = Position::new(ticker.to_string(), buy_price, qty, date_buy);
        self.positions.push(position.clone());
        self.persist()?;

        info!(
            ticker = %position.ticker,
            lot_id = %position.lot_id,
            qty,
            %buy_price,
            "Opened position"
        );
        Ok(position)
    }

    /// Locate the unique open lot for a ticker.
    ///
    /// More than one open lot is refused loudly rather than silently picking
    /// one; the caller can address a specific lot by id instead.
    pub fn find_open(&self, ticker: &str) -> Result<&Position, PortfolioError> {
        let mut matches = self.positions.iter().filter(|p| p.ticker == ticker);

        let first = matches
            .next()
            .ok_or_else(|| PortfolioError::NoOpenPosition(ticker.to_string()))?;

        let rest: Vec<&Position> = matches.collect();
        if !rest.is_empty() {
            let lot_ids = std::iter::once(first)
                .chain(rest)
                .map(|p| p.lot_id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(PortfolioError::AmbiguousPosition {
                ticker: ticker.to_string(),
                lot_ids,
            });
        }

        Ok(first)
    }

    /// Write a fetched price (or its absence) through to one lot's live
    /// valuation fields. Does not persist; the caller persists once per
    /// refresh batch.
    pub fn refresh_valuation(
        &mut self,
        lot_id: Uuid,
        price: Option<Decimal>,
    ) -> Result<(), PortfolioError> {
        let position = self
            .positions
            .iter_mut()
            .find(|p| p.lot_id == lot_id)
            .ok_or(PortfolioError::LotNotFound(lot_id))?;
        position.refresh_valuation(price);
        Ok(())
    }

    /// Reduce a lot by a sold quantity and persist.
    ///
    /// Selling the full remaining quantity removes the lot from the ledger;
    /// a partial sale shrinks it in place and leaves the live valuation
    /// fields stale until the next refresh.
    pub fn reduce(&mut self, lot_id: Uuid, qty_delta: u32) -> Result<ReduceOutcome, PortfolioError> {
        let index = self
            .positions
            .iter()
            .position(|p| p.lot_id == lot_id)
            .ok_or(PortfolioError::LotNotFound(lot_id))?;

        if qty_delta == 0 {
            return Err(PortfolioError::InvalidQuantity(
                "non-positive".to_string(),
            ));
        }

        let held = self.positions[index].qty;
        if qty_delta > held {
            return Err(PortfolioError::InvalidQuantity(format!(
                "exceeds holdings ({} > {})",
                qty_delta, held
            )));
        }

        let outcome = if qty_delta == held {
            let removed = self.positions.remove(index);
            info!(ticker = %removed.ticker, lot_id = %lot_id, "Position fully closed");
            ReduceOutcome::FullyClosed
        } else {
            let position = &mut self.positions[index];
            position.qty -= qty_delta;
            position.buy_amount = position.buy_price * Decimal::from(position.qty);
            info!(
                ticker = %position.ticker,
                lot_id = %lot_id,
                remaining_qty = position.qty,
                "Position partially closed"
            );
            ReduceOutcome::PartiallyClosed
        };

        self.persist()?;
        Ok(outcome)
    }

    /// Persist the whole ledger through the store
    pub fn persist(&self) -> Result<(), PortfolioError> {
        self.store.save_positions(&self.positions)?;
        Ok(())
    }
}
