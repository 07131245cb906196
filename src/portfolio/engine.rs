//! Portfolio orchestration
//!
//! The engine coordinates the open-positions ledger, the closed-trades
//! ledger and the price source. A sale is a two-ledger transaction: the
//! realized leg is persisted first with a write-ahead pending marker, the
//! position reduction second, and the marker is cleared last. A crash
//! between those writes is detectable (a pending leg survives) and
//! repairable through [`PortfolioEngine::reconcile`]. Single-process use is
//! a documented precondition; there is no cross-process locking.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::portfolio::closed::ClosedTradeLedger;
use crate::portfolio::ledger::PositionLedger;
use crate::portfolio::types::{percent_of, ClosedTradeLeg, Position, SummaryReport};
use crate::portfolio::PortfolioError;
use crate::pricing::PriceSource;
use crate::storage::LedgerStore;
use crate::ticker;

pub struct PortfolioEngine {
    positions: PositionLedger,
    closed: ClosedTradeLedger,
    prices: Arc<dyn PriceSource>,
}

/// Result of a reconciliation pass over pending closed legs
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Pending legs found
    pub pending: usize,
    /// Legs whose position reduction was applied now
    pub repaired: usize,
    /// Legs whose reduction was already applied; marker cleared only
    pub cleared: usize,
}

impl PortfolioEngine {
    /// Load both ledgers through the injected store
    pub fn load(
        store: Arc<dyn LedgerStore>,
        prices: Arc<dyn PriceSource>,
    ) -> Result<Self, PortfolioError> {
        Ok(Self {
            positions: PositionLedger::load(store.clone())?,
            closed: ClosedTradeLedger::load(store)?,
            prices,
        })
    }

    pub fn positions(&self) -> &[Position] {
        self.positions.positions()
    }

    pub fn closed_legs(&self) -> &[ClosedTradeLeg] {
        self.closed.legs()
    }

    /// Open a new lot. The ticker is normalized before it reaches the ledger.
    pub fn open_position(
        &mut self,
        raw_ticker: &str,
        buy_price: Decimal,
        qty: u32,
        date_buy: NaiveDate,
    ) -> Result<Position, PortfolioError> {
        if raw_ticker.trim().is_empty() {
            return Err(PortfolioError::InvalidInput(
                "ticker must not be empty".to_string(),
            ));
        }
        let symbol = ticker::normalize(raw_ticker);
        self.positions.open(&symbol, buy_price, qty, date_buy)
    }

    /// Refresh live valuation for every open lot.
    ///
    /// Each lot is refreshed independently; an unavailable price clears that
    /// lot's live fields and the batch carries on. The ledger is persisted
    /// once at the end.
    pub async fn refresh_live(&mut self) -> Result<(), PortfolioError> {
        let lots: Vec<(Uuid, String)> = self
            .positions
            .positions()
            .iter()
            .map(|p| (p.lot_id, p.ticker.clone()))
            .collect();

        let total = lots.len();
        let mut priced = 0usize;
        for (lot_id, symbol) in lots {
            let price = self.prices.fetch(&symbol).await;
            if price.is_some() {
                priced += 1;
            }
            self.positions.refresh_valuation(lot_id, price)?;
        }
        self.positions.persist()?;

        info!(total, priced, "Refreshed live valuations");
        Ok(())
    }

    /// Execute a sale end-to-end and return the committed leg.
    ///
    /// With multiple open lots for the ticker the caller must address one
    /// explicitly by `lot`; nothing is picked silently. All validation runs
    /// before either ledger is touched.
    pub fn sell(
        &mut self,
        raw_ticker: &str,
        qty_to_sell: u32,
        sell_price: Decimal,
        lot: Option<Uuid>,
    ) -> Result<ClosedTradeLeg, PortfolioError> {
        self.warn_pending();

        let symbol = ticker::normalize(raw_ticker);
        let position = match lot {
            Some(lot_id) => {
                let position = self
                    .positions
                    .by_lot(lot_id)
                    .ok_or(PortfolioError::LotNotFound(lot_id))?;
                if position.ticker != symbol {
                    return Err(PortfolioError::InvalidInput(format!(
                        "lot {} holds {}, not {}",
                        lot_id, position.ticker, symbol
                    )));
                }
                position.clone()
            }
            None => self.positions.find_open(&symbol)?.clone(),
        };

        if qty_to_sell == 0 {
            return Err(PortfolioError::InvalidQuantity(
                "non-positive".to_string(),
            ));
        }
        if qty_to_sell > position.qty {
            return Err(PortfolioError::InvalidQuantity(format!(
                "exceeds holdings ({} > {})",
                qty_to_sell, position.qty
            )));
        }
        if sell_price <= Decimal::ZERO {
            return Err(PortfolioError::InvalidPrice(sell_price));
        }

        let date_sell = Local::now().date_naive();
        let leg = ClosedTradeLeg::from_sale(&position, qty_to_sell, sell_price, date_sell);

        // The realized record is the economically significant fact: persist
        // it first so a failure below leaves a reconcilable pending leg
        // rather than a silently lost sale
        self.closed.record(leg.clone())?;
        self.positions.reduce(position.lot_id, qty_to_sell)?;
        self.closed.commit(leg.leg_id)?;

        info!(
            ticker = %leg.ticker,
            qty_sold = leg.qty_sold,
            pnl_final = %leg.pnl_final,
            "Sale executed"
        );

        Ok(ClosedTradeLeg {
            pending: false,
            ..leg
        })
    }

    /// Aggregate both ledgers into a summary report.
    ///
    /// A lot with no observed price contributes zero to current value,
    /// matching its excluded live P&L. Percentages are zero whenever their
    /// denominator is not positive.
    pub async fn summarize(&mut self, refresh: bool) -> Result<SummaryReport, PortfolioError> {
        if refresh {
            self.refresh_live().await?;
        }
        self.warn_pending();

        let total_cost_open: Decimal = self
            .positions
            .positions()
            .iter()
            .map(|p| p.buy_amount)
            .sum();
        let current_value_open: Decimal = self
            .positions
            .positions()
            .iter()
            .filter_map(|p| p.current_value())
            .sum();
        let pnl_open = current_value_open - total_cost_open;

        let total_cost_closed: Decimal = self
            .closed
            .legs()
            .iter()
            .map(|l| l.buy_amount_sold)
            .sum();
        let total_realised_pnl: Decimal = self.closed.legs().iter().map(|l| l.pnl_final).sum();

        let total_invested = total_cost_open + total_cost_closed;
        let total_pnl = pnl_open + total_realised_pnl;

        Ok(SummaryReport {
            total_cost_open,
            current_value_open,
            pnl_open,
            pnl_open_pct: percent_of(pnl_open, total_cost_open),
            total_cost_closed,
            total_realised_pnl,
            realised_pct: percent_of(total_realised_pnl, total_cost_closed),
            total_invested,
            total_pnl,
            total_pnl_pct: percent_of(total_pnl, total_invested),
        })
    }

    /// Repair pass over pending closed legs.
    ///
    /// With `apply` false this only reports. With `apply` true, a pending
    /// leg whose lot still holds at least the sold quantity gets its
    /// reduction applied now; otherwise the reduction is taken as already
    /// applied and only the marker is cleared.
    pub fn reconcile(&mut self, apply: bool) -> Result<ReconcileReport, PortfolioError> {
        let mut report = ReconcileReport::default();

        for leg in self.closed.pending_legs() {
            report.pending += 1;
            warn!(
                ticker = %leg.ticker,
                leg_id = %leg.leg_id,
                qty_sold = leg.qty_sold,
                "Pending closed leg without confirmed position reduction"
            );
            if !apply {
                continue;
            }

            let reducible = self
                .positions
                .by_lot(leg.lot_id)
                .is_some_and(|p| p.qty >= leg.qty_sold);

            if reducible {
                self.positions.reduce(leg.lot_id, leg.qty_sold)?;
                self.closed.commit(leg.leg_id)?;
                report.repaired += 1;
                warn!(leg_id = %leg.leg_id, "Applied missing position reduction");
            } else {
                self.closed.commit(leg.leg_id)?;
                report.cleared += 1;
                warn!(
                    leg_id = %leg.leg_id,
                    "Reduction already applied; cleared pending marker"
                );
            }
        }

        Ok(report)
    }

    fn warn_pending(&self) {
        let pending = self.closed.pending_legs().len();
        if pending > 0 {
            warn!(
                pending,
                "Closed ledger has pending legs; run `reconcile --apply` to repair"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryLedgerStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    struct FixedPrice(Option<Decimal>);

    #[async_trait]
    impl PriceSource for FixedPrice {
        async fn fetch(&self, _ticker: &str) -> Option<Decimal> {
            self.0
        }
    }

    fn engine_with(price: Option<Decimal>) -> (PortfolioEngine, Arc<MemoryLedgerStore>) {
        let store = Arc::new(MemoryLedgerStore::new());
        let engine = PortfolioEngine::load(store.clone(), Arc::new(FixedPrice(price))).unwrap();
        (engine, store)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[tokio::test]
    async fn test_open_refresh_partial_sell_scenario() {
        let (mut engine, _) = engine_with(Some(dec!(110)));

        engine.open_position("sbin", dec!(100), 10, date()).unwrap();
        engine.refresh_live().await.unwrap();

        let pos = &engine.positions()[0];
        assert_eq!(pos.ticker, "SBIN.NS");
        assert_eq!(pos.pnl_live, Some(dec!(100)));
        assert_eq!(pos.pnl_live_percent, Some(dec!(10)));

        let leg = engine.sell("SBIN", 4, dec!(120), None).unwrap();
        assert_eq!(leg.buy_amount_sold, dec!(400));
        assert_eq!(leg.sell_amount, dec!(480));
        assert_eq!(leg.pnl_final, dec!(80));
        assert_eq!(leg.pnl_final_percent, Some(dec!(20)));
        assert!(!leg.pending);

        let remaining = &engine.positions()[0];
        assert_eq!(remaining.qty, 6);
        assert_eq!(remaining.buy_amount, dec!(600));
    }

    #[tokio::test]
    async fn test_full_exit_removes_position() {
        let (mut engine, store) = engine_with(None);

        engine.open_position("sbin", dec!(100), 10, date()).unwrap();
        engine.sell("sbin", 4, dec!(120), None).unwrap();
        engine.sell("sbin", 6, dec!(90), None).unwrap();

        assert!(engine.positions().is_empty());
        assert_eq!(engine.closed_legs().len(), 2);

        // Persisted state agrees
        assert!(store.load_positions().unwrap().is_empty());
        let persisted = store.load_closed_trades().unwrap();
        assert_eq!(persisted.len(), 2);
        assert!(persisted.iter().all(|l| !l.pending));
    }

    #[tokio::test]
    async fn test_sell_validation_mutates_neither_ledger() {
        let (mut engine, _) = engine_with(None);
        engine.open_position("sbin", dec!(100), 10, date()).unwrap();

        assert!(matches!(
            engine.sell("sbin", 0, dec!(120), None),
            Err(PortfolioError::InvalidQuantity(_))
        ));
        assert!(matches!(
            engine.sell("sbin", 11, dec!(120), None),
            Err(PortfolioError::InvalidQuantity(_))
        ));
        assert!(matches!(
            engine.sell("sbin", 4, dec!(0), None),
            Err(PortfolioError::InvalidPrice(_))
        ));
        assert!(matches!(
            engine.sell("tcs", 1, dec!(120), None),
            Err(PortfolioError::NoOpenPosition(_))
        ));

        assert_eq!(engine.positions()[0].qty, 10);
        assert!(engine.closed_legs().is_empty());
    }

    #[tokio::test]
    async fn test_sell_by_lot_resolves_ambiguity() {
        let (mut engine, _) = engine_with(None);
        let first = engine.open_position("sbin", dec!(100), 10, date()).unwrap();
        engine.open_position("sbin", dec!(105), 5, date()).unwrap();

        assert!(matches!(
            engine.sell("sbin", 2, dec!(120), None),
            Err(PortfolioError::AmbiguousPosition { .. })
        ));

        let leg = engine
            .sell("sbin", 2, dec!(120), Some(first.lot_id))
            .unwrap();
        assert_eq!(leg.lot_id, first.lot_id);
        assert_eq!(leg.buy_price, dec!(100));
    }

    #[tokio::test]
    async fn test_sell_by_lot_checks_ticker() {
        let (mut engine, _) = engine_with(None);
        let lot = engine.open_position("sbin", dec!(100), 10, date()).unwrap();

        assert!(matches!(
            engine.sell("tcs", 2, dec!(120), Some(lot.lot_id)),
            Err(PortfolioError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.sell("sbin", 2, dec!(120), Some(Uuid::new_v4())),
            Err(PortfolioError::LotNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_summarize_figures() {
        let (mut engine, _) = engine_with(Some(dec!(110)));

        engine.open_position("sbin", dec!(100), 10, date()).unwrap();
        engine.sell("sbin", 4, dec!(120), None).unwrap();

        let report = engine.summarize(true).await.unwrap();
        assert_eq!(report.total_cost_open, dec!(600));
        assert_eq!(report.current_value_open, dec!(660));
        assert_eq!(report.pnl_open, dec!(60));
        assert_eq!(report.pnl_open_pct, dec!(10));
        assert_eq!(report.total_cost_closed, dec!(400));
        assert_eq!(report.total_realised_pnl, dec!(80));
        assert_eq!(report.realised_pct, dec!(20));
        assert_eq!(report.total_invested, dec!(1000));
        assert_eq!(report.total_pnl, dec!(140));
        assert_eq!(report.total_pnl_pct, dec!(14));
    }

    #[tokio::test]
    async fn test_summarize_unpriced_position_contributes_zero_value() {
        let (mut engine, _) = engine_with(None);
        engine.open_position("sbin", dec!(100), 10, date()).unwrap();

        let report = engine.summarize(true).await.unwrap();
        assert_eq!(report.total_cost_open, dec!(1000));
        assert_eq!(report.current_value_open, Decimal::ZERO);
        assert_eq!(report.pnl_open, dec!(-1000));
    }

    #[tokio::test]
    async fn test_summarize_without_refresh_is_idempotent() {
        let (mut engine, _) = engine_with(Some(dec!(110)));
        engine.open_position("sbin", dec!(100), 10, date()).unwrap();
        engine.refresh_live().await.unwrap();

        let first = engine.summarize(false).await.unwrap();
        let second = engine.summarize(false).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_portfolio_summary_is_all_zero() {
        let (mut engine, _) = engine_with(None);
        let report = engine.summarize(false).await.unwrap();
        assert_eq!(report.total_invested, Decimal::ZERO);
        assert_eq!(report.total_pnl, Decimal::ZERO);
        assert_eq!(report.total_pnl_pct, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_reconcile_applies_missing_reduction() {
        // Simulate a crash between recording the leg and reducing the lot:
        // seed the store with a pending leg whose position is un-reduced
        let store = Arc::new(MemoryLedgerStore::new());
        let position = Position::new("SBIN.NS".to_string(), dec!(100), 10, date());
        let leg = ClosedTradeLeg::from_sale(
            &position,
            4,
            dec!(120),
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
        );
        store.save_positions(&[position]).unwrap();
        store.save_closed_trades(&[leg]).unwrap();

        let mut engine =
            PortfolioEngine::load(store.clone(), Arc::new(FixedPrice(None))).unwrap();

        // Report-only pass changes nothing
        let report = engine.reconcile(false).unwrap();
        assert_eq!(report.pending, 1);
        assert_eq!(report.repaired, 0);
        assert_eq!(engine.positions()[0].qty, 10);

        let report = engine.reconcile(true).unwrap();
        assert_eq!(report.repaired, 1);
        assert_eq!(engine.positions()[0].qty, 6);
        assert!(!store.load_closed_trades().unwrap()[0].pending);

        // Nothing left to repair
        let report = engine.reconcile(true).unwrap();
        assert_eq!(report.pending, 0);
    }

    #[tokio::test]
    async fn test_reconcile_clears_marker_when_lot_gone() {
        let store = Arc::new(MemoryLedgerStore::new());
        let position = Position::new("SBIN.NS".to_string(), dec!(100), 10, date());
        let leg = ClosedTradeLeg::from_sale(
            &position,
            10,
            dec!(120),
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(),
        );
        // Lot already removed: crash happened after the reduction persisted
        store.save_closed_trades(&[leg]).unwrap();

        let mut engine =
            PortfolioEngine::load(store.clone(), Arc::new(FixedPrice(None))).unwrap();
        let report = engine.reconcile(true).unwrap();
        assert_eq!(report.cleared, 1);
        assert!(!store.load_closed_trades().unwrap()[0].pending);
    }
}
