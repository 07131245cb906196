//! End-to-end sale lifecycle against the real CSV store

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use stockfolio::portfolio::{PortfolioEngine, PortfolioError};
use stockfolio::pricing::PriceSource;
use stockfolio::storage::{CsvLedgerStore, LedgerStore};

struct FixedPrice(Option<Decimal>);

#[async_trait]
impl PriceSource for FixedPrice {
    async fn fetch(&self, _ticker: &str) -> Option<Decimal> {
        self.0
    }
}

fn buy_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

#[tokio::test]
async fn test_full_lifecycle_against_csv_ledgers() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CsvLedgerStore::new(dir.path()));
    store.init().unwrap();

    // Open and refresh
    {
        let mut engine =
            PortfolioEngine::load(store.clone(), Arc::new(FixedPrice(Some(dec!(110))))).unwrap();
        engine
            .open_position("sbin", dec!(100), 10, buy_date())
            .unwrap();
        engine.refresh_live().await.unwrap();

        let pos = &engine.positions()[0];
        assert_eq!(pos.ticker, "SBIN.NS");
        assert_eq!(pos.pnl_live, Some(dec!(100)));
        assert_eq!(pos.pnl_live_percent, Some(dec!(10)));
    }

    // Partial exit from a fresh engine (state comes back off disk)
    {
        let mut engine =
            PortfolioEngine::load(store.clone(), Arc::new(FixedPrice(None))).unwrap();
        let leg = engine.sell("SBIN", 4, dec!(120), None).unwrap();
        assert_eq!(leg.buy_amount_sold, dec!(400));
        assert_eq!(leg.sell_amount, dec!(480));
        assert_eq!(leg.pnl_final, dec!(80));
        assert_eq!(leg.pnl_final_percent, Some(dec!(20)));

        let remaining = &engine.positions()[0];
        assert_eq!(remaining.qty, 6);
        assert_eq!(remaining.buy_amount, dec!(600));
    }

    // Full exit of the remainder
    {
        let mut engine =
            PortfolioEngine::load(store.clone(), Arc::new(FixedPrice(None))).unwrap();
        engine.sell("sbin", 6, dec!(90), None).unwrap();

        assert!(engine.positions().is_empty());
        assert_eq!(engine.closed_legs().len(), 2);
        assert!(engine.closed_legs().iter().all(|l| !l.pending));
    }

    // Summary over the persisted ledgers
    {
        let mut engine =
            PortfolioEngine::load(store.clone(), Arc::new(FixedPrice(None))).unwrap();
        let report = engine.summarize(false).await.unwrap();

        assert_eq!(report.total_cost_open, Decimal::ZERO);
        assert_eq!(report.total_cost_closed, dec!(1000));
        // +80 on the partial exit, -60 on the final exit
        assert_eq!(report.total_realised_pnl, dec!(20));
        assert_eq!(report.realised_pct, dec!(2));
        assert_eq!(report.total_invested, dec!(1000));
        assert_eq!(report.total_pnl, dec!(20));
    }
}

#[tokio::test]
async fn test_rejected_sale_leaves_ledger_files_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(CsvLedgerStore::new(dir.path()));

    let mut engine =
        PortfolioEngine::load(store.clone(), Arc::new(FixedPrice(None))).unwrap();
    engine
        .open_position("sbin", dec!(100), 10, buy_date())
        .unwrap();

    let err = engine.sell("sbin", 25, dec!(120), None).unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidQuantity(_)));

    assert_eq!(store.load_positions().unwrap()[0].qty, 10);
    assert!(store.load_closed_trades().unwrap().is_empty());
}
