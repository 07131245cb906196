//! Position-lifecycle and P&L accounting engine
//!
//! - [`types`]: ledger row types and shared P&L math
//! - [`ledger`]: the open-positions ledger
//! - [`closed`]: the append-only closed-trades ledger
//! - [`engine`]: orchestration of open / refresh / sell / summarize
//! - [`display`]: console rendering of positions, legs and summaries

pub mod closed;
pub mod display;
pub mod engine;
pub mod ledger;
pub mod types;

pub use engine::PortfolioEngine;
pub use types::{ClosedTradeLeg, Position, ReduceOutcome, SummaryReport};

use rust_decimal::Decimal;
use uuid::Uuid;

/// Portfolio domain errors
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid sell quantity: {0}")]
    InvalidQuantity(String),

    #[error("Invalid sell price: must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("No open position for {0}")]
    NoOpenPosition(String),

    #[error("Multiple open lots for {ticker}; rerun with --lot and one of: {lot_ids}")]
    AmbiguousPosition { ticker: String, lot_ids: String },

    #[error("No open lot with id {0}")]
    LotNotFound(Uuid),

    #[error("Storage failure: {0}")]
    Storage(#[from] anyhow::Error),
}
