//! Portfolio type definitions with strong typing

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Date format used in both ledgers
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Position status. Closed lots are removed from the ledger rather than
/// flagged, so only one variant is ever stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Open,
}

/// One open lot of the open-positions ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub lot_id: Uuid,
    pub ticker: String,
    pub buy_price: Decimal,
    pub qty: u32,
    pub buy_amount: Decimal,
    pub current_price: Option<Decimal>,
    pub pnl_live: Option<Decimal>,
    pub pnl_live_percent: Option<Decimal>,
    /// Acquisition date as stored. Kept as a raw string so a malformed row
    /// loaded from disk degrades to an absent holding period instead of a
    /// load failure.
    pub date_buy: String,
    pub status: PositionStatus,
}

impl Position {
    pub fn new(ticker: String, buy_price: Decimal, qty: u32, date_buy: NaiveDate) -> Self {
        Self {
            lot_id: Uuid::new_v4(),
            ticker,
            buy_price,
            qty,
            buy_amount: buy_price * Decimal::from(qty),
            current_price: None,
            pnl_live: None,
            pnl_live_percent: None,
            date_buy: date_buy.format(DATE_FORMAT).to_string(),
            status: PositionStatus::Open,
        }
    }

    /// Parse the stored acquisition date, if well-formed
    pub fn buy_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date_buy, DATE_FORMAT).ok()
    }

    /// Update live valuation from an observed market price.
    ///
    /// An absent price clears both derived fields so stale numbers never
    /// masquerade as current ones.
    pub fn refresh_valuation(&mut self, price: Option<Decimal>) {
        self.current_price = price;
        match price {
            Some(price) => {
                let pnl = (price - self.buy_price) * Decimal::from(self.qty);
                self.pnl_live = Some(pnl);
                self.pnl_live_percent = Some(percent_of(pnl, self.buy_amount));
            }
            None => {
                self.pnl_live = None;
                self.pnl_live_percent = None;
            }
        }
    }

    /// Market value of the lot at the last observed price
    pub fn current_value(&self) -> Option<Decimal> {
        self.current_price
            .map(|price| price * Decimal::from(self.qty))
    }
}

/// Outcome of reducing an open lot by a sold quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOutcome {
    FullyClosed,
    PartiallyClosed,
}

/// One realized sale leg of the closed-trades ledger (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTradeLeg {
    pub leg_id: Uuid,
    /// Lot the sale was taken from
    pub lot_id: Uuid,
    pub ticker: String,
    pub buy_price: Decimal,
    pub qty_sold: u32,
    pub buy_amount_sold: Decimal,
    pub sell_price: Decimal,
    pub sell_amount: Decimal,
    pub pnl_final: Decimal,
    /// Absent when the cost basis of the sold quantity is zero
    pub pnl_final_percent: Option<Decimal>,
    pub date_buy: String,
    pub date_sell: String,
    /// Whole days between acquisition and sale; absent when the stored
    /// acquisition date does not parse
    pub holding_days: Option<i64>,
    /// Write-ahead marker: true until the matching position reduction has
    /// been persisted
    pub pending: bool,
}

impl ClosedTradeLeg {
    /// Build the realized leg for selling `qty_sold` units of `position` at
    /// `sell_price` on `date_sell`.
    ///
    /// Economics are computed from the lot's original buy price. The leg is
    /// created with the pending marker set; the engine clears it once the
    /// position reduction has been persisted.
    pub fn from_sale(
        position: &Position,
        qty_sold: u32,
        sell_price: Decimal,
        date_sell: NaiveDate,
    ) -> Self {
        let buy_amount_sold = position.buy_price * Decimal::from(qty_sold);
        let sell_amount = sell_price * Decimal::from(qty_sold);
        let pnl_final = sell_amount - buy_amount_sold;

        let pnl_final_percent = if buy_amount_sold.is_zero() {
            None
        } else {
            Some(percent_of(pnl_final, buy_amount_sold))
        };

        let holding_days = match position.buy_date() {
            Some(date_buy) => Some((date_sell - date_buy).num_days()),
            None => {
                tracing::warn!(
                    ticker = %position.ticker,
                    date_buy = %position.date_buy,
                    "Unparsable acquisition date, holding period unavailable"
                );
                None
            }
        };

        Self {
            leg_id: Uuid::new_v4(),
            lot_id: position.lot_id,
            ticker: position.ticker.clone(),
            buy_price: position.buy_price,
            qty_sold,
            buy_amount_sold,
            sell_price,
            sell_amount,
            pnl_final,
            pnl_final_percent,
            date_buy: position.date_buy.clone(),
            date_sell: date_sell.format(DATE_FORMAT).to_string(),
            holding_days,
            pending: true,
        }
    }
}

/// Aggregated view over both ledgers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    pub total_cost_open: Decimal,
    pub current_value_open: Decimal,
    pub pnl_open: Decimal,
    pub pnl_open_pct: Decimal,
    pub total_cost_closed: Decimal,
    pub total_realised_pnl: Decimal,
    pub realised_pct: Decimal,
    pub total_invested: Decimal,
    pub total_pnl: Decimal,
    pub total_pnl_pct: Decimal,
}

/// Percentage of `part` relative to `basis`, 0 when the basis is not positive
pub fn percent_of(part: Decimal, basis: Decimal) -> Decimal {
    if basis > Decimal::ZERO {
        part / basis * Decimal::from(100)
    } else {
        Decimal::ZERO
    }
}
