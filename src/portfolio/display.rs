//! Console rendering for positions, closed trades and the summary report

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

use crate::portfolio::types::{ClosedTradeLeg, Position, SummaryReport};

/// Render the open-positions ledger as a table
pub fn positions_table(positions: &[Position]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Lot", "Ticker", "Buy Price", "Qty", "Buy Amount", "Live Price", "Live P&L",
            "Live P&L %", "Bought",
        ]);

    for position in positions {
        table.add_row(vec![
            short_id(&position.lot_id.to_string()),
            position.ticker.clone(),
            format!("{:.2}", position.buy_price),
            position.qty.to_string(),
            format!("{:.2}", position.buy_amount),
            opt_money(position.current_price),
            opt_signed(position.pnl_live),
            opt_percent(position.pnl_live_percent),
            position.date_buy.clone(),
        ]);
    }

    table
}

/// Render the closed-trades ledger as a table
pub fn closed_trades_table(legs: &[ClosedTradeLeg]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Ticker", "Qty", "Buy Price", "Sell Price", "Cost", "Proceeds", "P&L", "P&L %",
            "Sold", "Held (days)",
        ]);

    for leg in legs {
        let ticker = if leg.pending {
            format!("{} {}", leg.ticker, "(pending)".yellow())
        } else {
            leg.ticker.clone()
        };
        table.add_row(vec![
            ticker,
            leg.qty_sold.to_string(),
            format!("{:.2}", leg.buy_price),
            format!("{:.2}", leg.sell_price),
            format!("{:.2}", leg.buy_amount_sold),
            format!("{:.2}", leg.sell_amount),
            signed(leg.pnl_final),
            opt_percent(leg.pnl_final_percent),
            leg.date_sell.clone(),
            leg.holding_days
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    table
}

/// Print the aggregated summary report
pub fn print_summary(report: &SummaryReport) {
    println!("\n{}", "OPEN POSITIONS".bright_yellow());
    println!("{}", "─".repeat(50).bright_black());
    println!("  Cost basis:      {:>14.2}", report.total_cost_open);
    println!("  Current value:   {:>14.2}", report.current_value_open);
    println!(
        "  Unrealized P&L:  {:>14} ({})",
        signed(report.pnl_open),
        percent(report.pnl_open_pct)
    );

    println!("\n{}", "CLOSED TRADES".bright_yellow());
    println!("{}", "─".repeat(50).bright_black());
    println!("  Cost basis:      {:>14.2}", report.total_cost_closed);
    println!(
        "  Realized P&L:    {:>14} ({})",
        signed(report.total_realised_pnl),
        percent(report.realised_pct)
    );

    println!("\n{}", "OVERALL".bright_yellow());
    println!("{}", "─".repeat(50).bright_black());
    println!("  Total invested:  {:>14.2}", report.total_invested);
    println!(
        "  Total P&L:       {:>14} ({})",
        signed(report.total_pnl),
        percent(report.total_pnl_pct)
    );
    println!();
}

fn short_id(id: &str) -> String {
    if id.len() > 8 {
        id[..8].to_string()
    } else {
        id.to_string()
    }
}

fn signed(value: Decimal) -> String {
    let text = format!("{:.2}", value);
    if value > Decimal::ZERO {
        format!("+{}", text).bright_green().to_string()
    } else if value < Decimal::ZERO {
        text.bright_red().to_string()
    } else {
        text
    }
}

fn percent(value: Decimal) -> String {
    format!("{:.2}%", value)
}

fn opt_money(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

fn opt_signed(value: Option<Decimal>) -> String {
    value.map(signed).unwrap_or_else(|| "-".to_string())
}

fn opt_percent(value: Option<Decimal>) -> String {
    value.map(percent).unwrap_or_else(|| "-".to_string())
}
