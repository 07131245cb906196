use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::data_paths::DataPaths;

#[derive(Args)]
pub struct SellArgs {
    /// Stock symbol
    pub ticker: String,

    /// Quantity to sell
    #[arg(long)]
    pub qty: u32,

    /// Sell price per unit
    #[arg(long)]
    pub price: Decimal,

    /// Lot id to sell from; required when a ticker has more than one open lot
    #[arg(long)]
    pub lot: Option<Uuid>,
}

pub struct SellCommand {
    args: SellArgs,
}

impl SellCommand {
    pub fn new(args: SellArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, data_paths: DataPaths) -> Result<()> {
        let mut engine = super::load_engine(&data_paths)?;

        let leg = engine.sell(
            &self.args.ticker,
            self.args.qty,
            self.args.price,
            self.args.lot,
        )?;

        let pnl = if leg.pnl_final >= Decimal::ZERO {
            format!("+{:.2}", leg.pnl_final).bright_green().to_string()
        } else {
            format!("{:.2}", leg.pnl_final).bright_red().to_string()
        };
        let pct = leg
            .pnl_final_percent
            .map(|p| format!(" ({:.2}%)", p))
            .unwrap_or_default();

        println!(
            "{} Sold {} x {} @ {}, realized P&L {}{}",
            "✅".green(),
            leg.qty_sold,
            leg.ticker.bright_cyan(),
            leg.sell_price,
            pnl,
            pct
        );
        if let Some(days) = leg.holding_days {
            println!("   Held for {} days", days);
        }
        Ok(())
    }
}
