use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Args;
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

use crate::cli::args::parse_date;
use crate::data_paths::DataPaths;

#[derive(Args)]
pub struct AddArgs {
    /// Stock symbol (normalized to upper case; `.NS` is assumed when no
    /// exchange suffix is given)
    pub ticker: String,

    /// Buy price per unit
    #[arg(long)]
    pub price: Decimal,

    /// Quantity of units
    #[arg(long)]
    pub qty: u32,

    /// Acquisition date (YYYY-MM-DD, default: today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

pub struct AddCommand {
    args: AddArgs,
}

impl AddCommand {
    pub fn new(args: AddArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, data_paths: DataPaths) -> Result<()> {
        let mut engine = super::load_engine(&data_paths)?;

        let date_buy = self.args.date.unwrap_or_else(|| Local::now().date_naive());
        let position =
            engine.open_position(&self.args.ticker, self.args.price, self.args.qty, date_buy)?;

        println!(
            "{} Opened {} x {} @ {} (lot {})",
            "✅".green(),
            position.qty,
            position.ticker.bright_cyan(),
            position.buy_price,
            position.lot_id
        );
        Ok(())
    }
}
