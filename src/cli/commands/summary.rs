use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use crate::data_paths::DataPaths;
use crate::portfolio::display;

#[derive(Args)]
pub struct SummaryArgs {
    /// Refresh live prices before summarizing
    #[arg(long)]
    pub refresh: bool,
}

pub struct SummaryCommand {
    args: SummaryArgs,
}

impl SummaryCommand {
    pub fn new(args: SummaryArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, data_paths: DataPaths) -> Result<()> {
        let mut engine = super::load_engine(&data_paths)?;

        let report = engine.summarize(self.args.refresh).await?;

        println!("{}", "═".repeat(60).bright_blue());
        println!("{}", "📊 PORTFOLIO SUMMARY".bright_white().bold());
        println!("{}", "═".repeat(60).bright_blue());

        if !engine.positions().is_empty() {
            println!("\n{}", "OPEN POSITIONS".bright_yellow());
            println!("{}", display::positions_table(engine.positions()));
        }
        if !engine.closed_legs().is_empty() {
            println!("\n{}", "CLOSED TRADES".bright_yellow());
            println!("{}", display::closed_trades_table(engine.closed_legs()));
        }

        display::print_summary(&report);
        Ok(())
    }
}
