use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use crate::data_paths::DataPaths;
use crate::portfolio::display;

#[derive(Args)]
pub struct RefreshArgs {}

pub struct RefreshCommand {
    #[allow(dead_code)]
    args: RefreshArgs,
}

impl RefreshCommand {
    pub fn new(args: RefreshArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, data_paths: DataPaths) -> Result<()> {
        let mut engine = super::load_engine(&data_paths)?;

        engine.refresh_live().await?;

        if engine.positions().is_empty() {
            println!("{}", "No open positions".bright_black().italic());
        } else {
            println!("{}", display::positions_table(engine.positions()));
        }
        Ok(())
    }
}
