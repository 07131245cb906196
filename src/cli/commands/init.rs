use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::info;

use crate::data_paths::DataPaths;
use crate::storage::CsvLedgerStore;

#[derive(Args)]
pub struct InitArgs {}

pub struct InitCommand {
    #[allow(dead_code)]
    args: InitArgs,
}

impl InitCommand {
    pub fn new(args: InitArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, data_paths: DataPaths) -> Result<()> {
        let store = CsvLedgerStore::new(data_paths.ledgers());

        if store.init()? {
            info!("Initialized portfolio ledgers");
            println!(
                "{} Ledgers created under {}",
                "✅".green(),
                data_paths.ledgers().display()
            );
        } else {
            println!(
                "{} Ledgers already exist under {}",
                "ℹ️".blue(),
                data_paths.ledgers().display()
            );
        }
        Ok(())
    }
}
