use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;

use crate::data_paths::DataPaths;

#[derive(Args)]
pub struct ReconcileArgs {
    /// Apply repairs instead of only reporting pending legs
    #[arg(long)]
    pub apply: bool,
}

pub struct ReconcileCommand {
    args: ReconcileArgs,
}

impl ReconcileCommand {
    pub fn new(args: ReconcileArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, data_paths: DataPaths) -> Result<()> {
        let mut engine = super::load_engine(&data_paths)?;

        let report = engine.reconcile(self.args.apply)?;

        if report.pending == 0 {
            println!("{} Ledgers are consistent", "✅".green());
        } else if self.args.apply {
            println!(
                "{} {} pending leg(s): {} reduction(s) applied, {} marker(s) cleared",
                "🔧".yellow(),
                report.pending,
                report.repaired,
                report.cleared
            );
        } else {
            println!(
                "{} {} pending leg(s) found; rerun with --apply to repair",
                "⚠️".yellow(),
                report.pending
            );
        }
        Ok(())
    }
}
