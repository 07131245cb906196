use anyhow::Result;
use std::sync::Arc;

use crate::data_paths::DataPaths;
use crate::portfolio::PortfolioEngine;
use crate::pricing::YahooPriceSource;
use crate::storage::CsvLedgerStore;

pub mod add;
pub mod init;
pub mod reconcile;
pub mod refresh;
pub mod sell;
pub mod summary;

/// Build the engine against the CSV ledgers under the data directory and
/// the Yahoo price source
pub(crate) fn load_engine(data_paths: &DataPaths) -> Result<PortfolioEngine> {
    let store = Arc::new(CsvLedgerStore::new(data_paths.ledgers()));
    let prices = Arc::new(YahooPriceSource::new());
    let engine = PortfolioEngine::load(store, prices)?;
    Ok(engine)
}
