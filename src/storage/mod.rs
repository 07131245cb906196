//! Ledger persistence layer
//!
//! Both ledgers are stored as CSV files under the data directory:
//! - ledgers/positions.csv      - open positions, one row per lot
//! - ledgers/closed_trades.csv  - realized sale legs, append-only
//!
//! Access goes through the [`LedgerStore`] trait so the engine can be
//! constructed against an in-memory store in tests. Semantics are
//! whole-ledger replace: every save rewrites the file via a temp-file and
//! rename so a failed write never leaves a truncated ledger behind.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::portfolio::types::{ClosedTradeLeg, Position};

/// Ledger persistence seam
pub trait LedgerStore: Send + Sync {
    fn load_positions(&self) -> Result<Vec<Position>>;
    fn save_positions(&self, positions: &[Position]) -> Result<()>;
    fn load_closed_trades(&self) -> Result<Vec<ClosedTradeLeg>>;
    fn save_closed_trades(&self, legs: &[ClosedTradeLeg]) -> Result<()>;
}

const POSITIONS_FILE: &str = "positions.csv";
const CLOSED_TRADES_FILE: &str = "closed_trades.csv";

const POSITION_HEADERS: &[&str] = &[
    "lot_id",
    "ticker",
    "buy_price",
    "qty",
    "buy_amount",
    "current_price",
    "pnl_live",
    "pnl_live_percent",
    "date_buy",
    "status",
];

const CLOSED_TRADE_HEADERS: &[&str] = &[
    "leg_id",
    "lot_id",
    "ticker",
    "buy_price",
    "qty_sold",
    "buy_amount_sold",
    "sell_price",
    "sell_amount",
    "pnl_final",
    "pnl_final_percent",
    "date_buy",
    "date_sell",
    "holding_days",
    "pending",
];

/// CSV-backed ledger store
pub struct CsvLedgerStore {
    ledgers_dir: PathBuf,
}

impl CsvLedgerStore {
    pub fn new(ledgers_dir: impl AsRef<Path>) -> Self {
        Self {
            ledgers_dir: ledgers_dir.as_ref().to_path_buf(),
        }
    }

    /// Create empty ledger files (headers only) where missing.
    ///
    /// Returns true if anything was created.
    pub fn init(&self) -> Result<bool> {
        std::fs::create_dir_all(&self.ledgers_dir)
            .context("Failed to create ledgers directory")?;

        let mut created = false;
        for (file, headers) in [
            (POSITIONS_FILE, POSITION_HEADERS),
            (CLOSED_TRADES_FILE, CLOSED_TRADE_HEADERS),
        ] {
            let path = self.ledgers_dir.join(file);
            if path.exists() {
                debug!("Ledger already exists: {:?}", path);
                continue;
            }
            write_csv(&path, headers, &Vec::<Position>::new())?;
            info!("Created ledger: {:?}", path);
            created = true;
        }

        Ok(created)
    }

    fn positions_path(&self) -> PathBuf {
        self.ledgers_dir.join(POSITIONS_FILE)
    }

    fn closed_trades_path(&self) -> PathBuf {
        self.ledgers_dir.join(CLOSED_TRADES_FILE)
    }
}

impl LedgerStore for CsvLedgerStore {
    fn load_positions(&self) -> Result<Vec<Position>> {
        read_csv(&self.positions_path())
    }

    fn save_positions(&self, positions: &[Position]) -> Result<()> {
        write_csv(&self.positions_path(), POSITION_HEADERS, positions)
    }

    fn load_closed_trades(&self) -> Result<Vec<ClosedTradeLeg>> {
        read_csv(&self.closed_trades_path())
    }

    fn save_closed_trades(&self, legs: &[ClosedTradeLeg]) -> Result<()> {
        write_csv(&self.closed_trades_path(), CLOSED_TRADE_HEADERS, legs)
    }
}

fn read_csv<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open ledger: {:?}", path))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: T = row.with_context(|| format!("Malformed row in ledger: {:?}", path))?;
        records.push(record);
    }
    Ok(records)
}

fn write_csv<T: serde::Serialize>(path: &Path, headers: &[&str], records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create ledger directory: {:?}", parent))?;
    }

    // Write to a temp file beside the target, then rename into place so a
    // failure mid-write cannot truncate the ledger
    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp_path)
            .with_context(|| format!("Failed to create temp ledger: {:?}", tmp_path))?;

        writer.write_record(headers)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush ledger: {:?}", tmp_path))?;
    }

    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace ledger: {:?}", path))?;

    debug!("Saved {} rows to {:?}", records.len(), path);
    Ok(())
}

/// In-memory ledger store, used as a test double and by dry-run tooling
#[derive(Default)]
pub struct MemoryLedgerStore {
    positions: Mutex<Vec<Position>>,
    closed_trades: Mutex<Vec<ClosedTradeLeg>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load_positions(&self) -> Result<Vec<Position>> {
        Ok(self.positions.lock().unwrap().clone())
    }

    fn save_positions(&self, positions: &[Position]) -> Result<()> {
        *self.positions.lock().unwrap() = positions.to_vec();
        Ok(())
    }

    fn load_closed_trades(&self) -> Result<Vec<ClosedTradeLeg>> {
        Ok(self.closed_trades.lock().unwrap().clone())
    }

    fn save_closed_trades(&self, legs: &[ClosedTradeLeg]) -> Result<()> {
        *self.closed_trades.lock().unwrap() = legs.to_vec();
        Ok(())
    }
}
