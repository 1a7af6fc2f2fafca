use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

pub mod codec;
pub mod docs;
pub mod guard;
pub mod ledger;
pub mod policy;
pub mod reconcile;
pub mod roster;

/// Errors surfaced by the flat-file store. Reads degrade to empty tables
/// instead of failing; these cover the write side and input validation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("attendance row for \"{name}\" on {date} is missing a team or name")]
    InvalidRecord { name: String, date: NaiveDate },

    #[error("unsupported support document extension \"{0}\"")]
    UnsupportedExtension(String),
}

/// Handle to every persisted table. Stores keep only paths; every operation
/// re-reads the files, so there is no cached state to go stale.
#[derive(Debug, Clone)]
pub struct Store {
    pub roster: roster::RosterStore,
    pub ledger: ledger::LedgerStore,
    pub policies: policy::PolicyStore,
    pub documents: docs::DocumentStore,
}

pub fn init_store(data_dir: &Path) -> Store {
    fs::create_dir_all(data_dir).expect("Failed to create data directory");

    Store {
        roster: roster::RosterStore::new(data_dir.join("roster.csv")),
        ledger: ledger::LedgerStore::new(data_dir.join("asistencia.csv")),
        policies: policy::PolicyStore::new(data_dir.join("equipos.json")),
        documents: docs::DocumentStore::new(data_dir.join("soportes")),
    }
}

/// Boot-time scan: loading each table restores any primary that only
/// survives as a `.bak`, and the row counts give an early signal that the
/// data directory is healthy.
pub async fn warmup_store(store: &Store) -> anyhow::Result<()> {
    let roster = store.roster.load();
    let ledger = store.ledger.load();
    let policies = store.policies.load();

    log::info!(
        "Store scan complete: {} roster rows, {} ledger rows, {} team policies",
        roster.len(),
        ledger.len(),
        policies.len()
    );

    Ok(())
}
