use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::debug;

use crate::model::attendance::{AttendanceRecord, Status};

use super::codec::Table;
use super::{StoreError, guard};

/// Canonical ledger schema. `Fecha` is `YYYY-MM-DD`; `Soporte` is a relative
/// path or empty.
pub const LEDGER_COLUMNS: [&str; 7] = [
    "Fecha",
    "Equipo",
    "Nombre",
    "Cedula",
    "Estado",
    "Observacion",
    "Soporte",
];

#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every readable ledger row, in file order. Rows whose date or status
    /// does not parse are skipped, not fatal.
    pub fn load(&self) -> Vec<AttendanceRecord> {
        let table = guard::read_with_recovery(&self.path, &LEDGER_COLUMNS);
        (0..table.len())
            .filter_map(|i| record_from_row(&table, i))
            .collect()
    }

    /// Ledger slice for dashboards: optional team filter plus an inclusive
    /// date range.
    pub fn slice(
        &self,
        team: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Vec<AttendanceRecord> {
        self.load()
            .into_iter()
            .filter(|r| team.is_none_or(|t| r.team == t))
            .filter(|r| from.is_none_or(|d| r.date >= d))
            .filter(|r| to.is_none_or(|d| r.date <= d))
            .collect()
    }

    /// Appends records to the history: read the current table through the
    /// recovery guard, concat, write back. Records missing a team or name
    /// never reach the file.
    pub fn append(&self, records: &[AttendanceRecord]) -> Result<usize, StoreError> {
        validate(records)?;

        let mut table = guard::read_with_recovery(&self.path, &LEDGER_COLUMNS);
        for record in records {
            let row = row_for(&table, record);
            table.push_row(row);
        }
        guard::write(&table, &self.path)?;
        Ok(records.len())
    }

    /// Full replacement with the complete desired end state. Used only by
    /// the administrative correction flow; the `.bak` snapshot written by
    /// the guard is the only trail of what was replaced.
    pub fn overwrite_all(&self, records: &[AttendanceRecord]) -> Result<(), StoreError> {
        validate(records)?;

        let mut table = Table::empty(&LEDGER_COLUMNS);
        for record in records {
            let row = row_for(&table, record);
            table.push_row(row);
        }
        debug!(rows = records.len(), "overwriting attendance ledger");
        guard::write(&table, &self.path)
    }

    /// Header-only ledger; irreversible beyond the `.bak` snapshot.
    pub fn purge(&self) -> Result<(), StoreError> {
        self.overwrite_all(&[])
    }
}

fn validate(records: &[AttendanceRecord]) -> Result<(), StoreError> {
    for record in records {
        if !record.is_valid() {
            return Err(StoreError::InvalidRecord {
                name: record.name.clone(),
                date: record.date,
            });
        }
    }
    Ok(())
}

fn record_from_row(table: &Table, i: usize) -> Option<AttendanceRecord> {
    let date = NaiveDate::parse_from_str(table.value(i, "Fecha").trim(), "%Y-%m-%d").ok()?;
    let status = Status::from_str(table.value(i, "Estado").trim()).ok()?;
    let name = table.value(i, "Nombre").trim();
    if name.is_empty() {
        return None;
    }

    let support = table.value(i, "Soporte").trim();
    Some(AttendanceRecord {
        date,
        team: table.value(i, "Equipo").trim().to_string(),
        name: name.to_string(),
        cedula: table.value(i, "Cedula").trim().to_string(),
        status,
        note: table.value(i, "Observacion").to_string(),
        support_doc: (!support.is_empty()).then(|| support.to_string()),
    })
}

/// Lays a record out along `table`'s own column order, so appends stay
/// aligned even when the file on disk carries extra or reordered columns.
fn row_for(table: &Table, record: &AttendanceRecord) -> Vec<String> {
    let mut row = vec![String::new(); table.columns().len()];
    let mut put = |column: &str, value: String| {
        if let Some(i) = table.column_index(column) {
            row[i] = value;
        }
    };

    put("Fecha", record.date.to_string());
    put("Equipo", record.team.clone());
    put("Nombre", record.name.clone());
    put("Cedula", record.cedula.clone());
    put("Estado", record.status.to_string());
    put("Observacion", record.note.clone());
    put("Soporte", record.support_doc.clone().unwrap_or_default());
    row
}
