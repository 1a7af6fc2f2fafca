use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::StoreError;
use super::codec::{self, Table};

/// `{path}.bak`, one generation deep.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

fn non_empty(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

/// Snapshots `path` to its `.bak` before a destructive write, overwriting
/// any prior backup. Best effort: a failed copy is logged and the write
/// goes ahead without a fresh backup.
pub fn backup_before_write(path: &Path) {
    if !non_empty(path) {
        return;
    }
    if let Err(e) = fs::copy(path, backup_path(path)) {
        warn!(error = %e, path = %path.display(), "could not snapshot file before write");
    }
}

pub fn write(table: &Table, path: &Path) -> Result<(), StoreError> {
    backup_before_write(path);
    codec::save(table, path)
}

/// Reads a table, first copying the `.bak` over a missing or zero-length
/// primary. With no usable backup either, this behaves as an empty table.
pub fn read_with_recovery(path: &Path, expected_columns: &[&str]) -> Table {
    if !non_empty(path) {
        let backup = backup_path(path);
        if non_empty(&backup) {
            match fs::copy(&backup, path) {
                Ok(_) => info!(path = %path.display(), "restored file from backup"),
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "could not restore file from backup")
                }
            }
        }
    }
    codec::load(path, expected_columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SCHEMA: [&str; 2] = ["Team", "Name"];

    fn table_with(rows: &[[&str; 2]]) -> Table {
        let mut table = Table::empty(&SCHEMA);
        for row in rows {
            table.push_row(row.iter().map(|f| (*f).to_string()).collect());
        }
        table
    }

    #[test]
    fn first_write_creates_no_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");

        write(&table_with(&[["A", "Ana"]]), &path).unwrap();
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn overwrite_snapshots_previous_generation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");

        let first = table_with(&[["A", "Ana"]]);
        write(&first, &path).unwrap();
        write(&table_with(&[["A", "Luis"]]), &path).unwrap();

        assert_eq!(codec::load(&backup_path(&path), &SCHEMA), first);
        assert_eq!(codec::load(&path, &SCHEMA), table_with(&[["A", "Luis"]]));
    }

    #[test]
    fn truncated_primary_recovers_from_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.csv");

        let first = table_with(&[["A", "Ana"]]);
        write(&first, &path).unwrap();
        write(&table_with(&[["A", "Luis"]]), &path).unwrap();

        // a write that died partway leaves a zero-length primary behind
        fs::write(&path, "").unwrap();

        assert_eq!(read_with_recovery(&path, &SCHEMA), first);
        // and the restore is durable
        assert_eq!(codec::load(&path, &SCHEMA), first);
    }

    #[test]
    fn no_backup_behaves_as_empty_table() {
        let dir = tempdir().unwrap();
        let table = read_with_recovery(&dir.path().join("missing.csv"), &SCHEMA);
        assert!(table.is_empty());
        assert_eq!(table.columns(), &["Team", "Name"]);
    }
}
