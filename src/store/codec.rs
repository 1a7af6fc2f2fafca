use std::fs;
use std::path::Path;

use tracing::debug;

use super::StoreError;

const PRIMARY_DELIMITER: u8 = b',';
const SECONDARY_DELIMITER: u8 = b';';

/// An untyped delimited table. Every field is opaque text; typed parsing
/// (dates, status labels) happens in the calling stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn empty(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table, padding or truncating every row to the column count
    /// so lookups never go out of bounds.
    pub fn from_parts(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self {
            columns,
            rows: Vec::with_capacity(rows.len()),
        };
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len(), String::new());
        self.rows.push(row);
    }

    /// Position of a column by name, case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Field at (row, column name); empty string when either is absent.
    pub fn value(&self, row: usize, column: &str) -> &str {
        self.column_index(column)
            .and_then(|i| self.rows.get(row).and_then(|r| r.get(i)))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// A first data row that repeats the header strings is a header that
    /// survived a prior corrupt write; drop it.
    fn drop_header_echo(&mut self) {
        let echoes = self
            .rows
            .first()
            .is_some_and(|row| {
                row.iter()
                    .zip(&self.columns)
                    .all(|(field, column)| field.trim().eq_ignore_ascii_case(column))
            });
        if echoes {
            self.rows.remove(0);
        }
    }
}

struct ParseStrategy {
    delimiter: u8,
    has_headers: bool,
}

/// Fallback ladder: default format first, then positional recovery, then the
/// secondary delimiter. First success wins.
const STRATEGIES: [ParseStrategy; 4] = [
    ParseStrategy { delimiter: PRIMARY_DELIMITER, has_headers: true },
    ParseStrategy { delimiter: PRIMARY_DELIMITER, has_headers: false },
    ParseStrategy { delimiter: SECONDARY_DELIMITER, has_headers: true },
    ParseStrategy { delimiter: SECONDARY_DELIMITER, has_headers: false },
];

/// Reads a delimited file into a table. Never fails and never touches the
/// file: a missing, empty, or unrecognizable file comes back as an empty
/// table carrying `expected_columns` as its schema.
pub fn load(path: &Path, expected_columns: &[&str]) -> Table {
    let raw = match fs::read(path) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        _ => return Table::empty(expected_columns),
    };

    for strategy in &STRATEGIES {
        if let Some(table) = try_parse(&raw, strategy, expected_columns) {
            return table;
        }
    }

    debug!(path = %path.display(), "no parse strategy matched; treating file as empty");
    Table::empty(expected_columns)
}

fn try_parse(raw: &[u8], strategy: &ParseStrategy, expected_columns: &[&str]) -> Option<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(strategy.delimiter)
        .has_headers(strategy.has_headers)
        .flexible(true)
        .from_reader(raw);

    let columns: Vec<String> = if strategy.has_headers {
        let headers: Vec<String> = reader
            .headers()
            .ok()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let all_present = expected_columns
            .iter()
            .all(|needed| headers.iter().any(|h| h.eq_ignore_ascii_case(needed)));
        if !all_present {
            return None;
        }
        headers
    } else {
        expected_columns.iter().map(|c| (*c).to_string()).collect()
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        if !strategy.has_headers && record.len() != expected_columns.len() {
            return None;
        }
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    let mut table = Table::from_parts(columns, rows);
    table.drop_header_echo();
    Some(table)
}

/// Serializes with the canonical header row and delimiter, overwriting the
/// whole file. Appends are a table-level concat done by the caller.
pub fn save(table: &Table, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(PRIMARY_DELIMITER)
        .from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
