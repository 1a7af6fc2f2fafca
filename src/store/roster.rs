use std::path::{Path, PathBuf};

use crate::model::employee::Employee;

use super::codec::Table;
use super::{StoreError, guard};

/// Canonical roster schema; all teams share one file.
pub const ROSTER_COLUMNS: [&str; 3] = ["Equipo", "Nombre", "Cedula"];

#[derive(Debug, Clone)]
pub struct RosterStore {
    path: PathBuf,
}

impl RosterStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full roster in file order. Rows without a name carry no identity and
    /// are skipped.
    pub fn load(&self) -> Vec<Employee> {
        let table = guard::read_with_recovery(&self.path, &ROSTER_COLUMNS);
        (0..table.len())
            .filter_map(|i| {
                let name = table.value(i, "Nombre").trim();
                if name.is_empty() {
                    return None;
                }
                Some(Employee {
                    team: table.value(i, "Equipo").trim().to_string(),
                    name: name.to_string(),
                    cedula: table.value(i, "Cedula").trim().to_string(),
                })
            })
            .collect()
    }

    /// Members of one team, preserving roster order.
    pub fn team(&self, team: &str) -> Vec<Employee> {
        self.load().into_iter().filter(|e| e.team == team).collect()
    }

    pub fn save(&self, employees: &[Employee]) -> Result<(), StoreError> {
        let mut table = Table::empty(&ROSTER_COLUMNS);
        for e in employees {
            table.push_row(vec![e.team.clone(), e.name.clone(), e.cedula.clone()]);
        }
        guard::write(&table, &self.path)
    }
}
