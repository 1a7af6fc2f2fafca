use std::collections::HashSet;

use chrono::NaiveDate;

use crate::model::employee::Employee;

use super::StoreError;
use super::ledger::LedgerStore;
use super::roster::RosterStore;

/// Employees of `team` with no attendance row yet for `date`, preserving
/// roster order. One pass over each table; nothing is cached between calls.
pub fn pending_for(
    roster: &RosterStore,
    ledger: &LedgerStore,
    team: &str,
    date: NaiveDate,
) -> Vec<Employee> {
    let submitted: HashSet<String> = ledger
        .load()
        .into_iter()
        .filter(|r| r.team == team && r.date == date)
        .map(|r| r.name)
        .collect();

    roster
        .team(team)
        .into_iter()
        .filter(|e| !submitted.contains(&e.name))
        .collect()
}

/// Absorbs a name typed during attendance entry into the roster, so it is
/// not lost from the next day's pending view. Appends when (team, name) is
/// new; an existing row gets its cedula refreshed when a different,
/// non-empty one arrives. Returns true when a row was appended.
///
/// Duplicate (team, name) rows exist in the wild; equality picks the first.
pub fn merge_new_employee(
    roster: &RosterStore,
    team: &str,
    name: &str,
    cedula: &str,
) -> Result<bool, StoreError> {
    let team = team.trim();
    let name = name.trim();
    let cedula = cedula.trim();

    let mut employees = roster.load();
    if let Some(existing) = employees
        .iter_mut()
        .find(|e| e.team == team && e.name == name)
    {
        if !cedula.is_empty() && existing.cedula != cedula {
            existing.cedula = cedula.to_string();
            roster.save(&employees)?;
        }
        return Ok(false);
    }

    employees.push(Employee {
        team: team.to_string(),
        name: name.to_string(),
        cedula: cedula.to_string(),
    });
    roster.save(&employees)?;
    Ok(true)
}
