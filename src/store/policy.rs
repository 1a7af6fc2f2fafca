use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::warn;

use crate::model::policy::{ADMIN_TEAM, PolicySet, TeamPolicy};

use super::{StoreError, guard};

/// Secret seeded into the ADMIN entry when the config resets.
const DEFAULT_ADMIN_PASSWORD: &str = "Admin26";

/// The hardcoded reset set: teams are provisioned through the policy
/// editor, so only ADMIN ships by default.
static DEFAULT_POLICIES: Lazy<PolicySet> = Lazy::new(|| {
    let mut set = PolicySet::new();
    set.insert(
        ADMIN_TEAM.to_string(),
        TeamPolicy::open(DEFAULT_ADMIN_PASSWORD),
    );
    set
});

/// Older config files stored a bare secret string per team; those upgrade
/// to the full form with an unrestricted window.
#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyEntry {
    Full(TeamPolicy),
    Legacy(String),
}

impl From<PolicyEntry> for TeamPolicy {
    fn from(entry: PolicyEntry) -> Self {
        match entry {
            PolicyEntry::Full(policy) => policy,
            PolicyEntry::Legacy(password) => TeamPolicy::open(password),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolicyStore {
    path: PathBuf,
}

impl PolicyStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current policy set. A missing or corrupt file resets to the default
    /// set, and the ADMIN entry is always present in the result.
    pub fn load(&self) -> PolicySet {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) if !raw.trim().is_empty() => raw,
            _ => return DEFAULT_POLICIES.clone(),
        };

        let parsed: BTreeMap<String, PolicyEntry> = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "policy config unreadable; resetting to defaults");
                return DEFAULT_POLICIES.clone();
            }
        };

        let mut set: PolicySet = parsed
            .into_iter()
            .map(|(team, entry)| (team, entry.into()))
            .collect();
        set.entry(ADMIN_TEAM.to_string())
            .or_insert_with(|| TeamPolicy::open(DEFAULT_ADMIN_PASSWORD));
        set
    }

    /// Persists the set, re-inserting the ADMIN entry if the caller dropped
    /// it. The previous file is snapshotted to `.bak` first.
    pub fn save(&self, policies: &PolicySet) -> Result<(), StoreError> {
        let mut policies = policies.clone();
        policies
            .entry(ADMIN_TEAM.to_string())
            .or_insert_with(|| TeamPolicy::open(DEFAULT_ADMIN_PASSWORD));

        guard::backup_before_write(&self.path);
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&policies)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_resets_to_defaults() {
        let dir = tempdir().unwrap();
        let store = PolicyStore::new(dir.path().join("equipos.json"));

        let set = store.load();
        assert_eq!(set.len(), 1);
        assert_eq!(set[ADMIN_TEAM].password, "Admin26");
    }

    #[test]
    fn corrupt_file_resets_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("equipos.json");
        fs::write(&path, "{not json").unwrap();

        let set = PolicyStore::new(path).load();
        assert_eq!(set.len(), 1);
        assert!(set.contains_key(ADMIN_TEAM));
    }

    #[test]
    fn legacy_string_entries_upgrade() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("equipos.json");
        fs::write(&path, r#"{"A": "secret"}"#).unwrap();

        let set = PolicyStore::new(path).load();
        assert_eq!(
            set["A"],
            TeamPolicy::new("secret", "00:00", "23:59")
        );
        // ADMIN is implicitly present even when absent from disk
        assert!(set.contains_key(ADMIN_TEAM));
    }

    #[test]
    fn save_reinserts_admin() {
        let dir = tempdir().unwrap();
        let store = PolicyStore::new(dir.path().join("equipos.json"));

        let mut set = PolicySet::new();
        set.insert(
            "A".to_string(),
            TeamPolicy::new("secret", "06:00", "22:00"),
        );
        store.save(&set).unwrap();

        let reloaded = store.load();
        assert!(reloaded.contains_key(ADMIN_TEAM));
        assert_eq!(reloaded["A"].inicio, "06:00");
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = PolicyStore::new(dir.path().join("equipos.json"));

        let mut set = store.load();
        set.insert(
            "Sede Norte".to_string(),
            TeamPolicy::new("norte2024", "06:00", "22:00"),
        );
        store.save(&set).unwrap();

        assert_eq!(store.load(), set);
    }
}
