use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The distinguished team with universal access.
pub const ADMIN_TEAM: &str = "ADMIN";

/// Per-team access policy: a shared secret plus an allowed time-of-day
/// window. `inicio`/`fin` stay as raw `HH:MM` strings; they are parsed at
/// evaluation time so a bad value degrades to "always allowed" instead of
/// making the config unloadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "password": "norte2024",
        "inicio": "06:00",
        "fin": "22:00"
    })
)]
pub struct TeamPolicy {
    pub password: String,

    #[serde(default = "TeamPolicy::default_inicio")]
    #[schema(example = "06:00")]
    pub inicio: String,

    #[serde(default = "TeamPolicy::default_fin")]
    #[schema(example = "22:00")]
    pub fin: String,
}

impl TeamPolicy {
    pub fn new(password: impl Into<String>, inicio: impl Into<String>, fin: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            inicio: inicio.into(),
            fin: fin.into(),
        }
    }

    /// Policy for a secret with no window restriction.
    pub fn open(password: impl Into<String>) -> Self {
        Self::new(password, Self::default_inicio(), Self::default_fin())
    }

    fn default_inicio() -> String {
        "00:00".to_string()
    }

    fn default_fin() -> String {
        "23:59".to_string()
    }
}

/// All persisted policies keyed by team name. BTreeMap keeps scan and save
/// order stable across loads.
pub type PolicySet = BTreeMap<String, TeamPolicy>;
