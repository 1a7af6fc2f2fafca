use chrono::NaiveTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::policy::{ADMIN_TEAM, PolicySet};

/// Emergency master secret: resolves to ADMIN no matter what the persisted
/// config holds, so a broken `equipos.json` can never lock the admin out.
pub const MASTER_KEY: &str = "Admin26";

/// The identity a submitted secret resolves to. There is no session: the
/// secret is presented on every request and resolved statelessly.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamIdentity {
    #[schema(example = "Sede Norte")]
    pub team: String,
    pub is_admin: bool,
}

impl TeamIdentity {
    pub fn admin() -> Self {
        Self {
            team: ADMIN_TEAM.to_string(),
            is_admin: true,
        }
    }

    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }

    /// Whether this identity may act on `team`'s data.
    pub fn can_manage(&self, team: &str) -> bool {
        self.is_admin || self.team == team
    }
}

/// Resolves a submitted secret to a team. The master key wins first, then
/// the first per-team policy whose stored secret matches by equality.
pub fn authenticate(policies: &PolicySet, secret: &str) -> Option<TeamIdentity> {
    if secret == MASTER_KEY {
        return Some(TeamIdentity::admin());
    }

    policies
        .iter()
        .find(|(_, policy)| policy.password == secret)
        .map(|(team, _)| TeamIdentity {
            is_admin: team == ADMIN_TEAM,
            team: team.clone(),
        })
}

/// Time-of-day gate. ADMIN always passes; a window whose `inicio` or `fin`
/// does not parse as `HH:MM` allows everything rather than locking the team
/// out on bad config. Bounds are inclusive.
pub fn is_within_window(policies: &PolicySet, team: &str, now: NaiveTime) -> bool {
    if team == ADMIN_TEAM {
        return true;
    }
    let Some(policy) = policies.get(team) else {
        return true;
    };
    match (parse_hhmm(&policy.inicio), parse_hhmm(&policy.fin)) {
        (Some(start), Some(end)) => start <= now && now <= end,
        _ => true,
    }
}

fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}
