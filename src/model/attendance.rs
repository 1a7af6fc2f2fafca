use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Daily attendance status. The serialized labels are the canonical Spanish
/// values persisted in the `Estado` column.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(ascii_case_insensitive)]
pub enum Status {
    #[serde(rename = "Presente")]
    #[strum(serialize = "Presente")]
    Present,

    #[serde(rename = "Ausente")]
    #[strum(serialize = "Ausente")]
    Absent,

    #[serde(rename = "Tarde")]
    #[strum(serialize = "Tarde")]
    Late,

    #[serde(rename = "Licencia")]
    #[strum(serialize = "Licencia")]
    MedicalLeave,

    #[serde(rename = "Vacaciones")]
    #[strum(serialize = "Vacaciones")]
    Vacation,
}

/// One row of the attendance ledger: a single (date, team, employee)
/// submission. At most one row per key is expected, but only the pending
/// view enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "date": "2024-01-01",
        "team": "Sede Norte",
        "name": "Ana Torres",
        "cedula": "1032456789",
        "status": "Presente",
        "note": "",
        "support_doc": null
    })
)]
pub struct AttendanceRecord {
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "Sede Norte")]
    pub team: String,

    #[schema(example = "Ana Torres")]
    pub name: String,

    #[schema(example = "1032456789")]
    #[serde(default)]
    pub cedula: String,

    #[schema(example = "Presente")]
    pub status: Status,

    /// Free-text observation
    #[schema(example = "")]
    #[serde(default)]
    pub note: String,

    /// Relative path of an uploaded support document, if any
    #[schema(example = "soportes/2024-01-01_Ana_Torres.pdf", nullable = true)]
    #[serde(default)]
    pub support_doc: Option<String>,
}

impl AttendanceRecord {
    /// A record must identify a team and an employee to be worth writing.
    pub fn is_valid(&self) -> bool {
        !self.team.trim().is_empty() && !self.name.trim().is_empty()
    }
}
