use crate::api::admin::OverwriteRequest;
use crate::api::attendance::{
    LedgerListResponse, PendingResponse, SubmitRequest, SubmitRow,
};
use crate::api::roster::{CreateEmployee, MemberRow, RosterListResponse};
use crate::auth::identity::TeamIdentity;
use crate::model::attendance::{AttendanceRecord, Status};
use crate::model::employee::Employee;
use crate::model::policy::TeamPolicy;
use crate::models::LoginReq;
use utoipa::Modify;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Asistencia API",
        version = "1.0.0",
        description = r#"
## Team Attendance Service

Records daily staff attendance per team over a flat-file store and feeds the
dashboard and the daily pending view.

### 🔹 Key Features
- **Daily Attendance**
  - Submit the day's form, view the pending roster, slice the ledger
- **Roster Management**
  - Names typed ad hoc into the form are absorbed into the roster
- **Corrections**
  - Admin replaces the ledger with the edited end state; the previous
    generation survives as a `.bak` snapshot
- **Access Policies**
  - Per-team shared secrets and allowed time-of-day windows

### 🔐 Security
Every protected endpoint takes the team secret in the **X-Access-Key**
header. The key resolves to a team on each request; there are no sessions.

### 📦 Response Format
- JSON-based RESTful responses

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::attendance::submit,
        crate::api::attendance::pending,
        crate::api::attendance::list_records,

        crate::api::roster::list_roster,
        crate::api::roster::add_employee,
        crate::api::roster::replace_team,
        crate::api::roster::remove_employee,

        crate::api::documents::upload,

        crate::api::admin::overwrite_ledger,
        crate::api::admin::purge_ledger,
        crate::api::admin::get_policies,
        crate::api::admin::update_policies
    ),
    components(
        schemas(
            LoginReq,
            TeamIdentity,
            Employee,
            AttendanceRecord,
            Status,
            TeamPolicy,
            SubmitRow,
            SubmitRequest,
            PendingResponse,
            LedgerListResponse,
            CreateEmployee,
            MemberRow,
            RosterListResponse,
            OverwriteRequest
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Access key resolution"),
        (name = "Attendance", description = "Daily attendance APIs"),
        (name = "Roster", description = "Roster management APIs"),
        (name = "Documents", description = "Support document uploads"),
        (name = "Admin", description = "Correction and policy APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Access-Key"))),
            );
        }
    }
}
