use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "team": "Sede Norte",
        "name": "Ana Torres",
        "cedula": "1032456789"
    })
)]
pub struct Employee {
    #[schema(example = "Sede Norte")]
    pub team: String,

    #[schema(example = "Ana Torres")]
    pub name: String,

    /// National ID, free text; may be empty
    #[schema(example = "1032456789")]
    #[serde(default)]
    pub cedula: String,
}
