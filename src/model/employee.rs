use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity slice of an employee echoed back on every mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "id": 1,
        "identification": "1032456789",
        "firstName": "Laura",
        "lastNameA": "Gomez",
        "lastNameB": "Rios"
    })
)]
pub struct EmployeeSummary {
    #[schema(example = 1)]
    pub id: u64,

    /// External identification number (national id)
    #[schema(example = "1032456789")]
    pub identification: String,

    #[schema(example = "Laura")]
    pub first_name: String,

    #[schema(example = "Gomez")]
    pub last_name_a: String,

    #[schema(example = "Rios", nullable = true)]
    pub last_name_b: Option<String>,
}
