use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum MarkType {
    Entry,
    Exit,
}

/// Append-only clock event. Never updated once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    #[schema(example = 41)]
    pub id: u64,
    #[schema(example = 1)]
    pub employee_id: u64,
    pub mark_type: MarkType,
    #[schema(example = "2026-02-02T13:00:00Z", format = "date-time", value_type = String)]
    pub marked_at: DateTime<Utc>,
    /// Calendar date of `marked_at` in the organization timezone
    #[schema(example = "2026-02-02", format = "date", value_type = String)]
    pub work_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendanceMark {
    pub employee_id: u64,
    pub mark_type: MarkType,
    pub marked_at: DateTime<Utc>,
    pub work_date: NaiveDate,
}
