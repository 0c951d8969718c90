use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// "Jornada diaria": one row per employee and calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyWorkday {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2026-02-02", format = "date", value_type = String)]
    pub work_date: NaiveDate,
    pub ordinary_hours: f64,
    pub extra_hours: f64,
    pub holiday_id: Option<u64>,
    pub incapacity_id: Option<u64>,
    pub vacation_request_id: Option<u64>,
    pub permit_id: Option<u64>,
}

impl DailyWorkday {
    pub fn hours(&self) -> WorkdayHours {
        WorkdayHours {
            ordinary_hours: self.ordinary_hours,
            extra_hours: self.extra_hours,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkdayHours {
    #[schema(example = 9.0)]
    pub ordinary_hours: f64,
    #[schema(example = 1.0)]
    pub extra_hours: f64,
}
