use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::attendance::error::AttendanceError;
use crate::model::workday::DailyWorkday;
use crate::store::ReferenceProvider;

/// Kind of leave that can block a day for clocking.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveKind {
    Incapacity,
    Vacation,
    Permit,
}

impl fmt::Display for LeaveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LeaveKind::Incapacity => "an incapacity",
            LeaveKind::Vacation => "a vacation",
            LeaveKind::Permit => "a permit",
        };
        f.write_str(label)
    }
}

/// Leave referenced by a daily row, if any. A holiday reference alone does
/// not block marking.
pub fn blocking_leave(workday: &DailyWorkday) -> Option<LeaveKind> {
    if workday.incapacity_id.is_some() {
        Some(LeaveKind::Incapacity)
    } else if workday.vacation_request_id.is_some() {
        Some(LeaveKind::Vacation)
    } else if workday.permit_id.is_some() {
        Some(LeaveKind::Permit)
    } else {
        None
    }
}

/// Refuses the date when its daily row carries a leave reference.
/// Returns the existing, unblocked row so the caller can update it in place.
pub async fn ensure_unblocked<R>(
    provider: &mut R,
    employee_id: u64,
    date: NaiveDate,
) -> Result<Option<DailyWorkday>, AttendanceError>
where
    R: ReferenceProvider + ?Sized,
{
    let existing = provider.find_daily_workday(employee_id, date).await?;

    if let Some(kind) = existing.as_ref().and_then(blocking_leave) {
        return Err(AttendanceError::DayBlockedByLeave { date, kind });
    }

    Ok(existing)
}
