//! Ordinary/extra hours of a closed ENTRY/EXIT pair.

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

use crate::attendance::error::AttendanceError;
use crate::model::workday::WorkdayHours;

/// Statutory ceiling of ordinary plus extra hours in one day.
pub const LEGAL_DAILY_MAX_HOURS: f64 = 12.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub schedule_id: u64,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub break_minutes: u32,
}

impl ScheduleWindow {
    /// Scheduled hours net of the break. An end earlier than the start wraps
    /// past midnight.
    pub fn scheduled_hours(&self) -> f64 {
        let mut span = self.end - self.start;
        if span < TimeDelta::zero() {
            span += TimeDelta::days(1);
        }
        hours(span) - f64::from(self.break_minutes) / 60.0
    }
}

fn hours(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 3_600_000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Truncates to whole cents so a capped value never lands above its cap.
/// The epsilon absorbs binary noise such as 0.29 * 100 = 28.999...
fn floor2(value: f64) -> f64 {
    ((value * 100.0) + 1e-9).floor() / 100.0
}

/// Computes the hours of a workday. Excess over the schedule only counts as
/// extra up to the approved overtime and the legal daily ceiling.
pub fn compute(
    entry: DateTime<Utc>,
    exit: DateTime<Utc>,
    window: &ScheduleWindow,
    approved_overtime_hours: f64,
) -> Result<WorkdayHours, AttendanceError> {
    let scheduled = window.scheduled_hours();
    if scheduled <= 0.0 {
        return Err(AttendanceError::ScheduleMisconfigured {
            schedule_id: window.schedule_id,
            reason: format!("scheduled duration is {scheduled:.2} hours after the break"),
        });
    }

    let worked = hours(exit - entry).max(0.0);
    let ordinary = round2(worked).min(floor2(scheduled));
    if ordinary > LEGAL_DAILY_MAX_HOURS {
        return Err(AttendanceError::ScheduleExceedsLegalLimit {
            ordinary_hours: ordinary,
            limit: LEGAL_DAILY_MAX_HOURS,
        });
    }

    let excess = round2((worked - scheduled).max(0.0));
    let extra = excess
        .min(floor2(approved_overtime_hours.max(0.0)))
        .min(round2(LEGAL_DAILY_MAX_HOURS - ordinary))
        .max(0.0);

    Ok(WorkdayHours {
        ordinary_hours: ordinary,
        extra_hours: extra,
    })
}
