use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::attendance::error::AttendanceError;
use crate::attendance::workday_calculator::ScheduleWindow;
use crate::model::schedule::{DayCode, DaySet, ScheduleTemplate};
use crate::model::status::StatusId;
use crate::store::ReferenceProvider;

/// Effective daily schedule of an employee's active contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchedule {
    pub schedule_id: u64,
    pub contract_id: u64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: u32,
    pub working_days: DaySet,
    pub rest_days: DaySet,
}

impl ResolvedSchedule {
    pub fn from_template(template: &ScheduleTemplate) -> Result<Self, AttendanceError> {
        let parse = |codes: &str, column: &str| {
            DaySet::parse(codes).map_err(|c| AttendanceError::ScheduleMisconfigured {
                schedule_id: template.id,
                reason: format!("{column} contains unknown day code {c:?}"),
            })
        };

        Ok(Self {
            schedule_id: template.id,
            contract_id: template.contract_id,
            start_time: template.start_time,
            end_time: template.end_time,
            break_minutes: template.break_minutes,
            working_days: parse(&template.working_days, "working_days")?,
            rest_days: parse(&template.rest_days, "rest_days")?,
        })
    }

    pub fn is_rest_day(&self, day: DayCode) -> bool {
        self.rest_days.contains(day)
    }

    pub fn window(&self) -> ScheduleWindow {
        ScheduleWindow {
            schedule_id: self.schedule_id,
            start: self.start_time,
            end: self.end_time,
            break_minutes: self.break_minutes,
        }
    }
}

/// Calendar date of an instant in the organization timezone.
pub fn local_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

/// Locale weekday code of a calendar date.
pub fn day_code(date: NaiveDate) -> DayCode {
    DayCode::from_weekday(date.weekday())
}

/// Resolves the active contract and its active schedule template.
pub async fn resolve<R>(
    provider: &mut R,
    employee_id: u64,
    date: NaiveDate,
    active: StatusId,
) -> Result<ResolvedSchedule, AttendanceError>
where
    R: ReferenceProvider + ?Sized,
{
    let contract = provider
        .find_active_contract(employee_id, active)
        .await?
        .ok_or(AttendanceError::NoActiveContract { employee_id })?;

    let template = provider
        .find_active_schedule(contract.id, active)
        .await?
        .ok_or(AttendanceError::NoActiveSchedule {
            contract_id: contract.id,
        })?;

    let schedule = ResolvedSchedule::from_template(&template)?;
    tracing::debug!(
        employee_id,
        %date,
        contract_id = contract.id,
        schedule_id = schedule.schedule_id,
        working_days = %schedule.working_days,
        rest_days = %schedule.rest_days,
        "Resolved schedule"
    );
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::contract::Contract;
    use crate::store::AttendanceStore;
    use crate::store::memory::{MemoryState, MemoryStore};

    const ACTIVE: StatusId = 1;
    const INACTIVE: StatusId = 2;

    fn template(id: u64, contract_id: u64, status_id: StatusId, rest_days: &str) -> ScheduleTemplate {
        ScheduleTemplate {
            id,
            contract_id,
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            break_minutes: 60,
            working_days: "LKMJV".to_string(),
            rest_days: rest_days.to_string(),
            status_id,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn resolves_active_schedule_of_active_contract() {
        let mut state = MemoryState::default();
        state.contracts.push(Contract { id: 10, employee_id: 1, status_id: INACTIVE });
        state.contracts.push(Contract { id: 11, employee_id: 1, status_id: ACTIVE });
        state.schedules.push(template(20, 10, ACTIVE, "D"));
        state.schedules.push(template(21, 11, INACTIVE, "D"));
        state.schedules.push(template(22, 11, ACTIVE, "SD"));
        let store = MemoryStore::new(state);
        let mut tx = store.begin().await.unwrap();

        let schedule = resolve(&mut tx, 1, date(2026, 2, 2), ACTIVE).await.unwrap();

        assert_eq!(schedule.schedule_id, 22);
        assert_eq!(schedule.contract_id, 11);
        assert!(schedule.is_rest_day(DayCode::S));
        assert!(schedule.is_rest_day(DayCode::D));
        assert!(!schedule.is_rest_day(DayCode::L));
        assert_eq!(schedule.window().break_minutes, 60);
    }

    #[tokio::test]
    async fn missing_contract_and_schedule_are_distinct_errors() {
        let mut state = MemoryState::default();
        state.contracts.push(Contract { id: 11, employee_id: 1, status_id: ACTIVE });
        state.schedules.push(template(21, 11, INACTIVE, "SD"));
        let store = MemoryStore::new(state);
        let mut tx = store.begin().await.unwrap();

        let err = resolve(&mut tx, 2, date(2026, 2, 2), ACTIVE).await.unwrap_err();
        assert!(matches!(err, AttendanceError::NoActiveContract { employee_id: 2 }));

        let err = resolve(&mut tx, 1, date(2026, 2, 2), ACTIVE).await.unwrap_err();
        assert!(matches!(err, AttendanceError::NoActiveSchedule { contract_id: 11 }));
    }

    #[test]
    fn unknown_day_code_is_a_misconfiguration() {
        let err = ResolvedSchedule::from_template(&template(5, 1, ACTIVE, "SX")).unwrap_err();
        assert!(matches!(err, AttendanceError::ScheduleMisconfigured { schedule_id: 5, .. }));
    }

    #[test]
    fn local_date_follows_configured_timezone() {
        let tz: Tz = "America/Bogota".parse().unwrap();
        // 03:30 UTC on Tuesday is still Monday evening in Bogota (UTC-5).
        let at = DateTime::parse_from_rfc3339("2026-02-03T03:30:00Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(local_date(at, tz), date(2026, 2, 2));
        assert_eq!(local_date(at, chrono_tz::UTC), date(2026, 2, 3));
        assert_eq!(day_code(local_date(at, tz)), DayCode::L);
        assert_eq!(day_code(date(2026, 2, 7)), DayCode::S);
    }
}
