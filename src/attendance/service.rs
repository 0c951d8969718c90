use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::attendance::error::{AttendanceError, ErrorCategory};
use crate::attendance::leave_guard;
use crate::attendance::mark_ledger::{DayLedger, LedgerState};
use crate::attendance::schedule_resolver::{self, day_code, local_date};
use crate::attendance::workday_calculator;
use crate::model::{
    attendance::{AttendanceMark, MarkType, NewAttendanceMark},
    employee::EmployeeSummary,
    status::StatusName,
    workday::{DailyWorkday, WorkdayHours},
};
use crate::store::{AttendanceStore, AttendanceTx, ReferenceProvider, StoreError};
use crate::utils::status_catalog::StatusCatalog;

/// ISO 8601 forms with an explicit offset that RFC 3339 parsing rejects
/// (minute precision, offsets without a colon).
const OFFSET_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Offset-less timestamps accepted as organization local time.
const LOCAL_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy)]
pub struct AttendanceSettings {
    /// Timezone marks are filed in
    pub timezone: Tz,
}

/// Raw clock event as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct MarkRequest {
    pub identification: Option<String>,
    pub mark_type: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkResult {
    #[schema(example = 41)]
    pub mark_id: u64,
    pub employee: EmployeeSummary,
    pub mark_type: MarkType,
    #[schema(example = "2026-02-02T17:00:00-05:00", format = "date-time", value_type = String)]
    pub timestamp: DateTime<FixedOffset>,
    #[schema(example = "2026-02-02", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub workday: WorkdayHours,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub employee: EmployeeSummary,
    #[schema(example = "2026-02-02", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub state: LedgerState,
    pub entry: Option<AttendanceMark>,
    pub exit: Option<AttendanceMark>,
    pub workday: Option<DailyWorkday>,
}

#[derive(Debug, Clone, PartialEq)]
struct ValidatedMark {
    identification: String,
    mark_type: MarkType,
    at: DateTime<Utc>,
}

pub struct AttendanceService<S> {
    store: S,
    catalog: StatusCatalog,
    settings: AttendanceSettings,
}

impl<S: AttendanceStore> AttendanceService<S> {
    pub fn new(store: S, catalog: StatusCatalog, settings: AttendanceSettings) -> Self {
        Self {
            store,
            catalog,
            settings,
        }
    }

    /// Registers one ENTRY or EXIT mark. Everything runs in one transaction;
    /// any error leaves no trace of the mark or the daily row.
    pub async fn register_mark(&self, request: MarkRequest) -> Result<MarkResult, AttendanceError> {
        let outcome = self.try_register_mark(request).await;

        match &outcome {
            Ok(result) => info!(
                mark_id = result.mark_id,
                employee_id = result.employee.id,
                mark_type = %result.mark_type,
                date = %result.date,
                ordinary_hours = result.workday.ordinary_hours,
                extra_hours = result.workday.extra_hours,
                "Attendance mark registered"
            ),
            Err(e) => match e.category() {
                ErrorCategory::Validation | ErrorCategory::NotFound | ErrorCategory::BusinessRule => {
                    warn!(kind = e.code(), error = %e, "Attendance mark rejected")
                }
                ErrorCategory::IntegrityFault | ErrorCategory::Internal => {
                    error!(kind = e.code(), error = %e, "Attendance mark failed")
                }
            },
        }

        outcome
    }

    async fn try_register_mark(&self, request: MarkRequest) -> Result<MarkResult, AttendanceError> {
        let input = ValidatedMark::parse(request, self.settings.timezone)?;
        let date = local_date(input.at, self.settings.timezone);

        let mut tx = self.store.begin().await?;
        let outcome = self.register_in(&mut tx, &input, date).await;
        match outcome {
            Ok(result) => {
                tx.commit()
                    .await
                    .map_err(|e| duplicate_or_store(e, input.mark_type, date))?;
                Ok(result)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "Rollback of attendance mark failed");
                }
                Err(err)
            }
        }
    }

    async fn register_in(
        &self,
        tx: &mut S::Tx,
        input: &ValidatedMark,
        date: NaiveDate,
    ) -> Result<MarkResult, AttendanceError> {
        let employee = tx
            .find_employee_by_identification(&input.identification)
            .await?
            .ok_or_else(|| AttendanceError::EmployeeNotFound(input.identification.clone()))?;

        let active = self.catalog.id_of(StatusName::Active).await?;
        let schedule = schedule_resolver::resolve(tx, employee.id, date, active).await?;

        let day = day_code(date);
        if schedule.is_rest_day(day) {
            return Err(AttendanceError::RestDayMark { date, day });
        }

        let existing = leave_guard::ensure_unblocked(tx, employee.id, date).await?;

        let marks = tx.lock_day_marks(employee.id, date).await?;
        let ledger = DayLedger::from_marks(employee.id, date, marks)?;
        let entry_at = match input.mark_type {
            MarkType::Entry => {
                ledger.register_entry(date)?;
                None
            }
            MarkType::Exit => Some(ledger.register_exit(date, input.at)?.marked_at),
        };

        let mark = tx
            .insert_mark(&NewAttendanceMark {
                employee_id: employee.id,
                mark_type: input.mark_type,
                marked_at: input.at,
                work_date: date,
            })
            .await
            .map_err(|e| duplicate_or_store(e, input.mark_type, date))?;

        let workday = match entry_at {
            None => WorkdayHours::default(),
            Some(entry_at) => {
                let approved = self.catalog.id_of(StatusName::Approved).await?;
                let overtime = tx
                    .sum_approved_overtime_hours(employee.id, date, approved)
                    .await?;
                let hours =
                    workday_calculator::compute(entry_at, input.at, &schedule.window(), overtime)?;

                let row = tx.upsert_daily_workday(employee.id, date, hours).await?;
                tracing::debug!(
                    employee_id = employee.id,
                    %date,
                    workday_id = row.id,
                    updated_in_place = existing.is_some(),
                    approved_overtime = overtime,
                    "Daily workday computed"
                );
                row.hours()
            }
        };

        // The ledger must accept the stored mark; anything else is a bug.
        ledger.record(mark.clone())?;

        Ok(MarkResult {
            mark_id: mark.id,
            employee,
            mark_type: mark.mark_type,
            timestamp: mark.marked_at.with_timezone(&self.settings.timezone).fixed_offset(),
            date,
            workday,
        })
    }

    /// Read-only view of one employee-day. The transaction is always rolled back.
    pub async fn day_summary(
        &self,
        identification: &str,
        date: NaiveDate,
    ) -> Result<DaySummary, AttendanceError> {
        let identification = validate_identification(Some(identification))?;

        let mut tx = self.store.begin().await?;
        let summary = Self::summarize(&mut tx, identification, date).await;
        if let Err(rollback_err) = tx.rollback().await {
            error!(error = %rollback_err, "Rollback of day summary failed");
        }
        summary
    }

    async fn summarize(
        tx: &mut S::Tx,
        identification: String,
        date: NaiveDate,
    ) -> Result<DaySummary, AttendanceError> {
        let employee = tx
            .find_employee_by_identification(&identification)
            .await?
            .ok_or(AttendanceError::EmployeeNotFound(identification))?;

        let marks = tx.find_day_marks(employee.id, date).await?;
        let ledger = DayLedger::from_marks(employee.id, date, marks)?;
        let workday = tx.find_daily_workday(employee.id, date).await?;

        Ok(DaySummary {
            state: ledger.state(),
            entry: ledger.entry().cloned(),
            exit: ledger.exit().cloned(),
            employee,
            date,
            workday,
        })
    }
}

/// A unique-key rejection on the mark table means another request filed
/// the same mark first.
fn duplicate_or_store(err: StoreError, mark_type: MarkType, date: NaiveDate) -> AttendanceError {
    match (err, mark_type) {
        (StoreError::UniqueViolation(_), MarkType::Entry) => AttendanceError::DuplicateEntry { date },
        (StoreError::UniqueViolation(_), MarkType::Exit) => AttendanceError::DuplicateExit { date },
        (other, _) => AttendanceError::Store(other),
    }
}

fn validate_identification(raw: Option<&str>) -> Result<String, AttendanceError> {
    let identification = raw.map(str::trim).unwrap_or_default();
    if identification.is_empty() {
        return Err(AttendanceError::validation(
            "identification",
            "identification is required",
        ));
    }
    if identification.parse::<u64>().is_err() {
        return Err(AttendanceError::validation(
            "identification",
            format!("identification must be numeric, got {identification:?}"),
        ));
    }
    Ok(identification.to_string())
}

/// Parses an ISO 8601 instant. Values without an offset are read as wall
/// clock time in `tz`.
pub fn parse_timestamp(raw: &str, tz: Tz) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    let zulu = raw
        .strip_suffix(['Z', 'z'])
        .map(|rest| format!("{rest}+00:00"));
    let with_offset = zulu.as_deref().unwrap_or(raw);
    if let Some(at) = OFFSET_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(with_offset, format).ok())
    {
        return Ok(at.with_timezone(&Utc));
    }

    let naive = LOCAL_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| format!("timestamp {raw:?} is not a valid ISO 8601 date-time"))?;

    tz.from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| format!("timestamp {raw:?} does not exist or is ambiguous in {tz}"))
}

impl ValidatedMark {
    fn parse(request: MarkRequest, tz: Tz) -> Result<Self, AttendanceError> {
        let identification = validate_identification(request.identification.as_deref())?;

        let mark_type = match request.mark_type.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(AttendanceError::validation("markType", "markType is required"));
            }
            Some(raw) => raw.parse::<MarkType>().map_err(|_| {
                AttendanceError::validation(
                    "markType",
                    format!("markType must be ENTRY or EXIT, got {raw:?}"),
                )
            })?,
        };

        let at = match request.timestamp.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(AttendanceError::validation("timestamp", "timestamp is required"));
            }
            Some(raw) => {
                parse_timestamp(raw, tz).map_err(|msg| AttendanceError::validation("timestamp", msg))?
            }
        };

        Ok(Self {
            identification,
            mark_type,
            at,
        })
    }
}
