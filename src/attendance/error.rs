use chrono::NaiveDate;
use thiserror::Error;

use crate::attendance::leave_guard::LeaveKind;
use crate::model::schedule::DayCode;
use crate::store::StoreError;

/// Coarse grouping of rejections, used by callers to pick a status code.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    BusinessRule,
    IntegrityFault,
    Internal,
}

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("No employee with identification {0}")]
    EmployeeNotFound(String),

    #[error("Employee {employee_id} has no active contract")]
    NoActiveContract { employee_id: u64 },

    #[error("Contract {contract_id} has no active schedule")]
    NoActiveSchedule { contract_id: u64 },

    #[error("{date} ({day}) is a rest day for this schedule")]
    RestDayMark { date: NaiveDate, day: DayCode },

    #[error("{date} is blocked by {kind}")]
    DayBlockedByLeave { date: NaiveDate, kind: LeaveKind },

    #[error("An ENTRY mark already exists for {date}")]
    DuplicateEntry { date: NaiveDate },

    #[error("An EXIT mark already exists for {date}")]
    DuplicateExit { date: NaiveDate },

    #[error("No ENTRY mark exists for {date}")]
    MissingEntry { date: NaiveDate },

    #[error("EXIT must be later than the ENTRY registered for {date}")]
    ExitBeforeEntry { date: NaiveDate },

    #[error("Scheduled ordinary hours ({ordinary_hours}) exceed the legal daily limit of {limit}")]
    ScheduleExceedsLegalLimit { ordinary_hours: f64, limit: f64 },

    #[error("Schedule {schedule_id} is misconfigured: {reason}")]
    ScheduleMisconfigured { schedule_id: u64, reason: String },

    #[error("Inconsistent marks for employee {employee_id} on {date}: {reason}")]
    InconsistentMarks {
        employee_id: u64,
        date: NaiveDate,
        reason: String,
    },

    #[error("Status {0} is not present in the status catalog")]
    UnknownStatus(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AttendanceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::EmployeeNotFound(_)
            | Self::NoActiveContract { .. }
            | Self::NoActiveSchedule { .. } => ErrorCategory::NotFound,
            Self::RestDayMark { .. }
            | Self::DayBlockedByLeave { .. }
            | Self::DuplicateEntry { .. }
            | Self::DuplicateExit { .. }
            | Self::MissingEntry { .. }
            | Self::ExitBeforeEntry { .. } => ErrorCategory::BusinessRule,
            Self::ScheduleExceedsLegalLimit { .. }
            | Self::ScheduleMisconfigured { .. }
            | Self::InconsistentMarks { .. }
            | Self::UnknownStatus(_) => ErrorCategory::IntegrityFault,
            Self::Store(_) => ErrorCategory::Internal,
        }
    }

    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            Self::NoActiveContract { .. } => "NO_ACTIVE_CONTRACT",
            Self::NoActiveSchedule { .. } => "NO_ACTIVE_SCHEDULE",
            Self::RestDayMark { .. } => "REST_DAY_MARK",
            Self::DayBlockedByLeave { .. } => "DAY_BLOCKED_BY_LEAVE",
            Self::DuplicateEntry { .. } => "DUPLICATE_ENTRY",
            Self::DuplicateExit { .. } => "DUPLICATE_EXIT",
            Self::MissingEntry { .. } => "MISSING_ENTRY",
            Self::ExitBeforeEntry { .. } => "EXIT_BEFORE_ENTRY",
            Self::ScheduleExceedsLegalLimit { .. } => "SCHEDULE_EXCEEDS_LEGAL_LIMIT",
            Self::ScheduleMisconfigured { .. } => "SCHEDULE_MISCONFIGURED",
            Self::InconsistentMarks { .. } => "INCONSISTENT_MARKS",
            Self::UnknownStatus(_) => "UNKNOWN_STATUS",
            Self::Store(_) => "INTERNAL_ERROR",
        }
    }
}
