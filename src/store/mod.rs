//! Persistence seams for the attendance engine.
//!
//! Every read and write of one mark request goes through a single
//! [`AttendanceTx`]. Dropping a transaction without calling
//! [`AttendanceTx::commit`] discards all of its writes.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::mysql::MySqlDatabaseError;
use thiserror::Error;

use crate::model::{
    attendance::{AttendanceMark, NewAttendanceMark},
    contract::Contract,
    employee::EmployeeSummary,
    schedule::ScheduleTemplate,
    status::StatusId,
    workday::{DailyWorkday, WorkdayHours},
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

const ER_DUP_ENTRY: u16 = 1062;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key rejected the write (MySQL error 1062).
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Stored data is unreadable: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // SQLSTATE 23000 also covers foreign key and NOT NULL failures.
            let number = db_err
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(MySqlDatabaseError::number);
            if number == Some(ER_DUP_ENTRY) {
                return Self::UniqueViolation(db_err.message().to_string());
            }
        }
        Self::Database(err.to_string())
    }
}

/// Read-only lookups consumed by the engine.
#[async_trait]
pub trait ReferenceProvider: Send {
    async fn find_employee_by_identification(
        &mut self,
        identification: &str,
    ) -> Result<Option<EmployeeSummary>, StoreError>;

    async fn find_active_contract(
        &mut self,
        employee_id: u64,
        active: StatusId,
    ) -> Result<Option<Contract>, StoreError>;

    async fn find_active_schedule(
        &mut self,
        contract_id: u64,
        active: StatusId,
    ) -> Result<Option<ScheduleTemplate>, StoreError>;

    async fn find_daily_workday(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<DailyWorkday>, StoreError>;

    async fn find_day_marks(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceMark>, StoreError>;

    /// Sum of approved overtime hours requested for the date, 0 when none.
    async fn sum_approved_overtime_hours(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
        approved: StatusId,
    ) -> Result<f64, StoreError>;
}

/// Unit of work for one mark request.
#[async_trait]
pub trait AttendanceTx: ReferenceProvider {
    /// Loads the marks filed under (employee, date), serializing concurrent
    /// writers for that employee until this transaction ends.
    async fn lock_day_marks(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceMark>, StoreError>;

    async fn insert_mark(&mut self, mark: &NewAttendanceMark)
    -> Result<AttendanceMark, StoreError>;

    /// Creates the (employee, date) row or updates its hours in place.
    async fn upsert_daily_workday(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
        hours: WorkdayHours,
    ) -> Result<DailyWorkday, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    type Tx: AttendanceTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// Backing table of the status catalog.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn find_status_id(&self, name: &str) -> Result<Option<StatusId>, StoreError>;

    async fn load_statuses(&self) -> Result<Vec<(String, StatusId)>, StoreError>;
}
