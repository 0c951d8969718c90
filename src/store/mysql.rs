use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{MySql, MySqlPool, Transaction};

use crate::model::{
    attendance::{AttendanceMark, MarkType, NewAttendanceMark},
    contract::Contract,
    employee::EmployeeSummary,
    schedule::ScheduleTemplate,
    status::StatusId,
    workday::{DailyWorkday, WorkdayHours},
};
use crate::store::{AttendanceStore, AttendanceTx, ReferenceProvider, StatusSource, StoreError};

const WORKDAY_COLUMNS: &str = r#"
    id, employee_id, work_date, ordinary_hours, extra_hours,
    holiday_id, incapacity_id, vacation_request_id, permit_id
"#;

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

pub struct MySqlTx {
    tx: Transaction<'static, MySql>,
}

impl MySqlTx {
    async fn fetch_day_marks(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
        for_update: bool,
    ) -> Result<Vec<AttendanceMark>, StoreError> {
        let sql = format!(
            r#"
            SELECT id, employee_id, mark_type, marked_at, work_date
            FROM attendance_marks
            WHERE employee_id = ? AND work_date = ?
            ORDER BY marked_at, id
            {}
            "#,
            if for_update { "FOR UPDATE" } else { "" }
        );
        let rows = sqlx::query_as::<_, MarkRow>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_all(&mut *self.tx)
            .await?;

        rows.into_iter().map(AttendanceMark::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct MarkRow {
    id: u64,
    employee_id: u64,
    mark_type: String,
    marked_at: DateTime<Utc>,
    work_date: NaiveDate,
}

impl TryFrom<MarkRow> for AttendanceMark {
    type Error = StoreError;

    fn try_from(row: MarkRow) -> Result<Self, Self::Error> {
        let mark_type = row
            .mark_type
            .parse::<MarkType>()
            .map_err(|_| StoreError::Decode(format!("mark {} has type {:?}", row.id, row.mark_type)))?;

        Ok(AttendanceMark {
            id: row.id,
            employee_id: row.employee_id,
            mark_type,
            marked_at: row.marked_at,
            work_date: row.work_date,
        })
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    type Tx = MySqlTx;

    async fn begin(&self) -> Result<MySqlTx, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(MySqlTx { tx })
    }
}

#[async_trait]
impl StatusSource for MySqlStore {
    async fn find_status_id(&self, name: &str) -> Result<Option<StatusId>, StoreError> {
        let id = sqlx::query_scalar::<_, u64>("SELECT id FROM statuses WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn load_statuses(&self) -> Result<Vec<(String, StatusId)>, StoreError> {
        let rows = sqlx::query_as::<_, (String, u64)>("SELECT name, id FROM statuses")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ReferenceProvider for MySqlTx {
    async fn find_employee_by_identification(
        &mut self,
        identification: &str,
    ) -> Result<Option<EmployeeSummary>, StoreError> {
        let employee = sqlx::query_as::<_, EmployeeSummary>(
            r#"
            SELECT id, identification, first_name, last_name_a, last_name_b
            FROM employees
            WHERE identification = ?
            "#,
        )
        .bind(identification)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(employee)
    }

    async fn find_active_contract(
        &mut self,
        employee_id: u64,
        active: StatusId,
    ) -> Result<Option<Contract>, StoreError> {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            SELECT id, employee_id, status_id
            FROM contracts
            WHERE employee_id = ? AND status_id = ?
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .bind(active)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(contract)
    }

    async fn find_active_schedule(
        &mut self,
        contract_id: u64,
        active: StatusId,
    ) -> Result<Option<ScheduleTemplate>, StoreError> {
        let schedule = sqlx::query_as::<_, ScheduleTemplate>(
            r#"
            SELECT id, contract_id, start_time, end_time, break_minutes,
                   working_days, rest_days, status_id
            FROM work_schedules
            WHERE contract_id = ? AND status_id = ?
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(contract_id)
        .bind(active)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(schedule)
    }

    async fn find_daily_workday(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<DailyWorkday>, StoreError> {
        let sql = format!(
            "SELECT {} FROM daily_workdays WHERE employee_id = ? AND work_date = ?",
            WORKDAY_COLUMNS
        );
        let workday = sqlx::query_as::<_, DailyWorkday>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(workday)
    }

    async fn find_day_marks(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceMark>, StoreError> {
        self.fetch_day_marks(employee_id, date, false).await
    }

    async fn sum_approved_overtime_hours(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
        approved: StatusId,
    ) -> Result<f64, StoreError> {
        let total = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT CAST(COALESCE(SUM(hours), 0) AS DOUBLE)
            FROM overtime_requests
            WHERE employee_id = ? AND request_date = ? AND status_id = ?
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(approved)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(total)
    }
}

#[async_trait]
impl AttendanceTx for MySqlTx {
    async fn lock_day_marks(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceMark>, StoreError> {
        // Row lock on the employee serializes concurrent marks for them;
        // the unique key on attendance_marks backs this up. The marks read
        // must lock too, otherwise InnoDB serves it from the snapshot taken
        // at the first read of the transaction.
        sqlx::query("SELECT id FROM employees WHERE id = ? FOR UPDATE")
            .bind(employee_id)
            .execute(&mut *self.tx)
            .await?;

        self.fetch_day_marks(employee_id, date, true).await
    }

    async fn insert_mark(
        &mut self,
        mark: &NewAttendanceMark,
    ) -> Result<AttendanceMark, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_marks (employee_id, mark_type, marked_at, work_date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(mark.employee_id)
        .bind(mark.mark_type.as_ref())
        .bind(mark.marked_at)
        .bind(mark.work_date)
        .execute(&mut *self.tx)
        .await?;

        Ok(AttendanceMark {
            id: result.last_insert_id(),
            employee_id: mark.employee_id,
            mark_type: mark.mark_type,
            marked_at: mark.marked_at,
            work_date: mark.work_date,
        })
    }

    async fn upsert_daily_workday(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
        hours: WorkdayHours,
    ) -> Result<DailyWorkday, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO daily_workdays (employee_id, work_date, ordinary_hours, extra_hours)
            VALUES (?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                ordinary_hours = VALUES(ordinary_hours),
                extra_hours = VALUES(extra_hours)
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(hours.ordinary_hours)
        .bind(hours.extra_hours)
        .execute(&mut *self.tx)
        .await?;

        self.find_daily_workday(employee_id, date)
            .await?
            .ok_or_else(|| {
                StoreError::Database(format!(
                    "daily workday for employee {employee_id} on {date} missing after upsert"
                ))
            })
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
