//! Transactional in-memory store used by the engine tests.
//!
//! A transaction holds the store lock for its whole life and works on a copy
//! of the state; `commit` publishes the copy, anything else drops it.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use crate::model::{
    attendance::{AttendanceMark, NewAttendanceMark},
    contract::Contract,
    employee::EmployeeSummary,
    schedule::ScheduleTemplate,
    status::StatusId,
    workday::{DailyWorkday, WorkdayHours},
};
use crate::store::{AttendanceStore, AttendanceTx, ReferenceProvider, StatusSource, StoreError};

#[derive(Debug, Clone, Default)]
pub struct OvertimeRequest {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub hours: f64,
    pub status_id: StatusId,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    /// Seed for the status table, which lives outside the transactional state.
    pub statuses: HashMap<String, StatusId>,
    pub employees: Vec<EmployeeSummary>,
    pub contracts: Vec<Contract>,
    pub schedules: Vec<ScheduleTemplate>,
    pub overtime: Vec<OvertimeRequest>,
    pub marks: Vec<AttendanceMark>,
    pub workdays: Vec<DailyWorkday>,
    /// Marks another writer commits right after the ledger read, invisible to
    /// `lock_day_marks` but caught by the unique key on insert.
    pub racing_marks: Vec<AttendanceMark>,
    next_id: u64,
}

impl MemoryState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    statuses: Arc<std::sync::Mutex<HashMap<String, StatusId>>>,
    status_lookups: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new(mut state: MemoryState) -> Self {
        let statuses = std::mem::take(&mut state.statuses);
        Self {
            state: Arc::new(Mutex::new(state)),
            statuses: Arc::new(std::sync::Mutex::new(statuses)),
            status_lookups: Default::default(),
        }
    }

    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    /// Direct access to committed state, outside any transaction.
    pub async fn state_mut(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().await
    }

    pub fn set_status(&self, name: &str, id: StatusId) {
        self.statuses
            .lock()
            .expect("status table poisoned")
            .insert(name.to_string(), id);
    }

    /// Number of single-name status lookups that reached the store.
    pub fn status_lookups(&self) -> usize {
        self.status_lookups.load(Ordering::SeqCst)
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx { guard, working })
    }
}

#[async_trait]
impl StatusSource for MemoryStore {
    async fn find_status_id(&self, name: &str) -> Result<Option<StatusId>, StoreError> {
        self.status_lookups.fetch_add(1, Ordering::SeqCst);
        let statuses = self.statuses.lock().expect("status table poisoned");
        Ok(statuses.get(name).copied())
    }

    async fn load_statuses(&self) -> Result<Vec<(String, StatusId)>, StoreError> {
        let statuses = self.statuses.lock().expect("status table poisoned");
        Ok(statuses
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect())
    }
}

#[async_trait]
impl ReferenceProvider for MemoryTx {
    async fn find_employee_by_identification(
        &mut self,
        identification: &str,
    ) -> Result<Option<EmployeeSummary>, StoreError> {
        Ok(self
            .working
            .employees
            .iter()
            .find(|e| e.identification == identification)
            .cloned())
    }

    async fn find_active_contract(
        &mut self,
        employee_id: u64,
        active: StatusId,
    ) -> Result<Option<Contract>, StoreError> {
        Ok(self
            .working
            .contracts
            .iter()
            .rev()
            .find(|c| c.employee_id == employee_id && c.status_id == active)
            .cloned())
    }

    async fn find_active_schedule(
        &mut self,
        contract_id: u64,
        active: StatusId,
    ) -> Result<Option<ScheduleTemplate>, StoreError> {
        Ok(self
            .working
            .schedules
            .iter()
            .rev()
            .find(|s| s.contract_id == contract_id && s.status_id == active)
            .cloned())
    }

    async fn find_daily_workday(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<DailyWorkday>, StoreError> {
        Ok(self
            .working
            .workdays
            .iter()
            .find(|w| w.employee_id == employee_id && w.work_date == date)
            .cloned())
    }

    async fn find_day_marks(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceMark>, StoreError> {
        let mut marks: Vec<_> = self
            .working
            .marks
            .iter()
            .filter(|m| m.employee_id == employee_id && m.work_date == date)
            .cloned()
            .collect();
        marks.sort_by_key(|m| (m.marked_at, m.id));
        Ok(marks)
    }

    async fn sum_approved_overtime_hours(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
        approved: StatusId,
    ) -> Result<f64, StoreError> {
        Ok(self
            .working
            .overtime
            .iter()
            .filter(|o| o.employee_id == employee_id && o.date == date && o.status_id == approved)
            .map(|o| o.hours)
            .sum())
    }
}

#[async_trait]
impl AttendanceTx for MemoryTx {
    async fn lock_day_marks(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceMark>, StoreError> {
        let marks = self.find_day_marks(employee_id, date).await?;
        let racing = std::mem::take(&mut self.working.racing_marks);
        self.working.marks.extend(racing);
        Ok(marks)
    }

    async fn insert_mark(
        &mut self,
        mark: &NewAttendanceMark,
    ) -> Result<AttendanceMark, StoreError> {
        let taken = self.working.marks.iter().any(|m| {
            m.employee_id == mark.employee_id
                && m.work_date == mark.work_date
                && m.mark_type == mark.mark_type
        });
        if taken {
            return Err(StoreError::UniqueViolation(
                "attendance_marks.uq_marks_employee_date_type".to_string(),
            ));
        }

        let stored = AttendanceMark {
            id: self.working.next_id(),
            employee_id: mark.employee_id,
            mark_type: mark.mark_type,
            marked_at: mark.marked_at,
            work_date: mark.work_date,
        };
        self.working.marks.push(stored.clone());
        Ok(stored)
    }

    async fn upsert_daily_workday(
        &mut self,
        employee_id: u64,
        date: NaiveDate,
        hours: WorkdayHours,
    ) -> Result<DailyWorkday, StoreError> {
        if let Some(existing) = self
            .working
            .workdays
            .iter_mut()
            .find(|w| w.employee_id == employee_id && w.work_date == date)
        {
            existing.ordinary_hours = hours.ordinary_hours;
            existing.extra_hours = hours.extra_hours;
            return Ok(existing.clone());
        }

        let row = DailyWorkday {
            id: self.working.next_id(),
            employee_id,
            work_date: date,
            ordinary_hours: hours.ordinary_hours,
            extra_hours: hours.extra_hours,
            holiday_id: None,
            incapacity_id: None,
            vacation_request_id: None,
            permit_id: None,
        };
        self.working.workdays.push(row.clone());
        Ok(row)
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        *self.guard = self.working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
