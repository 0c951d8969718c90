//! Attendance mark and workday computation engine.

pub mod error;
pub mod leave_guard;
pub mod mark_ledger;
pub mod schedule_resolver;
pub mod service;
pub mod workday_calculator;
