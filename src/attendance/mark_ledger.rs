//! Per employee-day mark state machine: `NO_MARKS -> OPEN -> CLOSED`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::attendance::error::AttendanceError;
use crate::model::attendance::{AttendanceMark, MarkType};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerState {
    NoMarks,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DayLedger {
    NoMarks,
    Open {
        entry: AttendanceMark,
    },
    Closed {
        entry: AttendanceMark,
        exit: AttendanceMark,
    },
}

impl DayLedger {
    /// Rebuilds the ledger from the marks stored for one employee-day.
    pub fn from_marks(
        employee_id: u64,
        date: NaiveDate,
        marks: Vec<AttendanceMark>,
    ) -> Result<Self, AttendanceError> {
        let inconsistent = |reason: &str| AttendanceError::InconsistentMarks {
            employee_id,
            date,
            reason: reason.to_string(),
        };

        let mut entry = None;
        let mut exit = None;
        for mark in marks {
            let slot = match mark.mark_type {
                MarkType::Entry => &mut entry,
                MarkType::Exit => &mut exit,
            };
            if slot.is_some() {
                return Err(inconsistent("more than one mark of the same type"));
            }
            *slot = Some(mark);
        }

        match (entry, exit) {
            (None, None) => Ok(DayLedger::NoMarks),
            (Some(entry), None) => Ok(DayLedger::Open { entry }),
            (Some(entry), Some(exit)) => Ok(DayLedger::Closed { entry, exit }),
            (None, Some(_)) => Err(inconsistent("EXIT stored without ENTRY")),
        }
    }

    pub fn state(&self) -> LedgerState {
        match self {
            DayLedger::NoMarks => LedgerState::NoMarks,
            DayLedger::Open { .. } => LedgerState::Open,
            DayLedger::Closed { .. } => LedgerState::Closed,
        }
    }

    pub fn entry(&self) -> Option<&AttendanceMark> {
        match self {
            DayLedger::NoMarks => None,
            DayLedger::Open { entry } | DayLedger::Closed { entry, .. } => Some(entry),
        }
    }

    pub fn exit(&self) -> Option<&AttendanceMark> {
        match self {
            DayLedger::Closed { exit, .. } => Some(exit),
            _ => None,
        }
    }

    /// ENTRY is only accepted on a day without marks.
    pub fn register_entry(&self, date: NaiveDate) -> Result<(), AttendanceError> {
        match self {
            DayLedger::NoMarks => Ok(()),
            DayLedger::Open { .. } | DayLedger::Closed { .. } => {
                Err(AttendanceError::DuplicateEntry { date })
            }
        }
    }

    /// EXIT is only accepted on an open day, strictly after its ENTRY.
    /// Returns the ENTRY it closes.
    pub fn register_exit(
        &self,
        date: NaiveDate,
        at: DateTime<Utc>,
    ) -> Result<&AttendanceMark, AttendanceError> {
        match self {
            DayLedger::NoMarks => Err(AttendanceError::MissingEntry { date }),
            DayLedger::Closed { .. } => Err(AttendanceError::DuplicateExit { date }),
            DayLedger::Open { entry } if at <= entry.marked_at => {
                Err(AttendanceError::ExitBeforeEntry { date })
            }
            DayLedger::Open { entry } => Ok(entry),
        }
    }

    /// Advances the ledger with a mark that has been persisted.
    pub fn record(self, mark: AttendanceMark) -> Result<DayLedger, AttendanceError> {
        let date = mark.work_date;
        match (self, mark.mark_type) {
            (DayLedger::NoMarks, MarkType::Entry) => Ok(DayLedger::Open { entry: mark }),
            (DayLedger::Open { entry }, MarkType::Exit) => Ok(DayLedger::Closed { entry, exit: mark }),
            (DayLedger::NoMarks, MarkType::Exit) => Err(AttendanceError::MissingEntry { date }),
            (DayLedger::Open { .. } | DayLedger::Closed { .. }, MarkType::Entry) => {
                Err(AttendanceError::DuplicateEntry { date })
            }
            (DayLedger::Closed { .. }, MarkType::Exit) => Err(AttendanceError::DuplicateExit { date }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()
    }

    fn at(hms: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(&format!("2026-02-02T{hms}Z"))
            .unwrap()
            .with_timezone(&Utc)
    }

    fn mark(id: u64, mark_type: MarkType, hms: &str) -> AttendanceMark {
        AttendanceMark {
            id,
            employee_id: 1,
            mark_type,
            marked_at: at(hms),
            work_date: date(),
        }
    }

    #[test]
    fn walks_no_marks_open_closed() {
        let ledger = DayLedger::from_marks(1, date(), vec![]).unwrap();
        assert_eq!(ledger.state(), LedgerState::NoMarks);
        ledger.register_entry(date()).unwrap();

        let ledger = ledger.record(mark(1, MarkType::Entry, "13:00:00")).unwrap();
        assert_eq!(ledger.state(), LedgerState::Open);
        assert_eq!(ledger.register_exit(date(), at("22:00:00")).unwrap().id, 1);

        let ledger = ledger.record(mark(2, MarkType::Exit, "22:00:00")).unwrap();
        assert_eq!(ledger.state(), LedgerState::Closed);
        assert_eq!(ledger.entry().map(|m| m.id), Some(1));
        assert_eq!(ledger.exit().map(|m| m.id), Some(2));
    }

    #[test]
    fn second_entry_is_a_duplicate() {
        let open = DayLedger::from_marks(1, date(), vec![mark(1, MarkType::Entry, "13:00:00")]).unwrap();
        assert!(matches!(
            open.register_entry(date()),
            Err(AttendanceError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn exit_without_entry_is_missing_entry() {
        assert!(matches!(
            DayLedger::NoMarks.register_exit(date(), at("22:00:00")),
            Err(AttendanceError::MissingEntry { .. })
        ));
    }

    #[test]
    fn closed_day_rejects_everything() {
        let closed = DayLedger::from_marks(
            1,
            date(),
            vec![
                mark(1, MarkType::Entry, "13:00:00"),
                mark(2, MarkType::Exit, "22:00:00"),
            ],
        )
        .unwrap();

        assert!(matches!(
            closed.register_entry(date()),
            Err(AttendanceError::DuplicateEntry { .. })
        ));
        assert!(matches!(
            closed.register_exit(date(), at("23:00:00")),
            Err(AttendanceError::DuplicateExit { .. })
        ));
    }

    #[test]
    fn exit_must_follow_entry() {
        let open = DayLedger::from_marks(1, date(), vec![mark(1, MarkType::Entry, "13:00:00")]).unwrap();
        assert!(matches!(
            open.register_exit(date(), at("13:00:00")),
            Err(AttendanceError::ExitBeforeEntry { .. })
        ));
        assert!(matches!(
            open.register_exit(date(), at("12:59:59")),
            Err(AttendanceError::ExitBeforeEntry { .. })
        ));
    }

    #[test]
    fn stored_exit_without_entry_is_inconsistent() {
        let err = DayLedger::from_marks(1, date(), vec![mark(2, MarkType::Exit, "22:00:00")]).unwrap_err();
        assert!(matches!(err, AttendanceError::InconsistentMarks { .. }));

        let err = DayLedger::from_marks(
            1,
            date(),
            vec![
                mark(1, MarkType::Entry, "13:00:00"),
                mark(3, MarkType::Entry, "14:00:00"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, AttendanceError::InconsistentMarks { .. }));
    }
}
