use std::fmt;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::status::StatusId;

/// Stored "horario laboral" row attached to a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScheduleTemplate {
    pub id: u64,
    pub contract_id: u64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub break_minutes: u32,
    /// Compact day codes, e.g. "LKMJV"
    pub working_days: String,
    /// Compact day codes, e.g. "SD"
    pub rest_days: String,
    pub status_id: StatusId,
}

/// Locale weekday code, Monday through Sunday.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DayCode {
    L,
    K,
    M,
    J,
    V,
    S,
    D,
}

impl DayCode {
    pub const ALL: [DayCode; 7] = [
        DayCode::L,
        DayCode::K,
        DayCode::M,
        DayCode::J,
        DayCode::V,
        DayCode::S,
        DayCode::D,
    ];

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayCode::L,
            Weekday::Tue => DayCode::K,
            Weekday::Wed => DayCode::M,
            Weekday::Thu => DayCode::J,
            Weekday::Fri => DayCode::V,
            Weekday::Sat => DayCode::S,
            Weekday::Sun => DayCode::D,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'L' => Some(DayCode::L),
            'K' => Some(DayCode::K),
            'M' => Some(DayCode::M),
            'J' => Some(DayCode::J),
            'V' => Some(DayCode::V),
            'S' => Some(DayCode::S),
            'D' => Some(DayCode::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            DayCode::L => 'L',
            DayCode::K => 'K',
            DayCode::M => 'M',
            DayCode::J => 'J',
            DayCode::V => 'V',
            DayCode::S => 'S',
            DayCode::D => 'D',
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for DayCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Set of day codes parsed from the compact string form.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DaySet(u8);

impl DaySet {
    /// Parses "LKMJV"-style strings. Separators (spaces, commas) are ignored;
    /// any other unknown character is returned as the error.
    pub fn parse(codes: &str) -> Result<Self, char> {
        let mut bits = 0u8;
        for c in codes.chars() {
            if c.is_whitespace() || c == ',' {
                continue;
            }
            let day = DayCode::from_char(c).ok_or(c)?;
            bits |= day.bit();
        }
        Ok(DaySet(bits))
    }

    pub fn contains(&self, day: DayCode) -> bool {
        self.0 & day.bit() != 0
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in DayCode::ALL {
            if self.contains(day) {
                write!(f, "{day}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compact_codes() {
        let set = DaySet::parse("LKMJV").unwrap();
        assert!(set.contains(DayCode::L));
        assert!(set.contains(DayCode::V));
        assert!(!set.contains(DayCode::S));
        assert_eq!(set.to_string(), "LKMJV");
    }

    #[test]
    fn ignores_separators_and_case() {
        let set = DaySet::parse("s, d").unwrap();
        assert_eq!(set.to_string(), "SD");
    }

    #[test]
    fn rejects_unknown_code() {
        assert_eq!(DaySet::parse("LX"), Err('X'));
    }

    #[test]
    fn weekday_mapping_runs_monday_to_sunday() {
        assert_eq!(DayCode::from_weekday(Weekday::Mon), DayCode::L);
        assert_eq!(DayCode::from_weekday(Weekday::Tue), DayCode::K);
        assert_eq!(DayCode::from_weekday(Weekday::Wed), DayCode::M);
        assert_eq!(DayCode::from_weekday(Weekday::Sat), DayCode::S);
        assert_eq!(DayCode::from_weekday(Weekday::Sun), DayCode::D);
    }
}
