use strum_macros::{AsRefStr, Display, EnumString};

pub type StatusId = u64;

/// Status names business code branches on. The ids behind them live in the
/// `statuses` table and are resolved through the status catalog.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusName {
    Active,
    Approved,
}
