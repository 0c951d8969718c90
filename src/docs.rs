use crate::api::attendance::RegisterMarkBody;
use crate::attendance::mark_ledger::LedgerState;
use crate::attendance::service::{DaySummary, MarkResult};
use crate::model::attendance::{AttendanceMark, MarkType};
use crate::model::employee::EmployeeSummary;
use crate::model::workday::{DailyWorkday, WorkdayHours};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance marks and daily workdays

Turns raw clock-in / clock-out events into validated daily work records.

### 🔹 Rules
- One **ENTRY** and one **EXIT** per employee and calendar date, in that order
- No marks on the schedule's **rest days** or on days blocked by **incapacity, vacation or permit**
- **Ordinary hours** are capped at the scheduled duration (net of the break)
- **Extra hours** only count up to the approved overtime for the date, and the day never exceeds **12 hours**

### 📦 Errors
Every rejection returns `{"kind": "...", "message": "..."}` with a stable `kind`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::register_mark,
        crate::api::attendance::day_summary,
    ),
    components(
        schemas(
            RegisterMarkBody,
            MarkResult,
            DaySummary,
            LedgerState,
            AttendanceMark,
            MarkType,
            EmployeeSummary,
            DailyWorkday,
            WorkdayHours
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance marks and workday computation"),
    )
)]
pub struct ApiDoc;
