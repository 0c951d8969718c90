use actix_web::{HttpResponse, Responder, ResponseError, http::StatusCode, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::attendance::error::{AttendanceError, ErrorCategory};
use crate::attendance::service::{AttendanceService, MarkRequest};
use crate::store::mysql::MySqlStore;

pub type MarkService = AttendanceService<MySqlStore>;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMarkBody {
    /// External identification number, as string or number
    #[schema(example = "1032456789", value_type = String)]
    pub identification: Option<Value>,
    #[schema(example = "ENTRY")]
    pub mark_type: Option<String>,
    #[schema(example = "2026-02-02T08:00:00-05:00", format = "date-time")]
    pub timestamp: Option<String>,
}

impl From<RegisterMarkBody> for MarkRequest {
    fn from(body: RegisterMarkBody) -> Self {
        let identification = match body.identification {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        MarkRequest {
            identification,
            mark_type: body.mark_type,
            timestamp: body.timestamp,
        }
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::BusinessRule => StatusCode::CONFLICT,
            ErrorCategory::IntegrityFault => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Database text stays in the logs.
        let message = match self.category() {
            ErrorCategory::Internal => "Internal Server Error".to_string(),
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "kind": self.code(),
            "message": message
        }))
    }
}

/// Register an attendance mark (ENTRY / EXIT)
#[utoipa::path(
    post,
    path = "/api/v1/attendance/marks",
    request_body(
        content = RegisterMarkBody,
        description = "Clock event",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Mark registered", body = crate::attendance::service::MarkResult),
        (status = 400, description = "Malformed input", body = Object, example = json!({
            "kind": "VALIDATION_ERROR",
            "message": "markType: markType must be ENTRY or EXIT, got \"SALIDA\""
        })),
        (status = 404, description = "Employee, active contract or active schedule missing"),
        (status = 409, description = "Rest day, leave block or mark out of order", body = Object, example = json!({
            "kind": "DUPLICATE_ENTRY",
            "message": "An ENTRY mark already exists for 2026-02-02"
        })),
        (status = 422, description = "Schedule data violates the legal daily limit"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn register_mark(
    service: web::Data<MarkService>,
    payload: web::Json<RegisterMarkBody>,
) -> actix_web::Result<impl Responder> {
    let result = service.register_mark(payload.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Marks and computed hours of one employee-day
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{identification}/days/{date}",
    params(
        ("identification" = String, Path, description = "External identification number"),
        ("date" = String, Path, description = "Calendar date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Day summary", body = crate::attendance::service::DaySummary),
        (status = 400, description = "Malformed identification or date"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Attendance"
)]
pub async fn day_summary(
    service: web::Data<MarkService>,
    path: web::Path<(String, String)>,
) -> actix_web::Result<impl Responder> {
    let (identification, raw_date) = path.into_inner();
    let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d").map_err(|_| {
        AttendanceError::validation("date", format!("date must be YYYY-MM-DD, got {raw_date:?}"))
    })?;

    let summary = service.day_summary(&identification, date).await?;
    Ok(HttpResponse::Ok().json(summary))
}
