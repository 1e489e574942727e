use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::model::attendance::{AttendanceLog, AttendanceRecord};
use crate::policy::PolicyEngine;
use crate::policy::report::AttendanceSummary;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    #[param(example = 3)]
    pub month: u32,

    #[param(example = 2024)]
    pub year: i32,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogsQuery {
    /// Inclusive lower bound
    #[serde(alias = "startDate")]
    #[param(value_type = Option<String>, format = "date", example = "2024-03-01")]
    pub start_date: Option<NaiveDate>,

    /// Inclusive upper bound, only applied together with `start_date`
    #[serde(alias = "endDate")]
    #[param(value_type = Option<String>, format = "date", example = "2024-03-31")]
    pub end_date: Option<NaiveDate>,

    /// `present`, `absent`, `late`, `leave` or `All`
    #[param(example = "late")]
    pub status: Option<String>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkin",
    responses(
        (status = 201, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully",
            "attendance": { "id": 1, "user_id": 42, "date": "2024-03-11", "status": "present" }
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "You have already checked in today."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
) -> actix_web::Result<impl Responder> {
    let record = engine.attendance.check_in(auth.user_id).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Checked in successfully",
        "attendance": record
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkout",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully",
            "attendance": { "id": 1, "working_hours": 10.5, "overtime_hours": 1.5 }
        })),
        (status = 400, description = "Not checked in, or already checked out", body = Object, example = json!({
            "message": "You have not checked in today."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
) -> actix_web::Result<impl Responder> {
    let record = engine.attendance.check_out(auth.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully",
        "attendance": record
    })))
}

#[utoipa::path(
    get,
    path = "/api/attendance/daily/{user_id}",
    params(
        ("user_id", description = "User ID")
    ),
    responses(
        (status = 200, description = "Today's record, or null", body = AttendanceRecord),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn daily(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    auth.require_self_or_privileged(user_id)?;

    let record: Option<AttendanceRecord> = engine.reports.daily(user_id).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    get,
    path = "/api/attendance/monthly/{user_id}",
    params(
        ("user_id", description = "User ID"),
        MonthQuery
    ),
    responses(
        (status = 200, body = [AttendanceRecord]),
        (status = 400, description = "Invalid month"),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn monthly(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
    path: web::Path<u64>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    auth.require_self_or_privileged(user_id)?;

    let records: Vec<AttendanceRecord> = engine.reports.monthly(user_id, query.month, query.year).await?;
    Ok(HttpResponse::Ok().json(records))
}

#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    responses(
        (status = 200, body = AttendanceSummary),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn summary(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
) -> actix_web::Result<impl Responder> {
    auth.require_privileged()?;

    let summary: AttendanceSummary = engine.reports.summary().await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/attendance/logs",
    params(LogsQuery),
    responses(
        (status = 200, body = [AttendanceLog]),
        (status = 400, description = "Unknown status"),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn logs(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
    query: web::Query<LogsQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_privileged()?;

    let query = query.into_inner();
    let rows: Vec<AttendanceLog> = engine
        .reports
        .logs(query.start_date, query.end_date, query.status.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(rows))
}
