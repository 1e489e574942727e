use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::salary::{SalaryListItem, SalaryRecord};
use crate::policy::PolicyEngine;
use crate::policy::payroll::{AdjustSalary, BatchSummary};

#[derive(Deserialize, ToSchema)]
pub struct GenerateSalary {
    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = 3)]
    pub month: u32,

    #[schema(example = 2024)]
    pub year: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct GenerateBatch {
    #[schema(example = 3)]
    pub month: u32,

    #[schema(example = 2024)]
    pub year: i32,
}

#[utoipa::path(
    get,
    path = "/api/salary",
    responses(
        (status = 200, description = "All salary records with employee names", body = [SalaryListItem]),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn list_salaries(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let rows: Vec<SalaryListItem> = engine.reports.all_salaries().await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    put,
    path = "/api/salary/{salary_id}",
    request_body = AdjustSalary,
    params(
        ("salary_id", description = "Salary record ID")
    ),
    responses(
        (status = 200, description = "Salary updated", body = SalaryRecord),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Salary record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn update_salary(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
    path: web::Path<u64>,
    body: web::Json<AdjustSalary>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let record = engine
        .payroll
        .adjust_salary(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Salary updated successfully",
        "salary": record
    })))
}

#[utoipa::path(
    post,
    path = "/api/salary/generate",
    request_body = GenerateSalary,
    responses(
        (status = 201, description = "Salary generated", body = SalaryRecord),
        (status = 200, description = "Salary already generated for this month", body = SalaryRecord),
        (status = 404, description = "User not found"),
        (status = 422, description = "User has no usable salary")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn generate_salary(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
    body: web::Json<GenerateSalary>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let outcome = engine
        .payroll
        .generate_salary(body.user_id, body.month, body.year)
        .await?;

    let (mut response, message) = if outcome.is_created() {
        (HttpResponse::Created(), "Salary generated successfully")
    } else {
        (HttpResponse::Ok(), "Salary already generated for this month")
    };
    Ok(response.json(json!({
        "message": message,
        "salary": outcome.record()
    })))
}

#[utoipa::path(
    post,
    path = "/api/salary/generate-batch",
    request_body = GenerateBatch,
    responses(
        (status = 200, description = "Per-employee outcome counts", body = BatchSummary),
        (status = 400, description = "Invalid month"),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn generate_batch(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
    body: web::Json<GenerateBatch>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let summary: BatchSummary = engine.payroll.generate_batch(body.month, body.year).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/api/salary/user/{user_id}",
    params(
        ("user_id", description = "User ID")
    ),
    responses(
        (status = 200, body = [SalaryRecord]),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn user_salaries(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();
    auth.require_self_or_privileged(user_id)?;

    let rows: Vec<SalaryRecord> = engine.reports.salaries_for_user(user_id).await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[utoipa::path(
    post,
    path = "/api/salary/pay/{salary_id}",
    params(
        ("salary_id", description = "Salary record ID")
    ),
    responses(
        (status = 200, description = "Marked as paid", body = SalaryRecord),
        (status = 404, description = "Salary record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn pay_salary(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let record = engine.payroll.mark_paid(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Salary marked as paid",
        "salary": record
    })))
}
