use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::model::settings::CompanySettings;
use crate::policy::PolicyEngine;
use crate::policy::settings::UpdateSettings;

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, body = CompanySettings),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_settings(
    _auth: AuthUser,
    engine: web::Data<PolicyEngine>,
) -> actix_web::Result<impl Responder> {
    let settings: CompanySettings = engine.settings.get_settings().await?;
    Ok(HttpResponse::Ok().json(settings))
}

#[utoipa::path(
    put,
    path = "/api/settings",
    request_body = UpdateSettings,
    responses(
        (status = 200, description = "Settings updated", body = CompanySettings),
        (status = 400, description = "Invalid time, weekday or email"),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    engine: web::Data<PolicyEngine>,
    body: web::Json<UpdateSettings>,
) -> actix_web::Result<impl Responder> {
    auth.require_privileged()?;
    tracing::info!(user_id = auth.user_id, username = %auth.username, "Settings update requested");

    let settings = engine.settings.update_settings(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Settings updated successfully",
        "settings": settings
    })))
}
