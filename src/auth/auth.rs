use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Caller identity placed in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("Missing token"))),
        }
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }

    pub fn require_privileged(&self) -> actix_web::Result<()> {
        if self.role.is_privileged() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin/Sub-admin only"))
        }
    }

    /// Employees may only read their own records.
    pub fn require_self_or_privileged(&self, user_id: u64) -> actix_web::Result<()> {
        if self.user_id == user_id || self.role.is_privileged() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Not allowed to view another user's records"))
        }
    }
}
