use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::LocalBoxFuture;

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::Store;

pub const ADMIN_ONLY: &str = "Only an admin can perform this action.";

/// The caller, as loaded from storage for this request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub employee_id: u64,
    pub email: String,
    pub is_admin: bool,
}

/// What an operation demands of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The resource owner, or any admin.
    Owner(u64),
    Admin,
}

impl AuthUser {
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::forbidden(ADMIN_ONLY))
        }
    }

    pub fn require_owner_or_admin(&self, owner_id: u64) -> AppResult<()> {
        if self.employee_id == owner_id || self.is_admin {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "You can only access your own records.",
            ))
        }
    }

    pub fn require(&self, access: Access) -> AppResult<()> {
        match access {
            Access::Owner(owner_id) => self.require_owner_or_admin(owner_id),
            Access::Admin => self.require_admin(),
        }
    }
}

/// Resolves a bearer token to the employee it was issued for.
pub async fn identify(store: &dyn Store, secret: &str, token: &str) -> AppResult<AuthUser> {
    let claims = verify_token(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        AppError::auth("Invalid or expired token")
    })?;

    let employee_id = claims
        .sub
        .parse::<u64>()
        .map_err(|_| AppError::auth("Invalid or expired token"))?;

    // reloaded every time: admin rights may have changed since the token was issued
    let employee = store
        .find_employee(employee_id)
        .await?
        .ok_or_else(|| AppError::auth("Employee no longer exists"))?;

    Ok(AuthUser {
        employee_id: employee.id,
        email: employee.email,
        is_admin: employee.is_admin,
    })
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let config = req.app_data::<Data<Config>>().cloned();
        let store = req.app_data::<Data<dyn Store>>().cloned();

        Box::pin(async move {
            let (Some(config), Some(store)) = (config, store) else {
                tracing::error!("Config or store missing from app data");
                return Err(AppError::internal("app data missing"));
            };

            let token = token.ok_or_else(|| AppError::auth("Missing bearer token"))?;

            identify(store.get_ref(), &config.jwt_secret, &token).await
        })
    }
}
