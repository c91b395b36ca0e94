use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Every failure a request can end in. Rendered as
/// `{"error": "<kind>", "message": "<text>"}`.
#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    Auth(String),
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "{}", _0)]
    ForbiddenField(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "{}", _0)]
    InvalidTransition(String),
    #[display(fmt = "{}", _0)]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable tag clients can switch on.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Auth(_) => "AuthError",
            Self::Forbidden(_) => "ForbiddenError",
            Self::ForbiddenField(_) => "ForbiddenFieldError",
            Self::NotFound(_) => "NotFoundError",
            Self::Conflict(_) => "ConflictError",
            Self::InvalidTransition(_) => "InvalidTransitionError",
            Self::Internal(_) => "InternalError",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) | Self::ForbiddenField(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // details were already logged where the error was raised
            Self::Internal(_) => "Something went wrong, Contact with system admin".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": message,
        }))
    }
}

/// Classifies a sqlx failure. Unique violations become `Conflict(on_unique)`,
/// foreign key violations are handed to `on_foreign_key`, everything else is
/// logged and surfaced as an internal error.
pub fn classify_db_error(
    e: sqlx::Error,
    on_unique: &str,
    on_foreign_key: impl FnOnce() -> AppError,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.kind() {
            sqlx::error::ErrorKind::UniqueViolation => return AppError::conflict(on_unique),
            sqlx::error::ErrorKind::ForeignKeyViolation => return on_foreign_key(),
            _ => {}
        }
    }

    tracing::error!(error = %e, "Database error");
    AppError::internal(e.to_string())
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error = %e, "Database error");
        AppError::internal(e.to_string())
    }
}
