use actix_web::HttpResponse;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};
use crate::service::reporting;

pub mod department;
pub mod employee;
pub mod leave_request;
pub mod team;

/// Plain acknowledgement body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Ack {
    #[schema(example = "Department deleted.")]
    pub message: String,
}

pub fn ack(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(Ack {
        message: message.into(),
    })
}

/// For bodies read as raw JSON so the caller's rights are checked first.
pub fn parse_body<T: DeserializeOwned>(body: Value) -> AppResult<T> {
    serde_json::from_value(body).map_err(|e| AppError::validation(e.to_string()))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WindowQuery {
    /// Days ahead of today to look (1-366, default 30)
    #[param(example = 30)]
    pub days: Option<u32>,
}

impl WindowQuery {
    pub fn days(&self) -> AppResult<u32> {
        reporting::window_days(self.days)
    }
}
