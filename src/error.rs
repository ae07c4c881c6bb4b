use actix_web::{HttpResponse, http::StatusCode};
use derive_more::Display;

/// Failure taxonomy for the accounting core. Every variant is a local,
/// deterministic, synchronous failure; none are retried here.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Clock-in with an open session, clock-out with nothing open.
    #[display(fmt = "{}", _0)]
    Conflict(String),
    /// Clock-out before any attendance day exists, unknown leave id.
    #[display(fmt = "{}", _0)]
    NotFound(String),
    /// Malformed date range, Sunday submission, Sunday in range.
    #[display(fmt = "{}", _0)]
    Validation(String),
}

impl ApiError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }
}

impl std::error::Error for ApiError {}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}
