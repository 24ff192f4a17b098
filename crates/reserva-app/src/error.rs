use salvo::http::StatusCode;
use salvo::writing::Json;
use serde::Serialize;
use thiserror::Error;

use reserva_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] reserva_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] reserva_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Error response payload: a machine-readable code plus a human message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub error: String,
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServiceError(err) => match err {
                ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Conflict(_) | ServiceError::State(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ServiceError(err) => match err {
                ServiceError::Validation(_) => "validation",
                ServiceError::NotFound(_) => "not_found",
                ServiceError::Conflict(_) => "conflict",
                ServiceError::State(_) => "invalid_state",
                _ => "internal",
            },
            _ => "internal",
        }
    }
}

/// Writes the error to the response with its mapped status code. Internal
/// errors are logged here and not echoed to the client.
pub fn render_error(res: &mut salvo::Response, err: &AppError) {
    let status = err.status_code();
    res.status_code(status);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "Request failed");
        res.render(Json(ErrorResponse {
            code: err.code(),
            error: "internal error".to_string(),
        }));
    } else {
        res.render(Json(ErrorResponse {
            code: err.code(),
            error: err.to_string(),
        }));
    }
}
