use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use store::{Error, ErrorKind};
use validator::ValidationErrors;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] Error),
    #[error("photo upload failed: {0}")]
    Upload(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    message: String,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Domain(e) => e.kind(),
            ApiError::Upload(_) => ErrorKind::Store,
        }
    }
}

fn status(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Auth => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Store => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let message = match kind {
            ErrorKind::Store => {
                tracing::error!(error = ?self, "request failed");
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorEnvelope {
            error: ErrorBody { kind, message },
        };
        (status(kind), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Domain(Error::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Domain(Error::Validation(rejection.body_text()))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Domain(Error::Validation(errors.to_string()))
    }
}
