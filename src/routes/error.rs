// Pipeline errors -> HTTP status + `{"error": "..."}` body.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::Error;

#[derive(Debug)]
pub enum ApiError {
    Pipeline(Error),
    BadRequest(String),
    /// Multipart body rejected by axum; keeps its status (e.g. 413 over the body limit).
    Multipart { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart { status, .. } => *status,
            ApiError::Pipeline(e) => match e {
                Error::Csv(_)
                | Error::MissingColumn(_)
                | Error::EmptyInput
                | Error::InvalidValue { .. }
                | Error::UndefinedAverage(_) => StatusCode::BAD_REQUEST,
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::InvalidRecord(_) => StatusCode::UNPROCESSABLE_ENTITY,
                Error::RetentionViolation { .. } | Error::Storage(_) | Error::Decode(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError::Pipeline(e)
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Multipart {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Pipeline(Error::NotFound(_)) => "Dataset not found".to_string(),
            ApiError::Pipeline(e) => {
                if !e.is_client_error() {
                    tracing::error!(error = %e, "request failed");
                }
                e.to_string()
            }
            ApiError::BadRequest(msg) => msg,
            ApiError::Multipart { message, .. } => message,
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
