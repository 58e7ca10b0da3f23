//! HTTP error mapping.
//!
//! Validation failures and unknown ids are both client errors (400); store
//! failures are the only 500s.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde_json::json;
use todo_core::TodoServiceError;

/// Error returned by handlers, rendered as `{ "error": { code, message } }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_SERVER_ERROR",
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<TodoServiceError> for ApiError {
    fn from(value: TodoServiceError) -> Self {
        match value {
            TodoServiceError::Validation(err) => {
                Self::bad_request("VALIDATION_ERROR", err.to_string())
            }
            TodoServiceError::NotFound(id) => {
                Self::bad_request("INVALID_TODO_ID", format!("no todo with id `{id}`"))
            }
            TodoServiceError::Store(err) => {
                error!("event=http_request module=server status=error error={err}");
                Self::internal("todo store is unavailable")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::bad_request("INVALID_BODY", value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));
        (self.status, body).into_response()
    }
}
