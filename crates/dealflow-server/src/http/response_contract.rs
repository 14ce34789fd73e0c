// SPDX-License-Identifier: Apache-2.0

use crate::ServiceError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    NotFound,
    ValidationFailed,
    StoreUnavailable,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn validation_failed(field_errors: Value) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            "validation failed",
            json!({"field_errors": field_errors}),
        )
    }
}

#[must_use]
pub(crate) fn api_error_status(code: ApiErrorCode) -> StatusCode {
    match code {
        ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
        ApiErrorCode::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ApiErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ApiErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[must_use]
pub(crate) fn api_error_response(status: StatusCode, err: ApiError) -> Response {
    (status, Json(json!({"error": err}))).into_response()
}

/// Error half of every handler's return type.
#[derive(Debug)]
pub(crate) struct HandlerError {
    status: StatusCode,
    body: ApiError,
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        api_error_response(self.status, self.body)
    }
}

impl From<ServiceError> for HandlerError {
    fn from(value: ServiceError) -> Self {
        let body = match &value {
            ServiceError::NotFound { entity, id } => {
                let mut details = Map::new();
                details.insert(format!("{}_id", entity.to_ascii_lowercase()), json!(id));
                ApiError::new(ApiErrorCode::NotFound, value.to_string(), Value::Object(details))
            }
            ServiceError::Store(err) if err.is_unavailable() => {
                error!(error = %err, "store unavailable");
                ApiError::new(ApiErrorCode::StoreUnavailable, "store unavailable", json!({}))
            }
            ServiceError::Store(err) => {
                error!(error = %err, "store failure");
                ApiError::new(ApiErrorCode::Internal, "internal error", json!({}))
            }
            ServiceError::Internal(message) => {
                error!(error = %message, "internal failure");
                ApiError::new(ApiErrorCode::Internal, "internal error", json!({}))
            }
        };
        Self {
            status: api_error_status(body.code),
            body,
        }
    }
}

/// Body parsing failures keep the status axum chose (400 for broken JSON,
/// 415 for a missing content type, 422 for type or field errors).
impl From<JsonRejection> for HandlerError {
    fn from(value: JsonRejection) -> Self {
        Self {
            status: value.status(),
            body: ApiError::validation_failed(json!([{"reason": value.body_text()}])),
        }
    }
}

/// A path segment that does not parse as an id is a 400 in the same envelope.
impl From<PathRejection> for HandlerError {
    fn from(value: PathRejection) -> Self {
        Self {
            status: value.status(),
            body: ApiError::validation_failed(json!([{"reason": value.body_text()}])),
        }
    }
}
