//! HTTP error responses.
//!
//! Every error body has the shape `{"errors": [{"message": ..., "field"?: ...}]}`.
//! Internal failures never carry their cause; the cause is logged where it
//! happened.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::geocode::GeocodeError;
use crate::signup::SignupError;
use crate::validation::FieldError;

pub const INTERNAL_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request")]
    Validation(Vec<FieldError>),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Not allowed")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Signup(#[from] SignupError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorItem<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

fn single(status: StatusCode, message: &str) -> Response {
    let item = ErrorItem {
        message,
        field: None,
    };
    (status, Json(json!({ "errors": [item] }))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let items: Vec<ErrorItem> = errors
                    .iter()
                    .map(|e| ErrorItem {
                        message: e.message,
                        field: Some(e.field),
                    })
                    .collect();
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": items }))).into_response()
            }
            ApiError::Unauthorized | ApiError::InvalidCredentials => {
                single(StatusCode::UNAUTHORIZED, &self.to_string())
            }
            ApiError::Forbidden => single(StatusCode::FORBIDDEN, &self.to_string()),
            ApiError::UserNotFound => single(StatusCode::NOT_FOUND, &self.to_string()),
            ApiError::Json(rejection) => single(rejection.status(), &rejection.body_text()),
            ApiError::Signup(SignupError::Internal) => {
                single(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
            }
            ApiError::Signup(SignupError::LinkFailed { user_id, person_id }) => {
                let item = ErrorItem {
                    message: "Account created but not linked to its person record",
                    field: None,
                };
                let body = json!({
                    "errors": [item],
                    "code": "link_failed",
                    "userId": user_id,
                    "personId": person_id,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            ApiError::Geocode(GeocodeError::EmptyQuery) => {
                single(StatusCode::BAD_REQUEST, &GeocodeError::EmptyQuery.to_string())
            }
            ApiError::Geocode(e) => {
                error!(error = %e, "geocoding failed");
                single(StatusCode::BAD_GATEWAY, "Geocoding service unavailable")
            }
            ApiError::Session(e) => {
                error!(error = %e, "session store failed");
                single(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
            }
            ApiError::Internal(e) => {
                error!(error = %e, "request failed");
                single(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
            }
        }
    }
}
