use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::applications::error::ApplicationError;

pub type StandardResponse<T> = Result<T, FailureResponse>;

#[derive(Debug)]
pub enum FailureResponse {
    BadRequest(String),
    NotFound(String),
    Forbidden(String),
    Conflict(String),
    ServerError,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for FailureResponse {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            FailureResponse::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.as_str())
            }
            FailureResponse::NotFound(msg) => {
                (StatusCode::NOT_FOUND, msg.as_str())
            }
            FailureResponse::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, msg.as_str())
            }
            FailureResponse::Conflict(msg) => {
                (StatusCode::CONFLICT, msg.as_str())
            }
            FailureResponse::ServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<ApplicationError> for FailureResponse {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound(_) => {
                FailureResponse::NotFound(e.to_string())
            }
            ApplicationError::Conflict | ApplicationError::Stale => {
                FailureResponse::Conflict(e.to_string())
            }
            ApplicationError::Forbidden(_) => {
                FailureResponse::Forbidden(e.to_string())
            }
            ApplicationError::Store { .. } => {
                tracing::error!(error = %e, "storage failure");
                FailureResponse::ServerError
            }
        }
    }
}

impl From<tokio::task::JoinError> for FailureResponse {
    fn from(e: tokio::task::JoinError) -> Self {
        tracing::error!(error = %e, "blocking task failed");
        FailureResponse::ServerError
    }
}

pub fn bad_request<T>(msg: impl Into<String>) -> StandardResponse<T> {
    Err(FailureResponse::BadRequest(msg.into()))
}
