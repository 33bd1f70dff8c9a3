use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tfstate_engine::{LockRecord, WriteError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// JSON body for errors that do not carry a lock record.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct Problem {
    pub status: u16,
    pub code: String,
    pub detail: String,
}

/// A request-level failure, rendered as a status code plus JSON body.
///
/// Lock-related rejections answer with the held lock record itself so the
/// client can report who holds the state and since when.
#[derive(Debug)]
pub enum ApiError {
    /// 423: lock requested while another lock is held.
    Locked(LockRecord),
    /// 409: unlock with the wrong ID, or a write refused by the lock.
    Conflict(LockRecord),
    /// 400: body or parameters could not be decoded.
    BadRequest { code: &'static str, detail: String },
    /// 405: verb not mapped to any operation.
    MethodNotAllowed(String),
    /// 413: request body over the configured limit.
    PayloadTooLarge(String),
}

impl ApiError {
    pub fn bad_request(code: &'static str, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Locked(_) => StatusCode::LOCKED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request("invalid_query", rejection.body_text())
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::bad_request("invalid_body", rejection.body_text())
        }
    }
}

impl From<WriteError> for ApiError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Locked { held, .. } => Self::Conflict(held),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Locked(held) | Self::Conflict(held) => (status, Json(held)).into_response(),
            Self::BadRequest { code, detail } => problem(status, code, detail),
            Self::MethodNotAllowed(method) => problem(
                status,
                "method_not_allowed",
                format!("method {method} is not supported on this path"),
            ),
            Self::PayloadTooLarge(detail) => problem(status, "payload_too_large", detail),
        }
    }
}

fn problem(status: StatusCode, code: &str, detail: String) -> Response {
    let body = Problem {
        status: status.as_u16(),
        code: code.to_string(),
        detail,
    };
    (status, Json(body)).into_response()
}
