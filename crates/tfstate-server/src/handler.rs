//! Request handlers: verb dispatch onto engine operations.

use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tfstate_engine::{Engine, LockError, LockRecord, LockResult};
use tracing::{debug, info};

use crate::error::ApiError;

/// Header carrying the revision of the returned state.
pub const REVISION_HEADER: HeaderName = HeaderName::from_static("x-state-revision");

/// Fallback header for the lock ID on writes, when no `ID` query parameter is given.
pub const LOCK_ID_HEADER: HeaderName = HeaderName::from_static("lock-id");

#[derive(Clone)]
pub struct AppState {
    pub engine: Engine,
    pub reject_invalid_state: bool,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            reject_invalid_state: false,
        }
    }
}

/// Query parameters Terraform appends to state writes while it holds a lock.
#[derive(Debug, Default, Deserialize)]
pub struct WriteParams {
    #[serde(rename = "ID")]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UnlockRequest {
    #[serde(rename = "ID", default)]
    id: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub struct WriteResponse {
    pub revision: u64,
}

/// Health payload: a projection of engine state, never a mutation.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(Deserialize))]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub has_state: bool,
    pub is_locked: bool,
    pub revision: u64,
    /// The record holding the lock, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockRecord>,
    /// Current timestamp (RFC 3339).
    pub timestamp: String,
}

/// `/`: the state resource. Dispatches on the verb, including the
/// non-standard `LOCK` and `UNLOCK`.
///
/// The query string is only read by writes; other verbs ignore it.
pub async fn state_handler(
    State(app): State<AppState>,
    method: Method,
    params: Result<Query<WriteParams>, QueryRejection>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    match method.as_str() {
        "GET" | "HEAD" => Ok(get_state(&app)),
        "POST" | "PUT" => {
            let lock_id = write_lock_id(params?.0, &headers);
            put_state(&app, body?, lock_id.as_deref())
        }
        "DELETE" => {
            let lock_id = write_lock_id(params?.0, &headers);
            delete_state(&app, lock_id.as_deref())
        }
        "LOCK" => lock(&app, &body?),
        "UNLOCK" => unlock(&app, &body?),
        other => Err(ApiError::MethodNotAllowed(other.to_string())),
    }
}

/// `/lock`: lock under any verb, for clients configured with a separate lock address.
pub async fn lock_handler(
    State(app): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    lock(&app, &body?)
}

/// `/unlock`: counterpart of [`lock_handler`].
pub async fn unlock_handler(
    State(app): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    unlock(&app, &body?)
}

pub async fn health_handler(State(app): State<AppState>) -> Json<HealthResponse> {
    let snapshot = app.engine.health();
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        has_state: snapshot.has_state,
        is_locked: snapshot.is_locked,
        revision: snapshot.revision,
        lock: snapshot.lock,
        timestamp: Utc::now().to_rfc3339(),
    })
}

fn get_state(app: &AppState) -> Response {
    match app.engine.get_state() {
        Some(blob) => (
            StatusCode::OK,
            [
                (CONTENT_TYPE, HeaderValue::from_static("application/json")),
                (REVISION_HEADER, HeaderValue::from(blob.revision)),
            ],
            blob.content,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn put_state(app: &AppState, body: Bytes, lock_id: Option<&str>) -> Result<Response, ApiError> {
    if app.reject_invalid_state {
        serde_json::from_slice::<serde::de::IgnoredAny>(&body)
            .map_err(|e| ApiError::bad_request("invalid_state", e.to_string()))?;
    }
    let size = body.len();
    let revision = app.engine.put_state(body, lock_id)?;
    info!(revision, size, "state written");
    Ok((StatusCode::OK, Json(WriteResponse { revision })).into_response())
}

fn delete_state(app: &AppState, lock_id: Option<&str>) -> Result<Response, ApiError> {
    let existed = app.engine.delete_state(lock_id)?;
    info!(existed, "state deleted");
    Ok(StatusCode::OK.into_response())
}

fn lock(app: &AppState, body: &[u8]) -> Result<Response, ApiError> {
    let record: LockRecord = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request("invalid_lock_info", e.to_string()))?;
    lock_outcome(app.engine.lock(record))
}

fn unlock(app: &AppState, body: &[u8]) -> Result<Response, ApiError> {
    let id = if body.trim_ascii().is_empty() {
        String::new()
    } else {
        serde_json::from_slice::<UnlockRequest>(body)
            .map_err(|e| ApiError::bad_request("invalid_lock_info", e.to_string()))?
            .id
    };
    let result = app.engine.unlock(&id);
    if result == Err(LockError::NotLocked) {
        debug!(lock_id = %id, "unlock with no lock held");
    }
    lock_outcome(result)
}

/// Map a lock or unlock outcome onto the response. Unlocking an unlocked
/// resource is a no-op.
fn lock_outcome(result: LockResult<()>) -> Result<Response, ApiError> {
    match result {
        Ok(()) | Err(LockError::NotLocked) => Ok(StatusCode::OK.into_response()),
        Err(LockError::Conflict { held }) => Err(ApiError::Locked(held)),
        Err(LockError::Mismatch { held, .. }) => Err(ApiError::Conflict(held)),
    }
}

fn write_lock_id(params: WriteParams, headers: &HeaderMap) -> Option<String> {
    params.id.or_else(|| {
        headers
            .get(LOCK_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_id_prefers_query() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCK_ID_HEADER, HeaderValue::from_static("from-header"));
        let params = WriteParams {
            id: Some("from-query".into()),
        };
        assert_eq!(write_lock_id(params, &headers).as_deref(), Some("from-query"));
        assert_eq!(
            write_lock_id(WriteParams::default(), &headers).as_deref(),
            Some("from-header")
        );
        assert_eq!(write_lock_id(WriteParams::default(), &HeaderMap::new()), None);
    }

    #[test]
    fn lock_outcomes() {
        let held = LockRecord::new("lock-1", "apply");
        assert_eq!(lock_outcome(Ok(())).unwrap().status(), StatusCode::OK);
        assert_eq!(
            lock_outcome(Err(LockError::NotLocked)).unwrap().status(),
            StatusCode::OK
        );

        let err = lock_outcome(Err(LockError::Conflict { held: held.clone() })).unwrap_err();
        assert!(matches!(err, ApiError::Locked(r) if r == held));

        let err = lock_outcome(Err(LockError::Mismatch {
            held: held.clone(),
            requested: "lock-2".into(),
        }))
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(r) if r == held));
    }

    #[test]
    fn unlock_request_ignores_extra_fields() {
        let req: UnlockRequest =
            serde_json::from_str(r#"{"ID":"lock-1","Operation":"apply","Who":"a@b"}"#).unwrap();
        assert_eq!(req.id, "lock-1");
    }
}
