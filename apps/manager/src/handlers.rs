// [apps/manager/src/handlers.rs]
//! Thin Ingress API handlers (spec §4.7): decode, delegate to the
//! [`Dispatcher`], map errors to HTTP codes, serialize the response. No
//! business logic lives here.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crackhash_domain_models::{CrackRequest, RequestInfo, Status};

use crate::dispatcher::DispatchError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CrackAcceptedResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { message: message.into() }))
}

/// `POST /api/hash/crack` (spec §4.7).
pub async fn submit_crack_request(
    State(state): State<AppState>,
    Json(req): Json<CrackRequest>,
) -> Result<Json<CrackAcceptedResponse>, (StatusCode, Json<ErrorResponse>)> {
    if !req.has_well_formed_hash() || req.max_length == 0 {
        return Err(error_response(StatusCode::BAD_REQUEST, "hash must be 32 hex characters and maxLength must be positive"));
    }

    match state.dispatcher.dispatch_request(req).await {
        Ok(request_id) => Ok(Json(CrackAcceptedResponse { request_id })),
        Err(err) => {
            error!(error = %err, "dispatch failed");
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to dispatch crack request"))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "requestId")]
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: Status,
    pub data: Vec<String>,
}

impl From<RequestInfo> for StatusResponse {
    /// `data` is non-empty only for terminal statuses with matches (spec §4.7).
    fn from(info: RequestInfo) -> Self {
        let data = if info.status.is_terminal() { info.found_data } else { Vec::new() };
        StatusResponse { status: info.status, data }
    }
}

/// `GET /api/hash/status?requestId=<id>` (spec §4.7).
pub async fn get_crack_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.dispatcher.status(&query.request_id).await {
        Ok(info) => Ok(Json(info.into())),
        Err(DispatchError::NotFound) => Err(error_response(StatusCode::NOT_FOUND, "unknown requestId")),
        Err(err) => {
            error!(error = %err, "status lookup failed");
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to read request status"))
        }
    }
}

/// `GET /api/health` (spec §4.7).
pub async fn health() -> &'static str {
    "OK"
}
