//! Reporter status endpoints.
//!
//! Both endpoints check the reference id and status password, so both
//! count against the caller's attempt budget.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use whisper_common::AppResult;
use whisper_core::{CommentView, ReportStatusView};

use crate::{
    extractors::ClientIp, middleware::AppState, rate_limit::limits, response::ApiResponse,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    pub reference_id: String,
    pub password: String,
}

/// Look up a report's status.
async fn lookup(
    State(state): State<AppState>,
    client_ip: ClientIp,
    Json(req): Json<LookupRequest>,
) -> AppResult<ApiResponse<ReportStatusView>> {
    state
        .attempt_limiter
        .enforce(&client_ip.throttle_key("status"), &limits::STATUS_LOOKUP)
        .await?;

    let view = state
        .report_service
        .lookup_status(&req.reference_id, &req.password)
        .await?;
    Ok(ApiResponse::ok(view))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub reference_id: String,
    pub password: String,
    pub comment: String,
}

/// Add a reporter comment.
async fn comment(
    State(state): State<AppState>,
    client_ip: ClientIp,
    Json(req): Json<CommentRequest>,
) -> AppResult<ApiResponse<CommentView>> {
    state
        .attempt_limiter
        .enforce(&client_ip.throttle_key("status"), &limits::STATUS_LOOKUP)
        .await?;

    let view = state
        .report_service
        .add_reporter_comment(&req.reference_id, &req.password, &req.comment)
        .await?;
    Ok(ApiResponse::ok(view))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/lookup", post(lookup))
        .route("/comment", post(comment))
}
