//! Staff report handling endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use whisper_common::AppResult;
use whisper_db::entities::{Department, ReportCategory, ReportStatus, report, report_comment};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// A report as shown to staff.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: String,
    pub reference_id: String,
    pub company_id: String,
    pub reporter_name: Option<String>,
    pub is_anonymous: bool,
    pub title: String,
    pub person_accused: Option<String>,
    pub category: ReportCategory,
    pub department: Department,
    pub description: String,
    pub evidence: Option<String>,
    pub evidence_content_type: Option<String>,
    pub evidence_size: Option<i64>,
    pub status: ReportStatus,
    pub assigned_to: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<report::Model> for ReportResponse {
    fn from(report: report::Model) -> Self {
        Self {
            id: report.id,
            reference_id: report.reference_id,
            company_id: report.company_id,
            reporter_name: report.reporter_name,
            is_anonymous: report.is_anonymous,
            title: report.title,
            person_accused: report.person_accused,
            category: report.category,
            department: report.department,
            description: report.description,
            evidence: report.evidence_text,
            evidence_content_type: report.evidence_content_type,
            evidence_size: report.evidence_size,
            status: report.status,
            assigned_to: report.assigned_to,
            created_at: report.created_at.to_rfc3339(),
            updated_at: report.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub author: String,
    pub user_id: Option<String>,
    pub comment: String,
    pub is_internal: bool,
    pub created_at: String,
}

impl From<report_comment::Model> for CommentResponse {
    fn from(comment: report_comment::Model) -> Self {
        Self {
            id: comment.id,
            author: comment.author_label,
            user_id: comment.user_id,
            comment: comment.comment,
            is_internal: comment.is_internal,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub report_id: String,
}

/// Show one report.
async fn show(
    AuthUser(session): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state
        .dashboard_service
        .report_detail(&session, &req.report_id)
        .await?;
    Ok(ApiResponse::ok(report.into()))
}

/// A report's staff thread.
async fn comments(
    AuthUser(session): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let thread = state
        .dashboard_service
        .list_comments(&session, &req.report_id)
        .await?;
    Ok(ApiResponse::ok(
        thread.into_iter().map(CommentResponse::from).collect(),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    pub report_id: String,
    pub comment: String,
    #[serde(default)]
    pub is_internal: bool,
}

/// Post a staff comment.
async fn add_comment(
    AuthUser(session): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AddCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .dashboard_service
        .add_staff_comment(&session, &req.report_id, &req.comment, req.is_internal)
        .await?;
    Ok(ApiResponse::ok(comment.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub report_id: String,
    pub status: ReportStatus,
}

/// Change a report's status.
async fn update_status(
    AuthUser(session): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state
        .dashboard_service
        .update_status(&session, &req.report_id, req.status)
        .await?;
    Ok(ApiResponse::ok(report.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub report_id: String,
    pub investigator_id: String,
}

/// Assign a report to an investigator.
async fn assign(
    AuthUser(session): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<AssignRequest>,
) -> AppResult<ApiResponse<ReportResponse>> {
    let report = state
        .dashboard_service
        .assign_report(&session, &req.report_id, &req.investigator_id)
        .await?;
    Ok(ApiResponse::ok(report.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/show", post(show))
        .route("/comments", post(comments))
        .route("/comments/create", post(add_comment))
        .route("/update-status", post(update_status))
        .route("/assign", post(assign))
}
