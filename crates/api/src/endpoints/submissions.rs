//! Report submission endpoints.
//!
//! A submission is started once and then addressed by its id through the
//! company, report and credential steps.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use whisper_common::AppResult;
use whisper_core::{
    EvidenceFileInput, ReportDraftInput, SubmissionReceipt, SubmissionSnapshot,
};
use whisper_db::entities::ReportCategory;

use crate::{extractors::MaybeAuthUser, middleware::AppState, response::ApiResponse};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub submission_id: String,
    #[serde(flatten)]
    pub snapshot: SubmissionSnapshot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub submission_id: String,
}

/// Begin a new submission.
async fn start(State(state): State<AppState>) -> ApiResponse<SubmissionResponse> {
    let (submission_id, snapshot) = state.submission_service.start().await;
    ApiResponse::ok(SubmissionResponse {
        submission_id,
        snapshot,
    })
}

/// Current step of a submission.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<SubmissionRequest>,
) -> AppResult<ApiResponse<SubmissionResponse>> {
    let snapshot = state.submission_service.current(&req.submission_id).await?;
    Ok(ApiResponse::ok(SubmissionResponse {
        submission_id: req.submission_id,
        snapshot,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStepRequest {
    pub submission_id: String,
    pub code: String,
}

/// Company step.
async fn company(
    State(state): State<AppState>,
    Json(req): Json<CompanyStepRequest>,
) -> AppResult<ApiResponse<SubmissionResponse>> {
    let snapshot = state
        .submission_service
        .verify_company(&req.submission_id, &req.code)
        .await?;
    Ok(ApiResponse::ok(SubmissionResponse {
        submission_id: req.submission_id,
        snapshot,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceFileRequest {
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStepRequest {
    pub submission_id: String,
    pub name: Option<String>,
    pub subject: Option<String>,
    pub person_accused: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    pub evidence: Option<String>,
    pub evidence_file: Option<EvidenceFileRequest>,
    pub category: Option<ReportCategory>,
}

impl ReportStepRequest {
    fn into_parts(self) -> (String, ReportDraftInput) {
        let draft = ReportDraftInput {
            name: self.name,
            subject: self.subject,
            person_accused: self.person_accused,
            department: self.department,
            description: self.description,
            evidence_text: self.evidence,
            evidence_file: self.evidence_file.map(|f| EvidenceFileInput {
                file_name: f.file_name,
                content_type: f.content_type,
                data_base64: f.data,
            }),
            category: self.category,
        };
        (self.submission_id, draft)
    }
}

/// Report step.
async fn report(
    State(state): State<AppState>,
    Json(req): Json<ReportStepRequest>,
) -> AppResult<ApiResponse<SubmissionResponse>> {
    let (submission_id, draft) = req.into_parts();
    let snapshot = state
        .submission_service
        .compose(&submission_id, draft)
        .await?;
    Ok(ApiResponse::ok(SubmissionResponse {
        submission_id,
        snapshot,
    }))
}

/// Go back one step.
async fn back(
    State(state): State<AppState>,
    Json(req): Json<SubmissionRequest>,
) -> AppResult<ApiResponse<SubmissionResponse>> {
    let snapshot = state.submission_service.back(&req.submission_id).await?;
    Ok(ApiResponse::ok(SubmissionResponse {
        submission_id: req.submission_id,
        snapshot,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRequest {
    pub submission_id: String,
    pub password: String,
    pub password_confirm: String,
}

/// Credential step. Persists the report.
async fn finalize(
    MaybeAuthUser(session): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<FinalizeRequest>,
) -> AppResult<ApiResponse<SubmissionReceipt>> {
    let receipt = state
        .submission_service
        .finalize(
            &req.submission_id,
            &req.password,
            &req.password_confirm,
            session.as_ref().map(|s| s.user_id()),
        )
        .await?;
    Ok(ApiResponse::ok(receipt))
}

#[derive(Serialize)]
pub struct AbandonResponse {
    pub ok: bool,
}

/// Discard a submission.
async fn abandon(
    State(state): State<AppState>,
    Json(req): Json<SubmissionRequest>,
) -> ApiResponse<AbandonResponse> {
    let ok = state.submission_service.abandon(&req.submission_id).await;
    ApiResponse::ok(AbandonResponse { ok })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/show", post(show))
        .route("/company", post(company))
        .route("/report", post(report))
        .route("/back", post(back))
        .route("/finalize", post(finalize))
        .route("/abandon", post(abandon))
}
