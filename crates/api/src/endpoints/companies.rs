//! Company endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use whisper_common::{AppError, AppResult};
use whisper_db::entities::{UserRole, company};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyResponse {
    pub id: String,
    pub name: String,
    pub code: String,
}

impl From<company::Model> for CompanyResponse {
    fn from(company: company::Model) -> Self {
        Self {
            id: company.id,
            name: company.name,
            code: company.code,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

/// Resolve a company code.
async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> AppResult<ApiResponse<CompanyResponse>> {
    let company = state.company_service.verify_code(&req.code).await?;
    Ok(ApiResponse::ok(company.into()))
}

/// List organizations.
async fn list(
    MaybeAuthUser(session): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<CompanyResponse>>> {
    let is_admin = session.is_some_and(|s| s.role() == UserRole::Admin);
    let companies = state.company_service.list_organizations(is_admin).await?;
    Ok(ApiResponse::ok(
        companies.into_iter().map(CompanyResponse::from).collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub name: String,
    pub code: String,
}

/// Create an organization (admin only).
async fn create(
    AuthUser(session): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> AppResult<ApiResponse<CompanyResponse>> {
    if session.role() != UserRole::Admin {
        return Err(AppError::Forbidden("admin access required".to_string()));
    }

    let company = state
        .company_service
        .create_organization(&req.name, &req.code)
        .await?;
    Ok(ApiResponse::ok(company.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verify", post(verify))
        .route("/list", post(list))
        .route("/create", post(create))
}
