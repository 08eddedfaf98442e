//! Role dashboards.
//!
//! Every handler runs the route guard first; a turned-away caller gets a
//! 401 or 403 carrying the redirect target and no dashboard data.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use whisper_common::AppError;
use whisper_core::{
    Session, StatusCounts,
    guard::{
        ADMIN_ROUTE, GuardDecision, INVESTIGATOR_ROUTE, LOGIN_ROUTE, MODERATOR_ROUTE,
        ProtectedRoute, SessionState, guard,
    },
};
use whisper_db::entities::Department;

use super::reports::ReportResponse;
use crate::{
    extractors::MaybeAuthUser,
    middleware::AppState,
    response::{ApiResponse, GuardRejection},
};

/// Failure of a dashboard request.
pub enum DashboardError {
    Guard(GuardRejection),
    App(AppError),
}

impl From<GuardRejection> for DashboardError {
    fn from(rejection: GuardRejection) -> Self {
        Self::Guard(rejection)
    }
}

impl From<AppError> for DashboardError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        match self {
            Self::Guard(rejection) => rejection.into_response(),
            Self::App(err) => err.into_response(),
        }
    }
}

/// Run the guard for `route`, yielding the session when it may render.
fn authorize(session: Option<Session>, route: &ProtectedRoute) -> Result<Session, GuardRejection> {
    let state = SessionState::from(session.as_ref());
    match (guard(state, route), session) {
        (GuardDecision::Render, Some(session)) => Ok(session),
        (GuardDecision::Redirect { to, .. }, Some(_)) => Err(GuardRejection {
            status: StatusCode::FORBIDDEN,
            location: to,
        }),
        // Session resolution is complete before handlers run, so an absent
        // session is always unauthenticated.
        _ => Err(GuardRejection {
            status: StatusCode::UNAUTHORIZED,
            location: LOGIN_ROUTE,
        }),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverviewResponse {
    pub counts: StatusCounts,
    pub companies: u64,
    pub investigators: u64,
    pub recent_reports: Vec<ReportResponse>,
}

async fn admin_overview(
    MaybeAuthUser(session): MaybeAuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<AdminOverviewResponse>, DashboardError> {
    authorize(session, &ADMIN_ROUTE)?;

    let overview = state.dashboard_service.admin_overview().await?;
    Ok(ApiResponse::ok(AdminOverviewResponse {
        counts: overview.counts,
        companies: overview.companies,
        investigators: overview.investigators,
        recent_reports: overview
            .recent_reports
            .into_iter()
            .map(ReportResponse::from)
            .collect(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeratorDashboardResponse {
    pub department: Department,
    pub counts: StatusCounts,
    pub reports: Vec<ReportResponse>,
}

async fn moderator_dashboard(
    MaybeAuthUser(session): MaybeAuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<ModeratorDashboardResponse>, DashboardError> {
    let session = authorize(session, &MODERATOR_ROUTE)?;

    let dashboard = state.dashboard_service.moderator_dashboard(&session).await?;
    Ok(ApiResponse::ok(ModeratorDashboardResponse {
        department: dashboard.department,
        counts: dashboard.counts,
        reports: dashboard
            .reports
            .into_iter()
            .map(ReportResponse::from)
            .collect(),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestigatorDashboardResponse {
    pub counts: StatusCounts,
    pub reports: Vec<ReportResponse>,
}

async fn investigator_dashboard(
    MaybeAuthUser(session): MaybeAuthUser,
    State(state): State<AppState>,
) -> Result<ApiResponse<InvestigatorDashboardResponse>, DashboardError> {
    let session = authorize(session, &INVESTIGATOR_ROUTE)?;

    let dashboard = state
        .dashboard_service
        .investigator_dashboard(&session)
        .await?;
    Ok(ApiResponse::ok(InvestigatorDashboardResponse {
        counts: dashboard.counts,
        reports: dashboard
            .reports
            .into_iter()
            .map(ReportResponse::from)
            .collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/overview", post(admin_overview))
        .route("/moderator/dashboard", post(moderator_dashboard))
        .route("/investigator/dashboard", post(investigator_dashboard))
}
