//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use whisper_core::{
    CompanyService, DashboardService, IdentityService, ReportService, SubmissionService,
};

use crate::rate_limit::ApiRateLimiter;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub identity_service: IdentityService,
    pub company_service: CompanyService,
    pub submission_service: SubmissionService,
    pub report_service: ReportService,
    pub dashboard_service: DashboardService,
    /// Per-address attempts against credential checks.
    pub attempt_limiter: ApiRateLimiter,
    /// Whether proxy headers identify the client for throttling.
    pub trust_proxy_headers: bool,
}

/// Authentication middleware.
///
/// Resolves a bearer token to a [`whisper_core::Session`] in the request
/// extensions. Requests without a valid token continue unauthenticated.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.identity_service.current_session(token.trim()).await {
            Ok(Some(session)) => {
                req.extensions_mut().insert(session);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Session lookup failed"),
        }
    }

    next.run(req).await
}
