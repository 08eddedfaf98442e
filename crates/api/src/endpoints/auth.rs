//! Authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use whisper_common::AppResult;
use whisper_core::{
    Session, SignUpInput, SignedIn,
    guard::{GuardDecision, SessionState, guard, protected_route_for},
    landing_route,
};
use whisper_db::entities::{Department, UserRole};

use crate::{
    extractors::{AuthUser, ClientIp, MaybeAuthUser},
    middleware::AppState,
    rate_limit::limits,
    response::ApiResponse,
};

/// Signup request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Signin request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    /// Email address or 8-digit user id.
    pub login: String,
    pub password: String,
}

/// The signed-in account.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub display_user_id: String,
    pub role: UserRole,
    pub department: Option<Department>,
    /// Where the client should navigate next.
    pub landing: &'static str,
}

impl From<&Session> for AccountResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.user_id().to_string(),
            email: session.email().to_string(),
            display_user_id: session.display_user_id().to_string(),
            role: session.role(),
            department: session.department(),
            landing: landing_route(session.role()),
        }
    }
}

/// Account plus the bearer token for later requests.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    #[serde(flatten)]
    pub account: AccountResponse,
    pub token: String,
}

impl From<SignedIn> for SigninResponse {
    fn from(signed_in: SignedIn) -> Self {
        Self {
            account: AccountResponse::from(&signed_in.session),
            token: signed_in.token,
        }
    }
}

/// Create a new account.
async fn signup(
    State(state): State<AppState>,
    client_ip: ClientIp,
    Json(req): Json<SignupRequest>,
) -> AppResult<ApiResponse<SigninResponse>> {
    state
        .attempt_limiter
        .enforce(&client_ip.throttle_key("signup"), &limits::SIGN_UP)
        .await?;

    let signed_in = state
        .identity_service
        .sign_up(SignUpInput {
            email: req.email,
            password: req.password,
            password_confirm: req.password_confirm,
        })
        .await?;

    Ok(ApiResponse::ok(signed_in.into()))
}

/// Sign in with an email or user id.
async fn signin(
    State(state): State<AppState>,
    client_ip: ClientIp,
    Json(req): Json<SigninRequest>,
) -> AppResult<ApiResponse<SigninResponse>> {
    state
        .attempt_limiter
        .enforce(&client_ip.throttle_key("signin"), &limits::SIGN_IN)
        .await?;

    let signed_in = state
        .identity_service
        .sign_in(&req.login, &req.password)
        .await?;

    Ok(ApiResponse::ok(signed_in.into()))
}

#[derive(Serialize)]
pub struct SignoutResponse {
    pub ok: bool,
}

/// Sign out, invalidating the current token.
async fn signout(
    AuthUser(session): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SignoutResponse>> {
    state.identity_service.sign_out(&session).await?;
    Ok(ApiResponse::ok(SignoutResponse { ok: true }))
}

/// The current account.
async fn me(AuthUser(session): AuthUser) -> ApiResponse<AccountResponse> {
    ApiResponse::ok(AccountResponse::from(&session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCheckRequest {
    pub path: String,
}

/// Guard decision for a client-side navigation.
async fn check_route(
    MaybeAuthUser(session): MaybeAuthUser,
    Json(req): Json<RouteCheckRequest>,
) -> ApiResponse<GuardDecision> {
    // Unguarded paths render for everyone.
    let decision = protected_route_for(&req.path).map_or(GuardDecision::Render, |route| {
        guard(SessionState::from(session.as_ref()), &route)
    });
    ApiResponse::ok(decision)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/i", post(me))
        .route("/i/route", post(check_route))
}
