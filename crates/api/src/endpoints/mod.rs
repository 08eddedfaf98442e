//! API endpoints.

mod auth;
mod companies;
mod dashboards;
mod reports;
mod status;
mod submissions;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboards::router())
        .nest("/companies", companies::router())
        .nest("/submissions", submissions::router())
        .nest("/status", status::router())
        .nest("/reports", reports::router())
}
