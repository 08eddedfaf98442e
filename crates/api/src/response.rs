//! API response types.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A dashboard request turned away by the route guard.
///
/// Carries the redirect target in `Location` so clients can navigate
/// without rendering anything from the protected route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardRejection {
    pub status: StatusCode,
    pub location: &'static str,
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        let (code, message) = if self.status == StatusCode::UNAUTHORIZED {
            ("UNAUTHORIZED", "sign in required")
        } else {
            ("FORBIDDEN", "this dashboard is not available for your role")
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "redirect": self.location,
            }
        }));

        (self.status, [(header::LOCATION, self.location)], body).into_response()
    }
}
