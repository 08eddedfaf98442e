//! HTTP API layer for secure-whisper.
//!
//! - **Endpoints**: sign-in, company verification, the submission
//!   workflow, status lookup and staff dashboards
//! - **Extractors**: session and client address
//! - **Middleware**: token authentication, attempt throttling
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
pub use rate_limit::{ApiRateLimiter, RateLimitConfig};
