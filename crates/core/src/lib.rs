//! Core business logic for secure-whisper.
//!
//! Identity, company verification, the report submission workflow, status
//! lookup, the dashboard route guard and staff dashboards.

pub mod services;

pub use services::*;
