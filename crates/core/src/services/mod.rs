//! Business logic services.

#![allow(missing_docs)]

pub mod company;
pub mod dashboard;
pub mod guard;
pub mod identity;
pub mod password;
pub mod report;
pub mod submission;
pub mod workflow;

pub use company::CompanyService;
pub use dashboard::{
    AdminOverview, DashboardService, InvestigatorDashboard, ModeratorDashboard, StatusCounts,
};
pub use guard::{
    GuardDecision, ProtectedRoute, SessionState, guard, landing_route, protected_route_for,
};
pub use identity::{IdentityService, Session, SignUpInput, SignedIn};
pub use report::{CommentView, ReportService, ReportStatusView};
pub use submission::{SubmissionService, SubmissionSnapshot};
pub use workflow::{
    EvidenceFileInput, ReportDraft, ReportDraftInput, StepKind, SubmissionEvent,
    SubmissionReceipt, SubmissionStep, transition, validate_draft,
};
