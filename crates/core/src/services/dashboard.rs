//! Staff dashboards and report handling.

use serde::Serialize;
use whisper_common::{AppError, AppResult, IdGenerator};
use whisper_db::{
    entities::{Department, ReportStatus, UserRole, report, report_comment},
    repositories::{
        CompanyRepository, ProfileRepository, ReportCommentRepository, ReportFilter,
        ReportRepository,
    },
};
use sea_orm::Set;

use super::identity::Session;
use super::report::validate_comment_body;

/// Reports shown on the admin overview.
const RECENT_REPORTS: u64 = 10;
/// Page size for staff report listings.
const DASHBOARD_PAGE: u64 = 100;

/// Report counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: i64,
    pub pending: i64,
    pub under_review: i64,
    pub investigating: i64,
    pub resolved: i64,
    pub closed: i64,
}

impl StatusCounts {
    fn from_rows(rows: &[(ReportStatus, i64)]) -> Self {
        rows.iter().fold(Self::default(), |mut acc, &(status, n)| {
            acc.total += n;
            match status {
                ReportStatus::Pending => acc.pending += n,
                ReportStatus::UnderReview => acc.under_review += n,
                ReportStatus::Investigating => acc.investigating += n,
                ReportStatus::Resolved => acc.resolved += n,
                ReportStatus::Closed => acc.closed += n,
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub counts: StatusCounts,
    pub companies: u64,
    pub investigators: u64,
    pub recent_reports: Vec<report::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeratorDashboard {
    pub department: Department,
    pub counts: StatusCounts,
    pub reports: Vec<report::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvestigatorDashboard {
    pub counts: StatusCounts,
    pub reports: Vec<report::Model>,
}

/// Dashboard service.
#[derive(Clone)]
pub struct DashboardService {
    report_repo: ReportRepository,
    company_repo: CompanyRepository,
    profile_repo: ProfileRepository,
    comment_repo: ReportCommentRepository,
    id_gen: IdGenerator,
}

impl DashboardService {
    /// Create a new dashboard service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        company_repo: CompanyRepository,
        profile_repo: ProfileRepository,
        comment_repo: ReportCommentRepository,
    ) -> Self {
        Self {
            report_repo,
            company_repo,
            profile_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// System-wide overview.
    pub async fn admin_overview(&self) -> AppResult<AdminOverview> {
        let filter = ReportFilter::default();
        let counts = StatusCounts::from_rows(&self.report_repo.count_by_status(&filter).await?);
        let companies = self.company_repo.count().await?;
        let investigators = self
            .profile_repo
            .count_by_role(UserRole::Investigator)
            .await?;
        let recent_reports = self.report_repo.list(&filter, RECENT_REPORTS, 0).await?;

        Ok(AdminOverview {
            counts,
            companies,
            investigators,
            recent_reports,
        })
    }

    /// Reports addressed to the moderator's department.
    pub async fn moderator_dashboard(&self, session: &Session) -> AppResult<ModeratorDashboard> {
        let department = moderator_department(session)?;
        let filter = ReportFilter {
            department: Some(department),
            ..Default::default()
        };

        let counts = StatusCounts::from_rows(&self.report_repo.count_by_status(&filter).await?);
        let reports = self.report_repo.list(&filter, DASHBOARD_PAGE, 0).await?;

        Ok(ModeratorDashboard {
            department,
            counts,
            reports,
        })
    }

    /// Reports assigned to the investigator.
    pub async fn investigator_dashboard(
        &self,
        session: &Session,
    ) -> AppResult<InvestigatorDashboard> {
        let filter = ReportFilter {
            assigned_to: Some(session.user_id().to_string()),
            ..Default::default()
        };

        let counts = StatusCounts::from_rows(&self.report_repo.count_by_status(&filter).await?);
        let reports = self.report_repo.list(&filter, DASHBOARD_PAGE, 0).await?;

        Ok(InvestigatorDashboard { counts, reports })
    }

    /// A single report, if the caller may see it.
    pub async fn report_detail(&self, session: &Session, report_id: &str) -> AppResult<report::Model> {
        self.accessible_report(session, report_id).await
    }

    /// A report's full thread, internal comments included.
    pub async fn list_comments(
        &self,
        session: &Session,
        report_id: &str,
    ) -> AppResult<Vec<report_comment::Model>> {
        let report = self.accessible_report(session, report_id).await?;
        self.comment_repo.list_for_report(&report.id, true).await
    }

    /// Post a staff comment. Internal comments never reach the reporter.
    pub async fn add_staff_comment(
        &self,
        session: &Session,
        report_id: &str,
        body: &str,
        is_internal: bool,
    ) -> AppResult<report_comment::Model> {
        require_role(session, &[UserRole::Moderator, UserRole::Investigator])?;
        let body = validate_comment_body(body)?;
        let report = self.accessible_report(session, report_id).await?;

        self.comment_repo
            .create(report_comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                report_id: Set(report.id),
                user_id: Set(Some(session.user_id().to_string())),
                author_label: Set(author_label(session.role()).to_string()),
                comment: Set(body),
                is_internal: Set(is_internal),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await
    }

    /// Move a report to another status.
    pub async fn update_status(
        &self,
        session: &Session,
        report_id: &str,
        status: ReportStatus,
    ) -> AppResult<report::Model> {
        require_role(session, &[UserRole::Moderator, UserRole::Investigator])?;
        let report = self.accessible_report(session, report_id).await?;
        let previous = report.status;

        let mut active: report::ActiveModel = report.into();
        active.status = Set(status);
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = self.report_repo.update(active).await?;

        tracing::info!(
            report_id = %updated.id,
            from = previous.as_str(),
            to = status.as_str(),
            by = %session.user_id(),
            "Report status changed"
        );
        Ok(updated)
    }

    /// Hand a report to an investigator.
    pub async fn assign_report(
        &self,
        session: &Session,
        report_id: &str,
        investigator_id: &str,
    ) -> AppResult<report::Model> {
        require_role(session, &[UserRole::Moderator, UserRole::Admin])?;
        let report = self.accessible_report(session, report_id).await?;

        let investigator = self
            .profile_repo
            .find_by_id(investigator_id)
            .await?
            .filter(|p| p.role == UserRole::Investigator)
            .ok_or_else(|| {
                AppError::Validation(format!("{investigator_id} is not an investigator"))
            })?;

        let mut active: report::ActiveModel = report.into();
        active.assigned_to = Set(Some(investigator.id));
        active.updated_at = Set(chrono::Utc::now().into());
        let updated = self.report_repo.update(active).await?;

        tracing::info!(report_id = %updated.id, investigator_id, "Report assigned");
        Ok(updated)
    }

    /// Load a report the caller is allowed to handle.
    ///
    /// Moderators see their department, investigators their assignments.
    async fn accessible_report(&self, session: &Session, report_id: &str) -> AppResult<report::Model> {
        let report = self.report_repo.get_by_id(report_id).await?;

        let allowed = match session.role() {
            UserRole::Admin => true,
            UserRole::Moderator => session.department() == Some(report.department),
            UserRole::Investigator => report.assigned_to.as_deref() == Some(session.user_id()),
            UserRole::User => false,
        };

        if allowed {
            Ok(report)
        } else {
            Err(AppError::Forbidden("report is outside your scope".to_string()))
        }
    }
}

fn require_role(session: &Session, roles: &[UserRole]) -> AppResult<()> {
    if roles.contains(&session.role()) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "{} may not perform this action",
            session.role().as_str()
        )))
    }
}

fn moderator_department(session: &Session) -> AppResult<Department> {
    session
        .department()
        .ok_or_else(|| AppError::Forbidden("no department assigned".to_string()))
}

const fn author_label(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "Admin",
        UserRole::Moderator => "Moderator",
        UserRole::Investigator => "Investigator",
        UserRole::User => "Reporter",
    }
}
