//! Report persistence and the reporter-facing status lookup.

use std::sync::Arc;

use serde::Serialize;
use whisper_common::{
    AppError, AppResult, IdGenerator, StorageBackend, generate_evidence_key, id::is_reference_id,
};
use whisper_db::{
    entities::{Department, ReportCategory, ReportStatus, company, report, report_comment},
    repositories::{CompanyRepository, ReportCommentRepository, ReportRepository},
};
use sea_orm::Set;

use super::password::{hash_password, validate_password_pair, verify_dummy, verify_password};
use super::workflow::{ReportDraft, SubmissionReceipt};

/// Attempts at drawing an unused reference id.
const REFERENCE_ID_ATTEMPTS: usize = 5;

/// Longest accepted comment, in characters.
pub const MAX_COMMENT_CHARS: usize = 5000;

/// Author label on comments posted through the status page.
pub const REPORTER_AUTHOR: &str = "Reporter";

/// A comment as shown on the status page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub author: String,
    pub comment: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<report_comment::Model> for CommentView {
    fn from(c: report_comment::Model) -> Self {
        Self {
            author: c.author_label,
            comment: c.comment,
            created_at: c.created_at,
        }
    }
}

/// What a reporter sees after a successful lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStatusView {
    pub reference_id: String,
    pub status: ReportStatus,
    pub category: ReportCategory,
    pub department: Department,
    pub company_name: String,
    pub submitted_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    pub comments: Vec<CommentView>,
}

/// Report service.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    company_repo: CompanyRepository,
    comment_repo: ReportCommentRepository,
    storage: Arc<dyn StorageBackend>,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub fn new(
        report_repo: ReportRepository,
        company_repo: CompanyRepository,
        comment_repo: ReportCommentRepository,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            report_repo,
            company_repo,
            comment_repo,
            storage,
            id_gen: IdGenerator::new(),
        }
    }

    /// Persist a report and issue its receipt.
    ///
    /// The status password is checked before anything is written.
    /// `reporter_id` is dropped for anonymous drafts.
    pub async fn create_report(
        &self,
        organization: &company::Model,
        draft: &ReportDraft,
        password: &str,
        password_confirm: &str,
        reporter_id: Option<&str>,
    ) -> AppResult<SubmissionReceipt> {
        validate_password_pair(password, password_confirm)?;

        let report_id = self.id_gen.generate();
        let status_password_hash = hash_password(password)?;

        let stored = match &draft.evidence_file {
            Some(file) => {
                let key = generate_evidence_key(&report_id, &file.extension);
                Some(
                    self.storage
                        .upload(&key, &file.data, &file.content_type)
                        .await?,
                )
            }
            None => None,
        };

        let now = chrono::Utc::now();
        let model = report::ActiveModel {
            id: Set(report_id.clone()),
            company_id: Set(organization.id.clone()),
            reporter_id: Set(if draft.is_anonymous() {
                None
            } else {
                reporter_id.map(str::to_string)
            }),
            reporter_name: Set(draft.name.clone()),
            title: Set(draft.subject.clone()),
            person_accused: Set(draft.person_accused.clone()),
            category: Set(draft.category),
            department: Set(draft.department),
            description: Set(draft.description.clone()),
            evidence_text: Set(draft.evidence_text.clone()),
            evidence_key: Set(stored.as_ref().map(|s| s.key.clone())),
            evidence_content_type: Set(stored.as_ref().map(|s| s.content_type.clone())),
            evidence_size: Set(stored
                .as_ref()
                .map(|s| i64::try_from(s.size).unwrap_or(i64::MAX))),
            status: Set(ReportStatus::Pending),
            status_password_hash: Set(status_password_hash),
            is_anonymous: Set(draft.is_anonymous()),
            assigned_to: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        let reference_id = match self.insert_with_reference(model).await {
            Ok(reference_id) => reference_id,
            Err(e) => {
                if let Some(stored) = &stored
                    && let Err(cleanup) = self.storage.delete(&stored.key).await
                {
                    tracing::warn!(key = %stored.key, error = %cleanup, "Failed to remove orphaned evidence");
                }
                return Err(e);
            }
        };

        tracing::info!(
            report_id = %report_id,
            company_id = %organization.id,
            department = %draft.department,
            anonymous = draft.is_anonymous(),
            "Report submitted"
        );

        Ok(SubmissionReceipt::new(report_id, reference_id))
    }

    /// Look up a report's status with its reference id and status password.
    pub async fn lookup_status(
        &self,
        reference_id: &str,
        password: &str,
    ) -> AppResult<ReportStatusView> {
        let report = self.authenticate(reference_id, password).await?;

        let company_name = self
            .company_repo
            .find_by_id(&report.company_id)
            .await?
            .map(|c| c.name)
            .unwrap_or_default();

        let comments = self
            .comment_repo
            .list_for_report(&report.id, false)
            .await?
            .into_iter()
            .filter(|c| !c.is_internal)
            .map(CommentView::from)
            .collect();

        Ok(ReportStatusView {
            reference_id: report.reference_id,
            status: report.status,
            category: report.category,
            department: report.department,
            company_name,
            submitted_at: report.created_at,
            updated_at: report.updated_at,
            comments,
        })
    }

    /// Append a reporter comment to the report's visible thread.
    pub async fn add_reporter_comment(
        &self,
        reference_id: &str,
        password: &str,
        body: &str,
    ) -> AppResult<CommentView> {
        let body = validate_comment_body(body)?;
        let report = self.authenticate(reference_id, password).await?;

        let comment = self
            .comment_repo
            .create(report_comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                report_id: Set(report.id),
                user_id: Set(None),
                author_label: Set(REPORTER_AUTHOR.to_string()),
                comment: Set(body),
                is_internal: Set(false),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await?;

        Ok(comment.into())
    }

    /// Resolve a report from its credentials.
    ///
    /// Every failure after input validation is the same error.
    async fn authenticate(&self, reference_id: &str, password: &str) -> AppResult<report::Model> {
        let reference_id = reference_id.trim().to_uppercase();
        if reference_id.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "reference id and password are required".to_string(),
            ));
        }

        let found = if is_reference_id(&reference_id) {
            self.report_repo.find_by_reference_id(&reference_id).await?
        } else {
            None
        };

        let Some(report) = found else {
            verify_dummy(password);
            return Err(AppError::InvalidCredentials);
        };

        if !verify_password(password, &report.status_password_hash)? {
            return Err(AppError::InvalidCredentials);
        }
        Ok(report)
    }

    /// Insert `model` under a fresh reference id, returning the id used.
    ///
    /// A reference id taken between the check and the insert costs one
    /// more attempt.
    async fn insert_with_reference(&self, model: report::ActiveModel) -> AppResult<String> {
        for _ in 0..REFERENCE_ID_ATTEMPTS {
            let reference_id = self.unused_reference_id().await?;
            let mut attempt = model.clone();
            attempt.reference_id = Set(reference_id.clone());
            match self.report_repo.create(attempt).await {
                Ok(_) => return Ok(reference_id),
                Err(AppError::Conflict(_)) => {
                    tracing::debug!(reference_id = %reference_id, "Reference id taken at insert");
                }
                Err(e) => return Err(e),
            }
        }
        Err(AppError::Internal(
            "Could not allocate a reference id".to_string(),
        ))
    }

    async fn unused_reference_id(&self) -> AppResult<String> {
        for _ in 0..REFERENCE_ID_ATTEMPTS {
            let candidate = self.id_gen.generate_reference_id();
            if !self.report_repo.reference_id_exists(&candidate).await? {
                return Ok(candidate);
            }
            tracing::debug!(reference_id = %candidate, "Reference id collision");
        }
        Err(AppError::Internal(
            "Could not allocate a reference id".to_string(),
        ))
    }
}

/// Trim a comment body and check its length.
pub fn validate_comment_body(body: &str) -> AppResult<String> {
    let body = body.trim();
    if body.is_empty() {
        return Err(AppError::Validation("comment is required".to_string()));
    }
    if body.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::Validation(format!(
            "comment must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }
    Ok(body.to_string())
}
