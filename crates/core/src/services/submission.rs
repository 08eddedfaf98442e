//! In-progress report submissions.
//!
//! Each submission lives server-side under an opaque token until it is
//! confirmed, abandoned or idle for longer than the configured TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;
use whisper_common::{AppError, AppResult, IdGenerator};

use super::company::CompanyService;
use super::report::ReportService;
use super::workflow::{
    ReportDraftInput, StepKind, SubmissionEvent, SubmissionReceipt, SubmissionStep, transition,
    validate_draft,
};

#[derive(Debug)]
struct SubmissionSession {
    step: SubmissionStep,
    /// Set while the report is being persisted.
    in_flight: bool,
    last_active: Instant,
}

impl SubmissionSession {
    fn new() -> Self {
        Self {
            step: SubmissionStep::CompanyVerify,
            in_flight: false,
            last_active: Instant::now(),
        }
    }

    fn snapshot(&self) -> SubmissionSnapshot {
        SubmissionSnapshot {
            step: self.step.kind(),
            organization_name: self.step.organization().map(|o| o.name.clone()),
            receipt: match &self.step {
                SubmissionStep::Confirmed { receipt } => Some(receipt.clone()),
                _ => None,
            },
        }
    }

    /// Apply `event`, keeping the current step if it is rejected.
    fn apply(&mut self, event: SubmissionEvent) -> AppResult<()> {
        self.step = transition(self.step.clone(), event)?;
        self.last_active = Instant::now();
        Ok(())
    }
}

/// Client-facing view of a submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSnapshot {
    pub step: StepKind,
    pub organization_name: Option<String>,
    pub receipt: Option<SubmissionReceipt>,
}

/// Submission service.
#[derive(Clone)]
pub struct SubmissionService {
    sessions: Arc<RwLock<HashMap<String, SubmissionSession>>>,
    company_service: CompanyService,
    report_service: ReportService,
    ttl: Duration,
    id_gen: IdGenerator,
}

impl SubmissionService {
    /// Create a new submission service.
    #[must_use]
    pub fn new(company_service: CompanyService, report_service: ReportService, ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            company_service,
            report_service,
            ttl,
            id_gen: IdGenerator::new(),
        }
    }

    /// Begin a submission at the company step.
    pub async fn start(&self) -> (String, SubmissionSnapshot) {
        let token = self.id_gen.generate_token();
        let session = SubmissionSession::new();
        let snapshot = session.snapshot();
        self.sessions.write().await.insert(token.clone(), session);
        (token, snapshot)
    }

    /// Current state of a submission.
    pub async fn current(&self, token: &str) -> AppResult<SubmissionSnapshot> {
        let sessions = self.sessions.read().await;
        let session = self.live(&sessions, token)?;
        Ok(session.snapshot())
    }

    /// Verify the company code and move to the report step.
    pub async fn verify_company(&self, token: &str, code: &str) -> AppResult<SubmissionSnapshot> {
        self.expect_step(token, StepKind::CompanyVerify).await?;

        let organization = self.company_service.verify_code(code).await?;

        let mut sessions = self.sessions.write().await;
        let session = self.live_mut(&mut sessions, token)?;
        session.apply(SubmissionEvent::CompanyVerified(organization))?;
        Ok(session.snapshot())
    }

    /// Validate the report details and move to the credential step.
    pub async fn compose(
        &self,
        token: &str,
        input: ReportDraftInput,
    ) -> AppResult<SubmissionSnapshot> {
        self.expect_step(token, StepKind::ReportCompose).await?;

        let draft = validate_draft(input)?;

        let mut sessions = self.sessions.write().await;
        let session = self.live_mut(&mut sessions, token)?;
        session.apply(SubmissionEvent::DraftAccepted(draft))?;
        Ok(session.snapshot())
    }

    /// Step back one screen.
    pub async fn back(&self, token: &str) -> AppResult<SubmissionSnapshot> {
        let mut sessions = self.sessions.write().await;
        let session = self.live_mut(&mut sessions, token)?;
        if session.in_flight {
            return Err(in_progress());
        }
        session.apply(SubmissionEvent::Back)?;
        Ok(session.snapshot())
    }

    /// Set the status password and persist the report.
    ///
    /// Only one finalize may run per submission at a time. Persisting runs
    /// on its own task, so a caller that goes away mid-request still leaves
    /// the submission confirmed or back at the credential step.
    pub async fn finalize(
        &self,
        token: &str,
        password: &str,
        password_confirm: &str,
        reporter_id: Option<&str>,
    ) -> AppResult<SubmissionReceipt> {
        let (organization, draft) = {
            let mut sessions = self.sessions.write().await;
            let session = self.live_mut(&mut sessions, token)?;
            if session.in_flight {
                return Err(in_progress());
            }
            let SubmissionStep::SetCredential {
                organization,
                draft,
            } = &session.step
            else {
                return Err(AppError::InvalidTransition(format!(
                    "finalized is not allowed at {:?}",
                    session.step.kind()
                )));
            };
            let pair = (organization.clone(), draft.clone());
            session.in_flight = true;
            session.last_active = Instant::now();
            pair
        };

        let service = self.clone();
        let token_owned = token.to_string();
        let password = password.to_string();
        let password_confirm = password_confirm.to_string();
        let reporter_id = reporter_id.map(str::to_string);

        let task = tokio::spawn(async move {
            let result = service
                .report_service
                .create_report(
                    &organization,
                    &draft,
                    &password,
                    &password_confirm,
                    reporter_id.as_deref(),
                )
                .await;
            service.settle(&token_owned, result).await
        });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Submission persist task failed");
                if let Some(session) = self.sessions.write().await.get_mut(token) {
                    session.in_flight = false;
                }
                Err(AppError::Internal("submission could not be completed".to_string()))
            }
        }
    }

    /// Record the outcome of a persist attempt on its submission.
    async fn settle(
        &self,
        token: &str,
        result: AppResult<SubmissionReceipt>,
    ) -> AppResult<SubmissionReceipt> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(token) else {
            // Abandoned or purged mid-flight; the report, if created, stands.
            return result;
        };
        session.in_flight = false;
        session.last_active = Instant::now();

        let receipt = result?;
        session.apply(SubmissionEvent::Finalized(receipt.clone()))?;
        Ok(receipt)
    }

    /// Discard a submission and everything entered so far.
    pub async fn abandon(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Drop submissions idle longer than the TTL. Returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let ttl = self.ttl;
        sessions.retain(|_, s| s.last_active.elapsed() < ttl);
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "Purged idle submissions");
        }
        purged
    }

    /// Number of tracked submissions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn expect_step(&self, token: &str, expected: StepKind) -> AppResult<()> {
        let sessions = self.sessions.read().await;
        let session = self.live(&sessions, token)?;
        if session.in_flight {
            return Err(in_progress());
        }
        let actual = session.step.kind();
        if actual != expected {
            return Err(AppError::InvalidTransition(format!(
                "expected {expected:?}, submission is at {actual:?}"
            )));
        }
        Ok(())
    }

    fn live<'a>(
        &self,
        sessions: &'a HashMap<String, SubmissionSession>,
        token: &str,
    ) -> AppResult<&'a SubmissionSession> {
        sessions
            .get(token)
            .filter(|s| s.last_active.elapsed() < self.ttl)
            .ok_or_else(not_found)
    }

    fn live_mut<'a>(
        &self,
        sessions: &'a mut HashMap<String, SubmissionSession>,
        token: &str,
    ) -> AppResult<&'a mut SubmissionSession> {
        sessions
            .get_mut(token)
            .filter(|s| s.last_active.elapsed() < self.ttl)
            .ok_or_else(not_found)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("submission not found or expired".to_string())
}

fn in_progress() -> AppError {
    AppError::Conflict("submission already in progress".to_string())
}
