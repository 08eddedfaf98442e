//! Submission workflow steps and the rules for moving between them.
//!
//! The workflow is a pure state machine. [`transition`] is the only way to
//! move from one [`SubmissionStep`] to the next, and every step carries
//! exactly the data that is valid at that point: a draft cannot exist
//! without a verified organization, and a receipt cannot exist without a
//! persisted report.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use whisper_common::{AppError, AppResult};
use whisper_db::entities::{Department, ReportCategory, company};

/// Largest accepted evidence file, in bytes.
pub const MAX_EVIDENCE_BYTES: usize = 10 * 1024 * 1024;

/// Accepted evidence extensions and the MIME types allowed for each.
const EVIDENCE_TYPES: &[(&str, &[&str])] = &[
    ("pdf", &["application/pdf"]),
    ("doc", &["application/msword"]),
    (
        "docx",
        &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"],
    ),
    ("jpg", &["image/jpeg"]),
    ("jpeg", &["image/jpeg"]),
    ("png", &["image/png"]),
    ("txt", &["text/plain"]),
];

/// Shown with every receipt.
pub const RECEIPT_NOTICE: &str = "Keep your reference ID and status password. Both are required \
     to check the status of your report, and neither can be recovered.";

/// Where a submission currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStep {
    /// Waiting for a company code.
    CompanyVerify,
    /// Organization verified; waiting for the report details.
    ReportCompose { organization: company::Model },
    /// Draft accepted; waiting for the status password.
    SetCredential {
        organization: company::Model,
        draft: ReportDraft,
    },
    /// Report persisted. Terminal.
    Confirmed { receipt: SubmissionReceipt },
}

/// Step names as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    CompanyVerify,
    ReportCompose,
    SetCredential,
    Confirmed,
}

impl SubmissionStep {
    #[must_use]
    pub const fn kind(&self) -> StepKind {
        match self {
            Self::CompanyVerify => StepKind::CompanyVerify,
            Self::ReportCompose { .. } => StepKind::ReportCompose,
            Self::SetCredential { .. } => StepKind::SetCredential,
            Self::Confirmed { .. } => StepKind::Confirmed,
        }
    }

    /// The verified organization, if the step has one.
    #[must_use]
    pub const fn organization(&self) -> Option<&company::Model> {
        match self {
            Self::ReportCompose { organization } | Self::SetCredential { organization, .. } => {
                Some(organization)
            }
            Self::CompanyVerify | Self::Confirmed { .. } => None,
        }
    }
}

/// Inputs that move the workflow.
#[derive(Debug, Clone)]
pub enum SubmissionEvent {
    CompanyVerified(company::Model),
    DraftAccepted(ReportDraft),
    Finalized(SubmissionReceipt),
    Back,
}

impl SubmissionEvent {
    const fn name(&self) -> &'static str {
        match self {
            Self::CompanyVerified(_) => "company_verified",
            Self::DraftAccepted(_) => "draft_accepted",
            Self::Finalized(_) => "finalized",
            Self::Back => "back",
        }
    }
}

/// Apply `event` to `step`.
///
/// Any pairing not listed below is rejected and the caller keeps its step.
pub fn transition(step: SubmissionStep, event: SubmissionEvent) -> AppResult<SubmissionStep> {
    match (step, event) {
        (SubmissionStep::CompanyVerify, SubmissionEvent::CompanyVerified(organization)) => {
            Ok(SubmissionStep::ReportCompose { organization })
        }
        (SubmissionStep::ReportCompose { organization }, SubmissionEvent::DraftAccepted(draft)) => {
            Ok(SubmissionStep::SetCredential {
                organization,
                draft,
            })
        }
        (SubmissionStep::SetCredential { .. }, SubmissionEvent::Finalized(receipt)) => {
            Ok(SubmissionStep::Confirmed { receipt })
        }
        (SubmissionStep::ReportCompose { .. }, SubmissionEvent::Back) => {
            Ok(SubmissionStep::CompanyVerify)
        }
        // The draft is discarded on the way back.
        (SubmissionStep::SetCredential { organization, .. }, SubmissionEvent::Back) => {
            Ok(SubmissionStep::ReportCompose { organization })
        }
        (step, event) => Err(AppError::InvalidTransition(format!(
            "{} is not allowed at {:?}",
            event.name(),
            step.kind()
        ))),
    }
}

/// Evidence file as received from the client.
#[derive(Debug, Clone, Deserialize)]
pub struct EvidenceFileInput {
    pub file_name: String,
    pub content_type: String,
    /// Standard base64 of the file contents.
    pub data_base64: String,
}

/// Report details as received from the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportDraftInput {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub person_accused: Option<String>,
    pub department: Option<String>,
    pub description: Option<String>,
    pub evidence_text: Option<String>,
    pub evidence_file: Option<EvidenceFileInput>,
    pub category: Option<ReportCategory>,
}

/// A decoded evidence file that passed the type and size checks.
#[derive(Clone, PartialEq, Eq)]
pub struct EvidenceFile {
    /// Lowercase extension without the dot.
    pub extension: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl std::fmt::Debug for EvidenceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceFile")
            .field("extension", &self.extension)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Validated report details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub name: Option<String>,
    pub subject: String,
    pub person_accused: Option<String>,
    pub department: Department,
    pub description: String,
    pub evidence_text: Option<String>,
    pub evidence_file: Option<EvidenceFile>,
    pub category: ReportCategory,
}

impl ReportDraft {
    /// A report without a reporter name is anonymous.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }
}

/// What the reporter gets back once the report is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub report_id: String,
    pub reference_id: String,
    pub notice: String,
}

impl SubmissionReceipt {
    #[must_use]
    pub fn new(report_id: String, reference_id: String) -> Self {
        Self {
            report_id,
            reference_id,
            notice: RECEIPT_NOTICE.to_string(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate the report details.
///
/// Every missing required field is reported in one error.
pub fn validate_draft(input: ReportDraftInput) -> AppResult<ReportDraft> {
    let subject = non_blank(input.subject);
    let department = non_blank(input.department);
    let description = non_blank(input.description);

    let missing: Vec<&str> = [
        ("subject", subject.is_none()),
        ("department", department.is_none()),
        ("description", description.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, absent)| absent.then_some(field))
    .collect();

    let (Some(subject), Some(department), Some(description)) = (subject, department, description)
    else {
        return Err(AppError::Validation(format!(
            "missing required field(s): {}",
            missing.join(", ")
        )));
    };

    let department: Department = department
        .parse()
        .map_err(|e: whisper_db::entities::report::UnknownDepartment| {
            AppError::Validation(e.to_string())
        })?;

    let evidence_file = input.evidence_file.map(validate_evidence).transpose()?;

    Ok(ReportDraft {
        name: non_blank(input.name),
        subject,
        person_accused: non_blank(input.person_accused),
        department,
        description,
        evidence_text: non_blank(input.evidence_text),
        evidence_file,
        category: input.category.unwrap_or_default(),
    })
}

/// Decode and check an evidence file.
pub fn validate_evidence(input: EvidenceFileInput) -> AppResult<EvidenceFile> {
    let extension = input
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let Some((_, mime_types)) = EVIDENCE_TYPES.iter().find(|(ext, _)| *ext == extension) else {
        return Err(AppError::Validation(format!(
            "unsupported evidence file type: {}",
            input.file_name
        )));
    };

    let content_type = input.content_type.trim().to_ascii_lowercase();
    if !mime_types.contains(&content_type.as_str()) {
        return Err(AppError::Validation(format!(
            "content type {content_type} does not match .{extension}"
        )));
    }

    // Reject before decoding: base64 is 4 bytes per 3.
    if input.data_base64.len() > (MAX_EVIDENCE_BYTES / 3 + 1) * 4 {
        return Err(evidence_too_large());
    }

    let data = STANDARD
        .decode(input.data_base64.trim())
        .map_err(|e| AppError::Validation(format!("evidence file is not valid base64: {e}")))?;

    if data.is_empty() {
        return Err(AppError::Validation("evidence file is empty".to_string()));
    }
    if data.len() > MAX_EVIDENCE_BYTES {
        return Err(evidence_too_large());
    }

    Ok(EvidenceFile {
        extension,
        content_type,
        data,
    })
}

fn evidence_too_large() -> AppError {
    AppError::Validation(format!(
        "evidence file exceeds {} MiB",
        MAX_EVIDENCE_BYTES / (1024 * 1024)
    ))
}
