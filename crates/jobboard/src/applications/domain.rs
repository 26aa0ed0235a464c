use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{PrincipalId, PrincipalIdentity};
use crate::jobs::domain::{Job, JobId};

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review status tracked through the application workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "pending" => Some(ApplicationStatus::Pending),
            "reviewed" => Some(ApplicationStatus::Reviewed),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Accepted | ApplicationStatus::Rejected)
    }

    /// The transition table. `accepted` and `rejected` are terminal; a
    /// pending application may be reviewed or decided directly.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        match self {
            ApplicationStatus::Pending => matches!(
                next,
                ApplicationStatus::Reviewed
                    | ApplicationStatus::Accepted
                    | ApplicationStatus::Rejected
            ),
            ApplicationStatus::Reviewed => matches!(
                next,
                ApplicationStatus::Accepted | ApplicationStatus::Rejected
            ),
            ApplicationStatus::Accepted | ApplicationStatus::Rejected => false,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reference returned by blob storage for an uploaded resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResume {
    pub id: String,
    pub url: String,
    pub name: String,
    pub mime: String,
}

/// An uploaded resume as handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOC_MIME: &str = "application/msword";

/// Accepted resume content types: pdf, doc, docx, and the generic binary
/// fallback some browsers send.
pub fn resume_mime_allowed(content_type: &str) -> bool {
    let Ok(parsed) = content_type.parse::<mime::Mime>() else {
        return false;
    };

    parsed == mime::APPLICATION_PDF
        || parsed == mime::APPLICATION_OCTET_STREAM
        || parsed.essence_str() == DOC_MIME
        || parsed.essence_str() == DOCX_MIME
}

/// Storage-layer record for an application. The `job` relation is optional
/// here because the backing store has been observed to drop it on insert; the
/// service verifies and repairs it, and the domain invariant is that it is
/// always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub job: Option<JobId>,
    pub applicant: PrincipalId,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume: StoredResume,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalized submission payload assembled by the transport layer.
#[derive(Debug, Clone)]
pub struct SubmitApplication {
    pub job: JobId,
    pub cover_letter: Option<String>,
    pub resume: ResumeUpload,
}

/// Denormalized job data carried on listing/read views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub expired_at: DateTime<Utc>,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            company_name: job.company_name.clone(),
            location: job.location.clone(),
            expired_at: job.expired_at,
        }
    }
}

/// Resume link exposed on views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeLink {
    pub url: String,
    pub name: String,
}

/// What callers see when listing or reading applications: the record plus
/// enough job/applicant/resume data for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<JobSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant: Option<PrincipalIdentity>,
    pub resume: ResumeLink,
    pub submitted_at: DateTime<Utc>,
}

/// Validation errors raised before any mutation happens.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationValidationError {
    #[error("a resume file is required")]
    MissingResume,
    #[error("unsupported resume type: {0}")]
    UnsupportedResumeType(String),
    #[error("invalid application status: {0}")]
    InvalidStatus(String),
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("this job posting has expired")]
    JobExpired,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_may_move_to_any_decision() {
        for next in [
            ApplicationStatus::Reviewed,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
        ] {
            assert!(ApplicationStatus::Pending.can_transition_to(next));
        }
        assert!(!ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Pending));
    }

    #[test]
    fn reviewed_may_only_be_decided() {
        assert!(ApplicationStatus::Reviewed.can_transition_to(ApplicationStatus::Accepted));
        assert!(ApplicationStatus::Reviewed.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Reviewed.can_transition_to(ApplicationStatus::Pending));
        assert!(!ApplicationStatus::Reviewed.can_transition_to(ApplicationStatus::Reviewed));
    }

    #[test]
    fn terminal_statuses_reject_everything() {
        for terminal in [ApplicationStatus::Accepted, ApplicationStatus::Rejected] {
            assert!(terminal.is_terminal());
            for next in [
                ApplicationStatus::Pending,
                ApplicationStatus::Reviewed,
                ApplicationStatus::Accepted,
                ApplicationStatus::Rejected,
            ] {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn status_labels_round_trip() {
        for status in [
            ApplicationStatus::Pending,
            ApplicationStatus::Reviewed,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
        ] {
            assert_eq!(ApplicationStatus::parse(status.label()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse("withdrawn"), None);
    }

    #[test]
    fn resume_mime_gate_accepts_documents_only() {
        assert!(resume_mime_allowed("application/pdf"));
        assert!(resume_mime_allowed("application/msword"));
        assert!(resume_mime_allowed(
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        ));
        assert!(resume_mime_allowed("application/octet-stream"));
        assert!(!resume_mime_allowed("image/png"));
        assert!(!resume_mime_allowed("text/html"));
        assert!(!resume_mime_allowed("not a mime"));
    }
}
