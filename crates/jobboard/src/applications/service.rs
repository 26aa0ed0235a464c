use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    resume_mime_allowed, ApplicationId, ApplicationRecord, ApplicationStatus,
    ApplicationValidationError, ApplicationView, JobSummary, ResumeLink, ResumeUpload,
    SubmitApplication,
};
use super::repository::{
    ApplicationRepository, PopulatedApplication, ResumeStorage, StorageError,
};
use crate::identity::Principal;
use crate::jobs::domain::JobId;
use crate::jobs::repository::JobRepository;
use crate::policy::{self, ApplicationAction};
use crate::store::RepositoryError;

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

/// Service owning the application lifecycle: submission with resume upload,
/// scoped listing with denormalized job data, status transitions, resume
/// replacement, and deletion.
pub struct ApplicationService<J, A, S> {
    jobs: Arc<J>,
    applications: Arc<A>,
    storage: Arc<S>,
}

impl<J, A, S> ApplicationService<J, A, S>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: ResumeStorage + 'static,
{
    pub fn new(jobs: Arc<J>, applications: Arc<A>, storage: Arc<S>) -> Self {
        Self {
            jobs,
            applications,
            storage,
        }
    }

    /// Submit an application. All checks run before the upload, and the
    /// upload runs before the insert, so a rejected submission leaves no
    /// partial state behind.
    pub fn submit(
        &self,
        principal: &Principal,
        submission: SubmitApplication,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        if !policy::can_apply(principal.role) {
            return Err(ApplicationServiceError::Forbidden);
        }

        let resume = &submission.resume;
        if resume.bytes.is_empty() {
            return Err(ApplicationValidationError::MissingResume.into());
        }
        if !resume_mime_allowed(&resume.content_type) {
            return Err(ApplicationValidationError::UnsupportedResumeType(
                resume.content_type.clone(),
            )
            .into());
        }

        let job = self
            .jobs
            .fetch(&submission.job)?
            .ok_or(ApplicationServiceError::JobNotFound)?;

        if job.is_expired(Utc::now()) {
            return Err(ApplicationValidationError::JobExpired.into());
        }

        if self
            .applications
            .find_by_job_and_applicant(&job.id, &principal.id)?
            .is_some()
        {
            return Err(ApplicationServiceError::AlreadyApplied);
        }

        let stored = self.storage.upload(resume)?;
        if stored.id.is_empty() {
            return Err(StorageError::MissingReference.into());
        }

        let now = Utc::now();
        let record = ApplicationRecord {
            id: next_application_id(),
            job: Some(job.id.clone()),
            applicant: principal.id.clone(),
            status: ApplicationStatus::Pending,
            cover_letter: submission.cover_letter,
            resume: stored,
            created_at: now,
            updated_at: now,
        };

        let inserted = self.applications.insert(record)?;
        info!(application = %inserted.id, job = %job.id, applicant = %principal.id, "application submitted");

        self.verify_job_relation(inserted, &job.id)
    }

    /// The backing store has been observed to drop the job relation on
    /// insert. Re-read the record, repair the relation once with an explicit
    /// update, and escalate if the repair did not stick.
    fn verify_job_relation(
        &self,
        inserted: ApplicationRecord,
        job: &JobId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let stored = match self.applications.fetch(&inserted.id)? {
            Some(stored) => stored,
            None => {
                return Err(ApplicationServiceError::Consistency { record: inserted });
            }
        };

        if stored.job.is_some() {
            return Ok(stored);
        }

        warn!(application = %stored.id, job = %job, "job relation missing after insert, repairing");

        let mut repaired = stored;
        repaired.job = Some(job.clone());
        repaired.updated_at = Utc::now();
        let repaired = self.applications.update(repaired)?;

        let verified = self
            .applications
            .fetch(&repaired.id)?
            .unwrap_or(repaired);

        if verified.job.is_some() {
            Ok(verified)
        } else {
            Err(ApplicationServiceError::Consistency { record: verified })
        }
    }

    /// Scoped listing with denormalized job, applicant, and resume data. A
    /// record whose job relation failed to populate gets the job re-fetched
    /// and patched in rather than returned with a hole.
    pub fn list(
        &self,
        principal: &Principal,
    ) -> Result<Vec<ApplicationView>, ApplicationServiceError> {
        let scope = policy::application_listing_scope(principal);
        let populated = self.applications.list_populated(&scope)?;

        let mut views = Vec::with_capacity(populated.len());
        for entry in populated {
            views.push(self.into_view(entry)?);
        }
        Ok(views)
    }

    pub fn get(
        &self,
        principal: &Principal,
        id: &ApplicationId,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let entry = self
            .applications
            .fetch_populated(id)?
            .ok_or(ApplicationServiceError::NotFound)?;

        let entry = self.patch_job_relation(entry)?;
        let job_owner = entry.job.as_ref().map(|job| &job.owner);

        if !policy::authorize_application(
            principal,
            &entry.record.applicant,
            job_owner,
            ApplicationAction::View,
        )
        .is_allow()
        {
            return Err(ApplicationServiceError::Forbidden);
        }

        self.into_view(entry)
    }

    /// Move an application through the review state machine. Only the
    /// employer owning the referenced job may transition it. No optimistic
    /// locking: concurrent transitions race and the last write wins.
    pub fn update_status(
        &self,
        principal: &Principal,
        id: &ApplicationId,
        raw_status: &str,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let next = ApplicationStatus::parse(raw_status).ok_or_else(|| {
            ApplicationValidationError::InvalidStatus(raw_status.to_string())
        })?;

        let entry = self
            .applications
            .fetch_populated(id)?
            .ok_or(ApplicationServiceError::NotFound)?;
        let entry = self.patch_job_relation(entry)?;
        let job_owner = entry.job.as_ref().map(|job| &job.owner);

        if !policy::authorize_application(
            principal,
            &entry.record.applicant,
            job_owner,
            ApplicationAction::TransitionStatus,
        )
        .is_allow()
        {
            return Err(ApplicationServiceError::Forbidden);
        }

        let current = entry.record.status;
        if !current.can_transition_to(next) {
            return Err(ApplicationValidationError::InvalidTransition {
                from: current,
                to: next,
            }
            .into());
        }

        let mut record = entry.record;
        record.status = next;
        record.updated_at = Utc::now();
        let updated = self.applications.update(record)?;
        info!(application = %updated.id, from = %current, to = %next, "application status updated");
        Ok(updated)
    }

    /// Replace the stored resume. Only the resume reference changes; status
    /// and cover letter are untouched.
    pub fn update_resume(
        &self,
        principal: &Principal,
        id: &ApplicationId,
        upload: ResumeUpload,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self
            .applications
            .fetch(id)?
            .ok_or(ApplicationServiceError::NotFound)?;

        if !policy::authorize_application(
            principal,
            &record.applicant,
            None,
            ApplicationAction::ReplaceResume,
        )
        .is_allow()
        {
            return Err(ApplicationServiceError::Forbidden);
        }

        if upload.bytes.is_empty() {
            return Err(ApplicationValidationError::MissingResume.into());
        }
        if !resume_mime_allowed(&upload.content_type) {
            return Err(ApplicationValidationError::UnsupportedResumeType(
                upload.content_type.clone(),
            )
            .into());
        }

        let stored = self.storage.upload(&upload)?;
        if stored.id.is_empty() {
            return Err(StorageError::MissingReference.into());
        }

        let mut record = record;
        record.resume = stored;
        record.updated_at = Utc::now();
        Ok(self.applications.update(record)?)
    }

    /// Deletion is open to the applicant, the job-owning employer, and
    /// admins.
    pub fn delete(
        &self,
        principal: &Principal,
        id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let entry = self
            .applications
            .fetch_populated(id)?
            .ok_or(ApplicationServiceError::NotFound)?;
        let entry = self.patch_job_relation(entry)?;
        let job_owner = entry.job.as_ref().map(|job| &job.owner);

        if !policy::authorize_application(
            principal,
            &entry.record.applicant,
            job_owner,
            ApplicationAction::Delete,
        )
        .is_allow()
        {
            return Err(ApplicationServiceError::Forbidden);
        }

        Ok(self.applications.delete(id)?)
    }

    /// Re-fetch the job when population came back empty for a record that
    /// does carry the relation.
    fn patch_job_relation(
        &self,
        mut entry: PopulatedApplication,
    ) -> Result<PopulatedApplication, ApplicationServiceError> {
        if entry.job.is_none() {
            if let Some(job_id) = entry.record.job.clone() {
                entry.job = self.jobs.fetch(&job_id)?;
                if entry.job.is_none() {
                    warn!(application = %entry.record.id, job = %job_id, "job relation present but job record missing");
                }
            }
        }
        Ok(entry)
    }

    fn into_view(
        &self,
        entry: PopulatedApplication,
    ) -> Result<ApplicationView, ApplicationServiceError> {
        let entry = self.patch_job_relation(entry)?;
        let record = entry.record;

        Ok(ApplicationView {
            id: record.id,
            status: record.status,
            cover_letter: record.cover_letter,
            job: entry.job.as_ref().map(JobSummary::from),
            applicant: entry.applicant,
            resume: ResumeLink {
                url: record.resume.url,
                name: record.resume.name,
            },
            submitted_at: record.created_at,
        })
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("you do not have permission to perform this action on this application")]
    Forbidden,
    #[error("job not found")]
    JobNotFound,
    #[error("application not found")]
    NotFound,
    #[error("you have already applied for this job")]
    AlreadyApplied,
    #[error(transparent)]
    Validation(#[from] ApplicationValidationError),
    #[error(transparent)]
    Upload(#[from] StorageError),
    #[error("application {} lost its job relation and automatic repair failed", .record.id)]
    Consistency { record: ApplicationRecord },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
