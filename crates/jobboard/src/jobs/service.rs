use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{Job, JobDraft, JobId, JobPatch, JobValidationError};
use super::domain::{DEFAULT_INDUSTRY, DEFAULT_REQUIREMENTS};
use super::repository::JobRepository;
use crate::applications::domain::ApplicationId;
use crate::applications::repository::ApplicationRepository;
use crate::identity::Principal;
use crate::policy::{self, Decision, JobAction, JobScope};
use crate::store::{Page, RepositoryError};

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

/// Service owning the job posting lifecycle: idempotent creation, scoped
/// listing, ownership-checked mutation, and cascading deletion.
pub struct JobService<J, A> {
    jobs: Arc<J>,
    applications: Arc<A>,
    page_size: u32,
}

impl<J, A> JobService<J, A>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(jobs: Arc<J>, applications: Arc<A>, page_size: u32) -> Self {
        Self {
            jobs,
            applications,
            page_size,
        }
    }

    /// Create a posting, collapsing duplicate submissions that carry the same
    /// request id. The lookup-then-insert pair is not atomic; two
    /// near-simultaneous requests with one request id can both pass the
    /// lookup. The backing store is expected to serialize the pair.
    pub fn create(&self, principal: &Principal, draft: JobDraft) -> Result<Job, JobServiceError> {
        if !policy::can_post_jobs(principal.role) {
            return Err(JobServiceError::Forbidden);
        }

        let draft = draft.validate()?;
        let request_id = draft
            .request_id
            .clone()
            .unwrap_or_else(|| Utc::now().timestamp_millis().to_string());

        if let Some(existing) = self.jobs.find_by_request_id(&request_id)? {
            info!(job = %existing.id, %request_id, "duplicate create request, returning existing job");
            return Ok(existing);
        }

        let now = Utc::now();
        let job = Job {
            id: next_job_id(),
            title: draft.title,
            description: draft.description,
            requirements: draft
                .requirements
                .unwrap_or_else(|| DEFAULT_REQUIREMENTS.to_string()),
            salary: draft.salary,
            location: draft.location,
            job_type: draft.job_type,
            experience_level: draft.experience_level,
            company_name: draft.company_name,
            industry: draft
                .industry
                .unwrap_or_else(|| DEFAULT_INDUSTRY.to_string()),
            expired_at: draft.expired_at,
            owner: principal.id.clone(),
            request_id,
            created_at: now,
            updated_at: now,
        };

        Ok(self.jobs.insert(job)?)
    }

    /// Scoped listing. Never fails on an empty catalog.
    pub fn list(
        &self,
        principal: &Principal,
        page: Option<u32>,
    ) -> Result<Page<Job>, JobServiceError> {
        let jobs = match policy::job_listing_scope(principal) {
            JobScope::OwnedBy(owner) => self.jobs.list_by_owner(&owner)?,
            JobScope::All => self.jobs.list_all()?,
        };

        Ok(Page::slice(jobs, page.unwrap_or(1), self.page_size))
    }

    pub fn get(&self, principal: &Principal, id: &JobId) -> Result<Job, JobServiceError> {
        let job = self.jobs.fetch(id)?.ok_or(JobServiceError::NotFound)?;

        match policy::authorize_job(principal, &job.owner, JobAction::View) {
            Decision::Allow => Ok(job),
            Decision::Deny => Err(JobServiceError::Forbidden),
        }
    }

    pub fn update(
        &self,
        principal: &Principal,
        id: &JobId,
        patch: JobPatch,
    ) -> Result<Job, JobServiceError> {
        if !policy::can_post_jobs(principal.role) {
            return Err(JobServiceError::Forbidden);
        }

        let mut job = self.jobs.fetch(id)?.ok_or(JobServiceError::NotFound)?;

        if !policy::authorize_job(principal, &job.owner, JobAction::Update).is_allow() {
            return Err(JobServiceError::Forbidden);
        }

        patch.apply(&mut job, Utc::now())?;
        Ok(self.jobs.update(job)?)
    }

    /// Delete a posting and every application referencing it. Dependents go
    /// first; the first dependent failure aborts the whole operation and
    /// leaves the posting intact.
    pub fn delete(&self, principal: &Principal, id: &JobId) -> Result<Job, JobServiceError> {
        if !policy::can_post_jobs(principal.role) {
            return Err(JobServiceError::Forbidden);
        }

        let job = self.jobs.fetch(id)?.ok_or(JobServiceError::NotFound)?;

        if !policy::authorize_job(principal, &job.owner, JobAction::Delete).is_allow() {
            return Err(JobServiceError::Forbidden);
        }

        let dependents = self.applications.list_by_job(id)?;
        for application in dependents {
            self.applications.delete(&application.id).map_err(|source| {
                JobServiceError::CascadeFailed {
                    job: id.clone(),
                    application: application.id.clone(),
                    source,
                }
            })?;
            debug!(job = %id, application = %application.id, "cascaded application delete");
        }

        let deleted = self.jobs.delete(id)?;
        info!(job = %id, "job deleted");
        Ok(deleted)
    }
}

/// Error raised by the job service.
#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("you do not have permission to perform this action on this job")]
    Forbidden,
    #[error("job not found")]
    NotFound,
    #[error(transparent)]
    Validation(#[from] JobValidationError),
    #[error("failed to delete application {application} while removing job {job}")]
    CascadeFailed {
        job: JobId,
        application: ApplicationId,
        source: RepositoryError,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
