use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use crate::applications::domain::{
    ApplicationId, ApplicationRecord, ApplicationStatus, StoredResume,
};
use crate::applications::repository::{ApplicationRepository, PopulatedApplication};
use crate::identity::{Principal, PrincipalId, Role};
use crate::jobs::domain::{Job, JobDraft, JobId};
use crate::jobs::repository::JobRepository;
use crate::jobs::service::JobService;
use crate::policy::ApplicationScope;
use crate::store::RepositoryError;

pub(super) fn employer(id: &str) -> Principal {
    Principal {
        id: PrincipalId(id.to_string()),
        role: Role::Employer,
    }
}

pub(super) fn seeker(id: &str) -> Principal {
    Principal {
        id: PrincipalId(id.to_string()),
        role: Role::JobSeeker,
    }
}

pub(super) fn draft() -> JobDraft {
    JobDraft {
        title: Some("Backend Engineer".to_string()),
        description: Some("Build and run the job-board services".to_string()),
        requirements: None,
        salary: Some(120_000.0),
        location: Some("Remote".to_string()),
        job_type: Some("full-time".to_string()),
        experience_level: Some("mid".to_string()),
        company_name: Some("Acme".to_string()),
        industry: None,
        expired_at: Some(Utc::now() + Duration::days(30)),
        request_id: None,
    }
}

pub(super) fn application_for(job: &JobId, applicant: &str) -> ApplicationRecord {
    let now = Utc::now();
    ApplicationRecord {
        id: ApplicationId(format!("test-app-{}-{}", job.0, applicant)),
        job: Some(job.clone()),
        applicant: PrincipalId(applicant.to_string()),
        status: ApplicationStatus::Pending,
        cover_letter: Some("I am interested".to_string()),
        resume: StoredResume {
            id: "file-1".to_string(),
            url: "/uploads/file-1".to_string(),
            name: "resume.pdf".to_string(),
            mime: "application/pdf".to_string(),
        },
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn build_service(
    page_size: u32,
) -> (
    JobService<MemoryJobs, MemoryApplications>,
    Arc<MemoryJobs>,
    Arc<MemoryApplications>,
) {
    let jobs = Arc::new(MemoryJobs::default());
    let applications = Arc::new(MemoryApplications::default());
    let service = JobService::new(jobs.clone(), applications.clone(), page_size);
    (service, jobs, applications)
}

#[derive(Default, Clone)]
pub(super) struct MemoryJobs {
    jobs: Arc<Mutex<HashMap<JobId, Job>>>,
}

impl JobRepository for MemoryJobs {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = self.jobs.lock().expect("job mutex poisoned");
        if guard.contains_key(&job.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn update(&self, job: Job) -> Result<Job, RepositoryError> {
        let mut guard = self.jobs.lock().expect("job mutex poisoned");
        if !guard.contains_key(&job.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let guard = self.jobs.lock().expect("job mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_request_id(&self, request_id: &str) -> Result<Option<Job>, RepositoryError> {
        let guard = self.jobs.lock().expect("job mutex poisoned");
        Ok(guard
            .values()
            .find(|job| job.request_id == request_id)
            .cloned())
    }

    fn list_all(&self) -> Result<Vec<Job>, RepositoryError> {
        let guard = self.jobs.lock().expect("job mutex poisoned");
        let mut jobs: Vec<Job> = guard.values().cloned().collect();
        jobs.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(jobs)
    }

    fn list_by_owner(&self, owner: &PrincipalId) -> Result<Vec<Job>, RepositoryError> {
        let mut jobs: Vec<Job> = {
            let guard = self.jobs.lock().expect("job mutex poisoned");
            guard
                .values()
                .filter(|job| &job.owner == owner)
                .cloned()
                .collect()
        };
        jobs.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(jobs)
    }

    fn delete(&self, id: &JobId) -> Result<Job, RepositoryError> {
        let mut guard = self.jobs.lock().expect("job mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplications {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl MemoryApplications {
    pub(super) fn seed(&self, record: ApplicationRecord) {
        self.records
            .lock()
            .expect("application mutex poisoned")
            .insert(record.id.clone(), record);
    }
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_populated(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<PopulatedApplication>, RepositoryError> {
        Ok(self.fetch(id)?.map(|record| PopulatedApplication {
            record,
            job: None,
            applicant: None,
        }))
    }

    fn find_by_job_and_applicant(
        &self,
        job: &JobId,
        applicant: &PrincipalId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.job.as_ref() == Some(job) && &record.applicant == applicant)
            .cloned())
    }

    fn list_by_job(&self, job: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.job.as_ref() == Some(job))
            .cloned()
            .collect())
    }

    fn list_populated(
        &self,
        scope: &ApplicationScope,
    ) -> Result<Vec<PopulatedApplication>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        let records = guard.values().filter(|record| match scope {
            ApplicationScope::ByApplicant(applicant) => &record.applicant == applicant,
            ApplicationScope::ByJobOwner(_) => false,
            ApplicationScope::All => true,
        });
        Ok(records
            .cloned()
            .map(|record| PopulatedApplication {
                record,
                job: None,
                applicant: None,
            })
            .collect())
    }

    fn delete(&self, id: &ApplicationId) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

/// Delegates everything to the inner store but refuses deletes, for cascade
/// abort tests.
pub(super) struct UndeletableApplications {
    pub(super) inner: MemoryApplications,
}

impl ApplicationRepository for UndeletableApplications {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.update(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn fetch_populated(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<PopulatedApplication>, RepositoryError> {
        self.inner.fetch_populated(id)
    }

    fn find_by_job_and_applicant(
        &self,
        job: &JobId,
        applicant: &PrincipalId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.find_by_job_and_applicant(job, applicant)
    }

    fn list_by_job(&self, job: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.list_by_job(job)
    }

    fn list_populated(
        &self,
        scope: &ApplicationScope,
    ) -> Result<Vec<PopulatedApplication>, RepositoryError> {
        self.inner.list_populated(scope)
    }

    fn delete(&self, _id: &ApplicationId) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("deletes disabled".to_string()))
    }
}
