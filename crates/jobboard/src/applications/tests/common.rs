use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use serde_json::Value;

use crate::applications::domain::{
    ApplicationId, ApplicationRecord, ResumeUpload, StoredResume, SubmitApplication,
};
use crate::applications::repository::{
    ApplicationRepository, PopulatedApplication, ResumeStorage, StorageError,
};
use crate::applications::service::ApplicationService;
use crate::identity::{
    AuthenticatedUser, IdentityError, IdentityProvider, Principal, PrincipalId,
    PrincipalIdentity, Role,
};
use crate::jobs::domain::{ExperienceLevel, Job, JobId, JobType};
use crate::jobs::repository::JobRepository;
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

pub(super) fn admin(id: &str) -> Principal {
    Principal {
        id: PrincipalId(id.to_string()),
        role: Role::Admin,
    }
}

pub(super) fn job_owned_by(owner: &str) -> Job {
    static SEQUENCE: AtomicU64 = AtomicU64::new(1);
    let id = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let now = Utc::now();
    Job {
        id: JobId(format!("test-job-{id:03}")),
        title: "Backend Engineer".to_string(),
        description: "Build and run the job-board services".to_string(),
        requirements: "Rust experience".to_string(),
        salary: 120_000.0,
        location: "Remote".to_string(),
        job_type: JobType::FullTime,
        experience_level: ExperienceLevel::Mid,
        company_name: "Acme".to_string(),
        industry: "Technology".to_string(),
        expired_at: now + Duration::days(30),
        owner: PrincipalId(owner.to_string()),
        request_id: format!("req-{id}"),
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn pdf_resume() -> ResumeUpload {
    ResumeUpload {
        file_name: "resume.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        bytes: b"%PDF-1.4 fake".to_vec(),
    }
}

pub(super) fn submission_for(job: &JobId) -> SubmitApplication {
    SubmitApplication {
        job: job.clone(),
        cover_letter: Some("I am interested".to_string()),
        resume: pdf_resume(),
    }
}

/// Shared in-memory backend implementing both repository traits, so the
/// owner-scoped application queries can join against the job table the same
/// way the real store would.
#[derive(Default)]
pub(super) struct MemoryBackend {
    jobs: Mutex<HashMap<JobId, Job>>,
    records: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
    identities: Mutex<HashMap<PrincipalId, PrincipalIdentity>>,
    /// When set, population queries return records without their job
    /// relation resolved, mimicking the observed store failure.
    pub(super) skip_population: AtomicBool,
}

impl MemoryBackend {
    pub(super) fn seed_job(&self, job: Job) -> JobId {
        let id = job.id.clone();
        self.jobs
            .lock()
            .expect("job mutex poisoned")
            .insert(id.clone(), job);
        id
    }

    pub(super) fn seed_identity(&self, id: &str, username: &str, email: &str) {
        self.identities.lock().expect("identity mutex poisoned").insert(
            PrincipalId(id.to_string()),
            PrincipalIdentity {
                id: PrincipalId(id.to_string()),
                username: username.to_string(),
                email: email.to_string(),
            },
        );
    }

    fn populate(&self, record: ApplicationRecord) -> PopulatedApplication {
        let job = if self.skip_population.load(Ordering::Relaxed) {
            None
        } else {
            record.job.as_ref().and_then(|job_id| {
                self.jobs
                    .lock()
                    .expect("job mutex poisoned")
                    .get(job_id)
                    .cloned()
            })
        };
        let applicant = self
            .identities
            .lock()
            .expect("identity mutex poisoned")
            .get(&record.applicant)
            .cloned();
        PopulatedApplication {
            record,
            job,
            applicant,
        }
    }

    fn owner_of(&self, job_id: &JobId) -> Option<PrincipalId> {
        self.jobs
            .lock()
            .expect("job mutex poisoned")
            .get(job_id)
            .map(|job| job.owner.clone())
    }
}

impl JobRepository for MemoryBackend {
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
        Ok(guard.values().cloned().collect())
    }

    fn list_by_owner(&self, owner: &PrincipalId) -> Result<Vec<Job>, RepositoryError> {
        let guard = self.jobs.lock().expect("job mutex poisoned");
        Ok(guard
            .values()
            .filter(|job| &job.owner == owner)
            .cloned()
            .collect())
    }

    fn delete(&self, id: &JobId) -> Result<Job, RepositoryError> {
        let mut guard = self.jobs.lock().expect("job mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

impl ApplicationRepository for MemoryBackend {
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
        let record = {
            let guard = self.records.lock().expect("application mutex poisoned");
            guard.get(id).cloned()
        };
        Ok(record.map(|record| self.populate(record)))
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
        let records: Vec<ApplicationRecord> = {
            let guard = self.records.lock().expect("application mutex poisoned");
            guard.values().cloned().collect()
        };

        let mut selected = Vec::new();
        for record in records {
            let keep = match scope {
                ApplicationScope::ByApplicant(applicant) => &record.applicant == applicant,
                ApplicationScope::ByJobOwner(owner) => record
                    .job
                    .as_ref()
                    .and_then(|job_id| self.owner_of(job_id))
                    .as_ref()
                    == Some(owner),
                ApplicationScope::All => true,
            };
            if keep {
                selected.push(self.populate(record));
            }
        }
        Ok(selected)
    }

    fn delete(&self, id: &ApplicationId) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

/// Wrapper that drops the job relation on insert (and optionally on update)
/// to exercise the verification/repair path.
pub(super) struct RelationDroppingBackend {
    pub(super) inner: Arc<MemoryBackend>,
    pub(super) drop_on_update: bool,
}

impl ApplicationRepository for RelationDroppingBackend {
    fn insert(&self, mut record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        record.job = None;
        ApplicationRepository::insert(&*self.inner, record)
    }

    fn update(&self, mut record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        if self.drop_on_update {
            record.job = None;
        }
        ApplicationRepository::update(&*self.inner, record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        ApplicationRepository::fetch(&*self.inner, id)
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

    fn delete(&self, id: &ApplicationId) -> Result<ApplicationRecord, RepositoryError> {
        ApplicationRepository::delete(&*self.inner, id)
    }
}

#[derive(Default)]
pub(super) struct MemoryResumes {
    sequence: AtomicU64,
}

impl ResumeStorage for MemoryResumes {
    fn upload(&self, upload: &ResumeUpload) -> Result<StoredResume, StorageError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(StoredResume {
            id: format!("file-{id:04}"),
            url: format!("/uploads/file-{id:04}"),
            name: upload.file_name.clone(),
            mime: upload.content_type.clone(),
        })
    }
}

pub(super) struct FailingResumes;

impl ResumeStorage for FailingResumes {
    fn upload(&self, _upload: &ResumeUpload) -> Result<StoredResume, StorageError> {
        Err(StorageError::Upload("bucket offline".to_string()))
    }
}

pub(super) struct EmptyReferenceResumes;

impl ResumeStorage for EmptyReferenceResumes {
    fn upload(&self, upload: &ResumeUpload) -> Result<StoredResume, StorageError> {
        Ok(StoredResume {
            id: String::new(),
            url: String::new(),
            name: upload.file_name.clone(),
            mime: upload.content_type.clone(),
        })
    }
}

/// Static token table standing in for the external auth provider.
#[derive(Default)]
pub(super) struct MemoryIdentity {
    tokens: Mutex<HashMap<String, AuthenticatedUser>>,
}

impl MemoryIdentity {
    pub(super) fn with_token(self, token: &str, id: &str, raw_role: Option<&str>) -> Self {
        self.tokens.lock().expect("token mutex poisoned").insert(
            token.to_string(),
            AuthenticatedUser {
                id: PrincipalId(id.to_string()),
                username: id.to_string(),
                email: format!("{id}@example.com"),
                raw_role: raw_role.map(str::to_string),
            },
        );
        self
    }
}

impl IdentityProvider for MemoryIdentity {
    fn authenticate(&self, token: &str) -> Result<Option<AuthenticatedUser>, IdentityError> {
        let guard = self.tokens.lock().expect("token mutex poisoned");
        Ok(guard.get(token).cloned())
    }
}

pub(super) fn build_service(
    backend: Arc<MemoryBackend>,
) -> ApplicationService<MemoryBackend, MemoryBackend, MemoryResumes> {
    ApplicationService::new(backend.clone(), backend, Arc::new(MemoryResumes::default()))
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
