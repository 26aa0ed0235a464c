use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use jobboard::applications::domain::{ApplicationId, ApplicationRecord, ResumeUpload, StoredResume};
use jobboard::applications::repository::{
    ApplicationRepository, PopulatedApplication, ResumeStorage, StorageError,
};
use jobboard::identity::{
    AuthenticatedUser, IdentityError, IdentityProvider, PrincipalId, PrincipalIdentity,
};
use jobboard::jobs::domain::{Job, JobId};
use jobboard::jobs::repository::JobRepository;
use jobboard::policy::ApplicationScope;
use jobboard::profiles::domain::{JobSeekerProfile, ProfileId};
use jobboard::profiles::repository::ProfileRepository;
use jobboard::store::RepositoryError;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory entity store backing the service in development and demos. One
/// struct implements every repository trait so relational queries (owner
/// scoping, relation population) can join across tables under one lock
/// discipline, the way the real store would.
#[derive(Default)]
pub(crate) struct InMemoryBackend {
    jobs: Mutex<HashMap<JobId, Job>>,
    applications: Mutex<HashMap<ApplicationId, ApplicationRecord>>,
    profiles: Mutex<HashMap<ProfileId, JobSeekerProfile>>,
    accounts: Mutex<HashMap<String, AuthenticatedUser>>,
}

impl InMemoryBackend {
    /// Register a principal with a fixed bearer token. Token issuance is the
    /// external auth provider's job; this stands in for it locally.
    pub(crate) fn register_account(
        &self,
        token: &str,
        id: &str,
        username: &str,
        email: &str,
        raw_role: &str,
    ) {
        self.accounts.lock().expect("account mutex poisoned").insert(
            token.to_string(),
            AuthenticatedUser {
                id: PrincipalId(id.to_string()),
                username: username.to_string(),
                email: email.to_string(),
                raw_role: Some(raw_role.to_string()),
            },
        );
    }

    fn identity_of(&self, id: &PrincipalId) -> Option<PrincipalIdentity> {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        guard
            .values()
            .find(|user| &user.id == id)
            .map(AuthenticatedUser::identity)
    }

    fn populate(&self, record: ApplicationRecord) -> PopulatedApplication {
        let job = record.job.as_ref().and_then(|job_id| {
            self.jobs
                .lock()
                .expect("job mutex poisoned")
                .get(job_id)
                .cloned()
        });
        let applicant = self.identity_of(&record.applicant);
        PopulatedApplication {
            record,
            job,
            applicant,
        }
    }

    fn job_owner(&self, job_id: &JobId) -> Option<PrincipalId> {
        self.jobs
            .lock()
            .expect("job mutex poisoned")
            .get(job_id)
            .map(|job| job.owner.clone())
    }
}

impl IdentityProvider for InMemoryBackend {
    fn authenticate(&self, token: &str) -> Result<Option<AuthenticatedUser>, IdentityError> {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        Ok(guard.get(token).cloned())
    }
}

impl JobRepository for InMemoryBackend {
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
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.0.cmp(&b.id.0)));
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
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.0.cmp(&b.id.0)));
        Ok(jobs)
    }

    fn delete(&self, id: &JobId) -> Result<Job, RepositoryError> {
        let mut guard = self.jobs.lock().expect("job mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

impl ApplicationRepository for InMemoryBackend {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.applications.lock().expect("application mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.applications.lock().expect("application mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.applications.lock().expect("application mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn fetch_populated(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<PopulatedApplication>, RepositoryError> {
        let record = {
            let guard = self.applications.lock().expect("application mutex poisoned");
            guard.get(id).cloned()
        };
        Ok(record.map(|record| self.populate(record)))
    }

    fn find_by_job_and_applicant(
        &self,
        job: &JobId,
        applicant: &PrincipalId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.applications.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .find(|record| record.job.as_ref() == Some(job) && &record.applicant == applicant)
            .cloned())
    }

    fn list_by_job(&self, job: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.applications.lock().expect("application mutex poisoned");
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
            let guard = self.applications.lock().expect("application mutex poisoned");
            guard.values().cloned().collect()
        };

        let mut selected = Vec::new();
        for record in records {
            let keep = match scope {
                ApplicationScope::ByApplicant(applicant) => &record.applicant == applicant,
                ApplicationScope::ByJobOwner(owner) => record
                    .job
                    .as_ref()
                    .and_then(|job_id| self.job_owner(job_id))
                    .as_ref()
                    == Some(owner),
                ApplicationScope::All => true,
            };
            if keep {
                selected.push(self.populate(record));
            }
        }
        selected.sort_by(|a, b| a.record.created_at.cmp(&b.record.created_at));
        Ok(selected)
    }

    fn delete(&self, id: &ApplicationId) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.applications.lock().expect("application mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

impl ProfileRepository for InMemoryBackend {
    fn insert(&self, profile: JobSeekerProfile) -> Result<JobSeekerProfile, RepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        if guard.contains_key(&profile.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn update(&self, profile: JobSeekerProfile) -> Result<JobSeekerProfile, RepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        if !guard.contains_key(&profile.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<JobSeekerProfile>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_owner(
        &self,
        owner: &PrincipalId,
    ) -> Result<Option<JobSeekerProfile>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard
            .values()
            .find(|profile| &profile.owner == owner)
            .cloned())
    }

    fn delete(&self, id: &ProfileId) -> Result<JobSeekerProfile, RepositoryError> {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        guard.remove(id).ok_or(RepositoryError::NotFound)
    }
}

/// In-memory stand-in for the blob store; keeps uploads addressable by a
/// generated file id.
#[derive(Default)]
pub(crate) struct InMemoryResumeStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    sequence: AtomicU64,
}

impl InMemoryResumeStorage {
    pub(crate) fn file_count(&self) -> usize {
        self.files.lock().expect("storage mutex poisoned").len()
    }
}

impl ResumeStorage for InMemoryResumeStorage {
    fn upload(&self, upload: &ResumeUpload) -> Result<StoredResume, StorageError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let file_id = format!("file-{id:06}");
        self.files
            .lock()
            .map_err(|_| StorageError::Upload("storage lock poisoned".to_string()))?
            .insert(file_id.clone(), upload.bytes.clone());

        Ok(StoredResume {
            id: file_id.clone(),
            url: format!("/uploads/{file_id}/{}", upload.file_name),
            name: upload.file_name.clone(),
            mime: upload.content_type.clone(),
        })
    }
}
