use super::domain::{ApplicationId, ApplicationRecord, ResumeUpload, StoredResume};
use crate::identity::{PrincipalId, PrincipalIdentity};
use crate::jobs::domain::{Job, JobId};
use crate::policy::ApplicationScope;
use crate::store::RepositoryError;

/// A record with its relations populated, as far as the store managed to.
/// `job` may come back `None` even when the record carries a job id; the
/// service patches that hole by re-fetching the job directly.
#[derive(Debug, Clone)]
pub struct PopulatedApplication {
    pub record: ApplicationRecord,
    pub job: Option<Job>,
    pub applicant: Option<PrincipalIdentity>,
}

/// Storage abstraction for applications. Relational queries (duplicate
/// lookup, owner-scoped listing, population) are pushed down to the store.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn fetch_populated(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<PopulatedApplication>, RepositoryError>;
    /// Duplicate guard: at most one non-deleted application per
    /// `(job, applicant)` pair.
    fn find_by_job_and_applicant(
        &self,
        job: &JobId,
        applicant: &PrincipalId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn list_by_job(&self, job: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn list_populated(
        &self,
        scope: &ApplicationScope,
    ) -> Result<Vec<PopulatedApplication>, RepositoryError>;
    fn delete(&self, id: &ApplicationId) -> Result<ApplicationRecord, RepositoryError>;
}

/// Blob-storage seam for uploaded resumes.
pub trait ResumeStorage: Send + Sync {
    fn upload(&self, upload: &ResumeUpload) -> Result<StoredResume, StorageError>;
}

/// Resume upload failure.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("resume upload failed: {0}")]
    Upload(String),
    #[error("storage returned no file reference")]
    MissingReference,
}
