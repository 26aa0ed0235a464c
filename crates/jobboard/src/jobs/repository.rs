use super::domain::{Job, JobId};
use crate::identity::PrincipalId;
use crate::store::RepositoryError;

/// Storage abstraction for job postings so the service module can be
/// exercised in isolation.
pub trait JobRepository: Send + Sync {
    fn insert(&self, job: Job) -> Result<Job, RepositoryError>;
    fn update(&self, job: Job) -> Result<Job, RepositoryError>;
    fn fetch(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    /// Idempotency lookup: at most one non-deleted job carries a request id.
    fn find_by_request_id(&self, request_id: &str) -> Result<Option<Job>, RepositoryError>;
    fn list_all(&self) -> Result<Vec<Job>, RepositoryError>;
    fn list_by_owner(&self, owner: &PrincipalId) -> Result<Vec<Job>, RepositoryError>;
    fn delete(&self, id: &JobId) -> Result<Job, RepositoryError>;
}
