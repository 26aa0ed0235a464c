use super::domain::{JobSeekerProfile, ProfileId};
use crate::identity::PrincipalId;
use crate::store::RepositoryError;

/// Storage abstraction for job-seeker profiles.
pub trait ProfileRepository: Send + Sync {
    fn insert(&self, profile: JobSeekerProfile) -> Result<JobSeekerProfile, RepositoryError>;
    fn update(&self, profile: JobSeekerProfile) -> Result<JobSeekerProfile, RepositoryError>;
    fn fetch(&self, id: &ProfileId) -> Result<Option<JobSeekerProfile>, RepositoryError>;
    fn find_by_owner(
        &self,
        owner: &PrincipalId,
    ) -> Result<Option<JobSeekerProfile>, RepositoryError>;
    fn delete(&self, id: &ProfileId) -> Result<JobSeekerProfile, RepositoryError>;
}
