use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{JobSeekerProfile, ProfileDraft, ProfileId, ProfilePatch, ProfileValidationError};
use super::repository::ProfileRepository;
use crate::identity::Principal;
use crate::policy::{self, ProfileAction};
use crate::store::RepositoryError;

static PROFILE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_profile_id() -> ProfileId {
    let id = PROFILE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ProfileId(format!("profile-{id:06}"))
}

/// Service owning the job-seeker profile lifecycle.
pub struct ProfileService<P> {
    profiles: Arc<P>,
}

impl<P> ProfileService<P>
where
    P: ProfileRepository + 'static,
{
    pub fn new(profiles: Arc<P>) -> Self {
        Self { profiles }
    }

    pub fn create(
        &self,
        principal: &Principal,
        draft: ProfileDraft,
    ) -> Result<JobSeekerProfile, ProfileServiceError> {
        if !policy::can_apply(principal.role) {
            return Err(ProfileServiceError::Forbidden);
        }

        let draft = draft.validate()?;

        if self.profiles.find_by_owner(&principal.id)?.is_some() {
            return Err(ProfileServiceError::AlreadyExists);
        }

        let now = Utc::now();
        let profile = JobSeekerProfile {
            id: next_profile_id(),
            owner: principal.id.clone(),
            first_name: draft.first_name,
            last_name: draft.last_name,
            phone: draft.phone,
            skills: draft.skills,
            experience: draft.experience,
            education: draft.education,
            created_at: now,
            updated_at: now,
        };

        Ok(self.profiles.insert(profile)?)
    }

    pub fn get_own(&self, principal: &Principal) -> Result<JobSeekerProfile, ProfileServiceError> {
        self.profiles
            .find_by_owner(&principal.id)?
            .ok_or(ProfileServiceError::NotFound)
    }

    pub fn get(
        &self,
        principal: &Principal,
        id: &ProfileId,
    ) -> Result<JobSeekerProfile, ProfileServiceError> {
        let profile = self.profiles.fetch(id)?.ok_or(ProfileServiceError::NotFound)?;

        if !policy::authorize_profile(principal, &profile.owner, ProfileAction::View).is_allow() {
            return Err(ProfileServiceError::Forbidden);
        }
        Ok(profile)
    }

    pub fn update(
        &self,
        principal: &Principal,
        id: &ProfileId,
        patch: ProfilePatch,
    ) -> Result<JobSeekerProfile, ProfileServiceError> {
        let mut profile = self.profiles.fetch(id)?.ok_or(ProfileServiceError::NotFound)?;

        if !policy::authorize_profile(principal, &profile.owner, ProfileAction::Update).is_allow() {
            return Err(ProfileServiceError::Forbidden);
        }

        patch.apply(&mut profile, Utc::now());
        Ok(self.profiles.update(profile)?)
    }

    pub fn delete(
        &self,
        principal: &Principal,
        id: &ProfileId,
    ) -> Result<JobSeekerProfile, ProfileServiceError> {
        let profile = self.profiles.fetch(id)?.ok_or(ProfileServiceError::NotFound)?;

        if !policy::authorize_profile(principal, &profile.owner, ProfileAction::Delete).is_allow() {
            return Err(ProfileServiceError::Forbidden);
        }

        Ok(self.profiles.delete(id)?)
    }
}

/// Error raised by the profile service.
#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    #[error("you do not have permission to perform this action on this profile")]
    Forbidden,
    #[error("profile not found")]
    NotFound,
    #[error("a profile already exists for this account")]
    AlreadyExists,
    #[error(transparent)]
    Validation(#[from] ProfileValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
