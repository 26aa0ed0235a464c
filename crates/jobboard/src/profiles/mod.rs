//! Job-seeker profiles: one per principal, owner-only mutation.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    JobSeekerProfile, ProfileDraft, ProfileId, ProfilePatch, ProfileValidationError,
};
pub use repository::ProfileRepository;
pub use router::{profile_router, ProfileGateway};
pub use service::{ProfileService, ProfileServiceError};
