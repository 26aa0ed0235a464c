//! Application lifecycle: submission with resume upload, the review status
//! state machine, scoped listing with denormalized job data, and deletion.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    resume_mime_allowed, ApplicationId, ApplicationRecord, ApplicationStatus,
    ApplicationValidationError, ApplicationView, JobSummary, ResumeLink, ResumeUpload,
    StoredResume, SubmitApplication,
};
pub use repository::{
    ApplicationRepository, PopulatedApplication, ResumeStorage, StorageError,
};
pub use router::{application_router, ApplicationGateway};
pub use service::{ApplicationService, ApplicationServiceError};
