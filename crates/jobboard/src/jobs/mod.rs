//! Job posting lifecycle: idempotent creation, ownership-scoped reads,
//! updates, and cascading deletion.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ExperienceLevel, Job, JobDraft, JobId, JobPatch, JobType, JobValidationError,
    DEFAULT_INDUSTRY, DEFAULT_REQUIREMENTS,
};
pub use repository::JobRepository;
pub use router::{job_router, JobGateway};
pub use service::{JobService, JobServiceError};
