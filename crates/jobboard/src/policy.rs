//! Pure authorization decisions.
//!
//! Every allow/deny rule the lifecycle managers enforce lives here, as
//! side-effect-free functions over resolved principals. Managers translate a
//! [`Decision::Deny`] into their own `Forbidden` error.

use crate::identity::{Principal, PrincipalId, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allow(self) -> bool {
        matches!(self, Decision::Allow)
    }

    fn from_bool(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    View,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationAction {
    View,
    TransitionStatus,
    ReplaceResume,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAction {
    View,
    Update,
    Delete,
}

/// Which jobs a listing returns for the given principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobScope {
    OwnedBy(PrincipalId),
    All,
}

/// Which applications a listing returns for the given principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationScope {
    ByApplicant(PrincipalId),
    ByJobOwner(PrincipalId),
    All,
}

pub fn can_post_jobs(role: Role) -> bool {
    matches!(role, Role::Employer)
}

pub fn can_apply(role: Role) -> bool {
    matches!(role, Role::JobSeeker)
}

/// Employers see only their own postings; job seekers and admins browse the
/// full catalog.
pub fn job_listing_scope(principal: &Principal) -> JobScope {
    match principal.role {
        Role::Employer => JobScope::OwnedBy(principal.id.clone()),
        Role::JobSeeker | Role::Admin => JobScope::All,
    }
}

pub fn application_listing_scope(principal: &Principal) -> ApplicationScope {
    match principal.role {
        Role::JobSeeker => ApplicationScope::ByApplicant(principal.id.clone()),
        Role::Employer => ApplicationScope::ByJobOwner(principal.id.clone()),
        Role::Admin => ApplicationScope::All,
    }
}

pub fn authorize_job(principal: &Principal, owner: &PrincipalId, action: JobAction) -> Decision {
    match action {
        // A non-owning employer may not inspect a competitor's posting; job
        // seekers and admins may view anything.
        JobAction::View => Decision::from_bool(
            principal.role != Role::Employer || owner == &principal.id,
        ),
        JobAction::Update | JobAction::Delete => Decision::from_bool(
            principal.role == Role::Employer && owner == &principal.id,
        ),
    }
}

/// `job_owner` is `None` when the job relation could not be resolved; an
/// employer cannot prove ownership then, so employer-path checks deny.
pub fn authorize_application(
    principal: &Principal,
    applicant: &PrincipalId,
    job_owner: Option<&PrincipalId>,
    action: ApplicationAction,
) -> Decision {
    let is_applicant = applicant == &principal.id;
    let owns_job = job_owner == Some(&principal.id);

    match action {
        ApplicationAction::View | ApplicationAction::Delete => match principal.role {
            Role::Admin => Decision::Allow,
            Role::JobSeeker => Decision::from_bool(is_applicant),
            Role::Employer => Decision::from_bool(owns_job),
        },
        ApplicationAction::TransitionStatus => {
            Decision::from_bool(principal.role == Role::Employer && owns_job)
        }
        ApplicationAction::ReplaceResume => Decision::from_bool(is_applicant),
    }
}

pub fn authorize_profile(
    principal: &Principal,
    owner: &PrincipalId,
    action: ProfileAction,
) -> Decision {
    let is_owner = owner == &principal.id;
    match action {
        ProfileAction::View | ProfileAction::Delete => {
            Decision::from_bool(is_owner || principal.role == Role::Admin)
        }
        ProfileAction::Update => Decision::from_bool(is_owner),
    }
}
