use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::applications::repository::StorageError;
use crate::applications::service::ApplicationServiceError;
use crate::identity::{AuthError, IdentityError};
use crate::jobs::service::JobServiceError;
use crate::profiles::service::ProfileServiceError;

/// Unified HTTP error for the routers. Every service and identity error maps
/// to one status class; store failures are logged and never leak their
/// details to the caller.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    Job(JobServiceError),
    Application(ApplicationServiceError),
    Profile(ProfileServiceError),
    Payload(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Auth(err) => write!(f, "{err}"),
            ApiError::Job(err) => write!(f, "{err}"),
            ApiError::Application(err) => write!(f, "{err}"),
            ApiError::Profile(err) => write!(f, "{err}"),
            ApiError::Payload(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Auth(err) => Some(err),
            ApiError::Job(err) => Some(err),
            ApiError::Application(err) => Some(err),
            ApiError::Profile(err) => Some(err),
            ApiError::Payload(_) => None,
        }
    }
}

const INTERNAL_MESSAGE: &str = "an internal error occurred";

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Auth(AuthError::Unauthenticated) => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            ApiError::Auth(AuthError::Identity(err)) => match err {
                IdentityError::RoleNotFound { .. } | IdentityError::UnknownRole { .. } => {
                    (StatusCode::FORBIDDEN, err.to_string())
                }
                IdentityError::Provider(detail) => {
                    error!(%detail, "identity provider failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
            ApiError::Payload(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            ApiError::Job(err) => match err {
                JobServiceError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                JobServiceError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                JobServiceError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                JobServiceError::CascadeFailed {
                    job,
                    application,
                    source,
                } => {
                    error!(%job, %application, %source, "cascading job deletion aborted");
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
                JobServiceError::Repository(source) => {
                    error!(%source, "job store failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },

            ApiError::Application(err) => match err {
                ApplicationServiceError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                ApplicationServiceError::JobNotFound | ApplicationServiceError::NotFound => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                ApplicationServiceError::AlreadyApplied => {
                    (StatusCode::CONFLICT, err.to_string())
                }
                ApplicationServiceError::Validation(_) => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                ApplicationServiceError::Upload(source) => {
                    error!(%source, "resume upload failure");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "resume upload failed".to_string(),
                    )
                }
                ApplicationServiceError::Consistency { record } => {
                    error!(?record, "application relation verification failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "application storage is inconsistent".to_string(),
                    )
                }
                ApplicationServiceError::Repository(source) => {
                    error!(%source, "application store failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },

            ApiError::Profile(err) => match err {
                ProfileServiceError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                ProfileServiceError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                ProfileServiceError::AlreadyExists => (StatusCode::CONFLICT, err.to_string()),
                ProfileServiceError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                ProfileServiceError::Repository(source) => {
                    error!(%source, "profile store failure");
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<JobServiceError> for ApiError {
    fn from(value: JobServiceError) -> Self {
        Self::Job(value)
    }
}

impl From<ApplicationServiceError> for ApiError {
    fn from(value: ApplicationServiceError) -> Self {
        Self::Application(value)
    }
}

impl From<ProfileServiceError> for ApiError {
    fn from(value: ProfileServiceError) -> Self {
        Self::Profile(value)
    }
}
