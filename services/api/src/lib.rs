mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use jobboard::error::ApiError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}

/// Top-level failure for the binary: configuration, telemetry, IO, or server
/// errors on the way up.
#[derive(Debug)]
pub enum AppError {
    Config(jobboard::config::ConfigError),
    Telemetry(jobboard::telemetry::TelemetryError),
    Io(std::io::Error),
    Api(ApiError),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {err}"),
            AppError::Telemetry(err) => write!(f, "telemetry error: {err}"),
            AppError::Io(err) => write!(f, "io error: {err}"),
            AppError::Api(err) => write!(f, "service error: {err}"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Api(err) => Some(err),
        }
    }
}

impl From<jobboard::config::ConfigError> for AppError {
    fn from(value: jobboard::config::ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<jobboard::telemetry::TelemetryError> for AppError {
    fn from(value: jobboard::telemetry::TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ApiError> for AppError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<jobboard::jobs::service::JobServiceError> for AppError {
    fn from(value: jobboard::jobs::service::JobServiceError) -> Self {
        Self::Api(ApiError::Job(value))
    }
}

impl From<jobboard::applications::service::ApplicationServiceError> for AppError {
    fn from(value: jobboard::applications::service::ApplicationServiceError) -> Self {
        Self::Api(ApiError::Application(value))
    }
}
