use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use serde_json::json;

use crate::infra::{AppState, InMemoryBackend, InMemoryResumeStorage};
use jobboard::applications::router::{application_router, ApplicationGateway};
use jobboard::applications::service::ApplicationService;
use jobboard::jobs::router::{job_router, JobGateway};
use jobboard::jobs::service::JobService;
use jobboard::profiles::router::{profile_router, ProfileGateway};
use jobboard::profiles::service::ProfileService;

/// Compose the lifecycle routers with the operational endpoints.
pub(crate) fn with_job_board_routes(
    backend: Arc<InMemoryBackend>,
    storage: Arc<InMemoryResumeStorage>,
    page_size: u32,
) -> Router {
    let jobs = Arc::new(JobGateway {
        service: JobService::new(backend.clone(), backend.clone(), page_size),
        identity: backend.clone(),
    });
    let applications = Arc::new(ApplicationGateway {
        service: ApplicationService::new(backend.clone(), backend.clone(), storage),
        identity: backend.clone(),
    });
    let profiles = Arc::new(ProfileGateway {
        service: ProfileService::new(backend.clone()),
        identity: backend,
    });

    Router::new()
        .merge(job_router(jobs))
        .merge(application_router(applications))
        .merge(profile_router(profiles))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
