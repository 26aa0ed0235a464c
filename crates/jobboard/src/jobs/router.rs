use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::domain::{JobDraft, JobId, JobPatch};
use super::repository::JobRepository;
use super::service::JobService;
use crate::applications::repository::ApplicationRepository;
use crate::error::ApiError;
use crate::identity::{self, IdentityProvider};

/// State shared by the job endpoints: the service plus the auth seam.
pub struct JobGateway<J, A, I> {
    pub service: JobService<J, A>,
    pub identity: Arc<I>,
}

/// Router builder exposing the job lifecycle endpoints.
pub fn job_router<J, A, I>(gateway: Arc<JobGateway<J, A, I>>) -> Router
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    I: IdentityProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_jobs::<J, A, I>).post(create_job::<J, A, I>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(get_job::<J, A, I>)
                .put(update_job::<J, A, I>)
                .delete(delete_job::<J, A, I>),
        )
        .with_state(gateway)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListJobsParams {
    pub(crate) page: Option<u32>,
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::Payload(rejection.to_string()))
}

pub(crate) async fn list_jobs<J, A, I>(
    State(gateway): State<Arc<JobGateway<J, A, I>>>,
    headers: HeaderMap,
    Query(params): Query<ListJobsParams>,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let page = gateway.service.list(&principal, params.page)?;
    Ok((StatusCode::OK, Json(page)).into_response())
}

pub(crate) async fn create_job<J, A, I>(
    State(gateway): State<Arc<JobGateway<J, A, I>>>,
    headers: HeaderMap,
    body: Result<Json<JobDraft>, JsonRejection>,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let draft = payload(body)?;
    let job = gateway.service.create(&principal, draft)?;
    Ok((StatusCode::CREATED, Json(job)).into_response())
}

pub(crate) async fn get_job<J, A, I>(
    State(gateway): State<Arc<JobGateway<J, A, I>>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let job = gateway.service.get(&principal, &JobId(job_id))?;
    Ok((StatusCode::OK, Json(job)).into_response())
}

pub(crate) async fn update_job<J, A, I>(
    State(gateway): State<Arc<JobGateway<J, A, I>>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    body: Result<Json<JobPatch>, JsonRejection>,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let patch = payload(body)?;
    let job = gateway.service.update(&principal, &JobId(job_id), patch)?;
    Ok((StatusCode::OK, Json(job)).into_response())
}

pub(crate) async fn delete_job<J, A, I>(
    State(gateway): State<Arc<JobGateway<J, A, I>>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let deleted = gateway.service.delete(&principal, &JobId(job_id))?;
    Ok((StatusCode::OK, Json(deleted)).into_response())
}
