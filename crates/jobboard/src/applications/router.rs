use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use super::domain::{ApplicationId, ResumeUpload, SubmitApplication};
use super::repository::{ApplicationRepository, ResumeStorage};
use super::service::ApplicationService;
use crate::error::ApiError;
use crate::identity::{self, IdentityProvider};
use crate::jobs::domain::JobId;
use crate::jobs::repository::JobRepository;

/// State shared by the application endpoints.
pub struct ApplicationGateway<J, A, S, I> {
    pub service: ApplicationService<J, A, S>,
    pub identity: Arc<I>,
}

/// Router builder exposing the application lifecycle endpoints.
pub fn application_router<J, A, S, I>(gateway: Arc<ApplicationGateway<J, A, S, I>>) -> Router
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: ResumeStorage + 'static,
    I: IdentityProvider + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            get(list_applications::<J, A, S, I>).post(submit_application::<J, A, S, I>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(get_application::<J, A, S, I>)
                .put(update_status::<J, A, S, I>)
                .delete(delete_application::<J, A, S, I>),
        )
        .route(
            "/api/v1/applications/:application_id/resume",
            put(update_resume::<J, A, S, I>),
        )
        .with_state(gateway)
}

/// Status transition request. The original clients sent the field under two
/// names depending on revision; both are accepted here and normalized.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateStatusRequest {
    #[serde(alias = "app_status")]
    pub(crate) status: String,
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(Option<String>, Option<String>, Option<ResumeUpload>), ApiError> {
    let mut job = None;
    let mut cover_letter = None;
    let mut resume = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::Payload(err.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("job") => {
                job = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::Payload(err.to_string()))?,
                );
            }
            Some("coverLetter") => {
                cover_letter = Some(
                    field
                        .text()
                        .await
                        .map_err(|err| ApiError::Payload(err.to_string()))?,
                );
            }
            Some("resume") => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| ApiError::Payload(err.to_string()))?
                    .to_vec();
                resume = Some(ResumeUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    Ok((job, cover_letter, resume))
}

pub(crate) async fn list_applications<J, A, S, I>(
    State(gateway): State<Arc<ApplicationGateway<J, A, S, I>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: ResumeStorage + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let views = gateway.service.list(&principal)?;
    Ok((StatusCode::OK, Json(views)).into_response())
}

pub(crate) async fn submit_application<J, A, S, I>(
    State(gateway): State<Arc<ApplicationGateway<J, A, S, I>>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: ResumeStorage + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;

    let (job, cover_letter, resume) = read_multipart(multipart).await?;
    let job = job
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::Payload("missing required field: job".to_string()))?;
    let resume =
        resume.ok_or_else(|| ApiError::Payload("missing required field: resume".to_string()))?;

    let submission = SubmitApplication {
        job: JobId(job),
        cover_letter: cover_letter.filter(|letter| !letter.is_empty()),
        resume,
    };

    let record = gateway.service.submit(&principal, submission)?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

pub(crate) async fn get_application<J, A, S, I>(
    State(gateway): State<Arc<ApplicationGateway<J, A, S, I>>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: ResumeStorage + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let view = gateway
        .service
        .get(&principal, &ApplicationId(application_id))?;
    Ok((StatusCode::OK, Json(view)).into_response())
}

pub(crate) async fn update_status<J, A, S, I>(
    State(gateway): State<Arc<ApplicationGateway<J, A, S, I>>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: ResumeStorage + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let request = body
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::Payload(rejection.to_string()))?;

    let record = gateway.service.update_status(
        &principal,
        &ApplicationId(application_id),
        &request.status,
    )?;
    Ok((StatusCode::OK, Json(record)).into_response())
}

pub(crate) async fn update_resume<J, A, S, I>(
    State(gateway): State<Arc<ApplicationGateway<J, A, S, I>>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    multipart: Multipart,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: ResumeStorage + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;

    let (_, _, resume) = read_multipart(multipart).await?;
    let resume =
        resume.ok_or_else(|| ApiError::Payload("missing required field: resume".to_string()))?;

    let record =
        gateway
            .service
            .update_resume(&principal, &ApplicationId(application_id), resume)?;
    Ok((StatusCode::OK, Json(record)).into_response())
}

pub(crate) async fn delete_application<J, A, S, I>(
    State(gateway): State<Arc<ApplicationGateway<J, A, S, I>>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Result<Response, ApiError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
    S: ResumeStorage + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let deleted = gateway
        .service
        .delete(&principal, &ApplicationId(application_id))?;
    Ok((StatusCode::OK, Json(deleted)).into_response())
}
