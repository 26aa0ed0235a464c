use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use super::domain::{ProfileDraft, ProfileId, ProfilePatch};
use super::repository::ProfileRepository;
use super::service::ProfileService;
use crate::error::ApiError;
use crate::identity::{self, IdentityProvider};

/// State shared by the profile endpoints.
pub struct ProfileGateway<P, I> {
    pub service: ProfileService<P>,
    pub identity: Arc<I>,
}

/// Router builder exposing the job-seeker profile endpoints.
pub fn profile_router<P, I>(gateway: Arc<ProfileGateway<P, I>>) -> Router
where
    P: ProfileRepository + 'static,
    I: IdentityProvider + 'static,
{
    Router::new()
        .route("/api/v1/profiles", post(create_profile::<P, I>))
        .route("/api/v1/profiles/me", get(own_profile::<P, I>))
        .route(
            "/api/v1/profiles/:profile_id",
            get(get_profile::<P, I>)
                .put(update_profile::<P, I>)
                .delete(delete_profile::<P, I>),
        )
        .with_state(gateway)
}

fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::Payload(rejection.to_string()))
}

pub(crate) async fn create_profile<P, I>(
    State(gateway): State<Arc<ProfileGateway<P, I>>>,
    headers: HeaderMap,
    body: Result<Json<ProfileDraft>, JsonRejection>,
) -> Result<Response, ApiError>
where
    P: ProfileRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let draft = payload(body)?;
    let profile = gateway.service.create(&principal, draft)?;
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

pub(crate) async fn own_profile<P, I>(
    State(gateway): State<Arc<ProfileGateway<P, I>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    P: ProfileRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let profile = gateway.service.get_own(&principal)?;
    Ok((StatusCode::OK, Json(profile)).into_response())
}

pub(crate) async fn get_profile<P, I>(
    State(gateway): State<Arc<ProfileGateway<P, I>>>,
    headers: HeaderMap,
    Path(profile_id): Path<String>,
) -> Result<Response, ApiError>
where
    P: ProfileRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let profile = gateway.service.get(&principal, &ProfileId(profile_id))?;
    Ok((StatusCode::OK, Json(profile)).into_response())
}

pub(crate) async fn update_profile<P, I>(
    State(gateway): State<Arc<ProfileGateway<P, I>>>,
    headers: HeaderMap,
    Path(profile_id): Path<String>,
    body: Result<Json<ProfilePatch>, JsonRejection>,
) -> Result<Response, ApiError>
where
    P: ProfileRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let patch = payload(body)?;
    let profile = gateway
        .service
        .update(&principal, &ProfileId(profile_id), patch)?;
    Ok((StatusCode::OK, Json(profile)).into_response())
}

pub(crate) async fn delete_profile<P, I>(
    State(gateway): State<Arc<ProfileGateway<P, I>>>,
    headers: HeaderMap,
    Path(profile_id): Path<String>,
) -> Result<Response, ApiError>
where
    P: ProfileRepository + 'static,
    I: IdentityProvider + 'static,
{
    let principal = identity::authenticate(&*gateway.identity, &headers)?;
    let deleted = gateway.service.delete(&principal, &ProfileId(profile_id))?;
    Ok((StatusCode::OK, Json(deleted)).into_response())
}
