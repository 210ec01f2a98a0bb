use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{JobCollectionResponse, JobResponse, RejectJobPayload},
    error::Result,
    middleware::auth::Actor,
    models::user::UserRole,
    utils::validation::optional_json,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/admin/jobs/pending",
    responses(
        (status = 200, description = "Jobs awaiting moderation, oldest first", body = JobCollectionResponse),
        (status = 403, description = "Caller is not an admin")
    )
)]
#[axum::debug_handler]
pub async fn pending_jobs(State(state): State<AppState>, actor: Actor) -> Result<impl IntoResponse> {
    actor.require_role(&[UserRole::Admin])?;
    let jobs = state.job_service.list_pending().await?;
    Ok(Json(JobCollectionResponse::from(jobs)))
}

#[utoipa::path(
    put,
    path = "/api/admin/jobs/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job approved", body = JobResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn approve_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    actor.require_role(&[UserRole::Admin])?;
    let job = state.job_service.set_approval(id, true).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    put,
    path = "/api/admin/jobs/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = RejectJobPayload,
    responses(
        (status = 200, description = "Job rejected and closed", body = JobResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn reject_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    actor.require_role(&[UserRole::Admin])?;
    let payload: RejectJobPayload = optional_json(&body)?;
    payload.validate()?;
    let job = state.job_service.set_approval(id, false).await?;
    if let Some(reason) = payload.reason.as_deref() {
        tracing::info!(job_id = %id, admin = %actor.id, reason, "job rejected");
    }
    Ok(Json(JobResponse::from(job)))
}
