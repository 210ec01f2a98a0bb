use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationListResponse, ApplicationResponse, CommunicationPayload, EvaluationPayload,
        OfferPayload, ScheduleInterviewPayload, SubmitApplicationPayload, UpdateStatusPayload,
        WithdrawPayload,
    },
    error::Result,
    middleware::auth::Actor,
    models::{
        application::{ApplicationStatus, CommunicationType},
        user::UserRole,
    },
    services::{
        application_service::{ensure_can_manage, ensure_can_view, ensure_is_applicant},
        lifecycle_service::LifecycleTracker,
    },
    utils::{
        time,
        validation::{optional_json, parse_field},
    },
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = SubmitApplicationPayload,
    responses(
        (status = 201, description = "Application submitted", body = ApplicationResponse),
        (status = 400, description = "Invalid payload, job unavailable or already applied"),
        (status = 403, description = "Caller is not a candidate")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<SubmitApplicationPayload>,
) -> Result<impl IntoResponse> {
    actor.require_role(&[UserRole::Candidate])?;
    payload.validate()?;
    let profile = state
        .user_service
        .candidate_profile(actor.id)
        .await?
        .unwrap_or_default();
    let application = state
        .application_service
        .submit(actor.id, profile, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApplicationResponse::from(application))))
}

#[utoipa::path(
    get,
    path = "/api/applications/mine",
    responses(
        (status = 200, description = "The caller's applications, newest first", body = ApplicationListResponse),
        (status = 403, description = "Caller is not a candidate")
    )
)]
#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<impl IntoResponse> {
    actor.require_role(&[UserRole::Candidate])?;
    let applications = state
        .application_service
        .list_for_applicant(actor.id)
        .await?;
    Ok(Json(ApplicationListResponse::from(applications)))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found", body = ApplicationResponse),
        (status = 403, description = "Caller is not a party to the application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state.application_service.get_for(&actor, id).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = ApplicationResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Caller cannot manage the application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let status: ApplicationStatus = parse_field("status", &payload.status)?;
    let application = state
        .application_service
        .apply(&actor, id, ensure_can_manage, |app| {
            Ok(LifecycleTracker::change_status(
                app,
                status,
                actor.id,
                payload.notes,
                time::now(),
            ))
        })
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/interview",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = ScheduleInterviewPayload,
    responses(
        (status = 200, description = "Interview scheduled", body = ApplicationResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller cannot manage the application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn schedule_interview(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleInterviewPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .apply(&actor, id, ensure_can_manage, |app| {
            Ok(LifecycleTracker::schedule_interview(
                app,
                payload.into(),
                actor.id,
                time::now(),
            ))
        })
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/evaluate",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = EvaluationPayload,
    responses(
        (status = 200, description = "Evaluation merged", body = ApplicationResponse),
        (status = 400, description = "Rating outside 1 to 5"),
        (status = 403, description = "Caller cannot manage the application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn evaluate(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<EvaluationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .apply(&actor, id, ensure_can_manage, |app| {
            Ok(LifecycleTracker::evaluate(
                app,
                payload.into(),
                actor.id,
                time::now(),
            ))
        })
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/offer",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = OfferPayload,
    responses(
        (status = 200, description = "Offer extended", body = ApplicationResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller cannot manage the application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn make_offer(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<OfferPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let application = state
        .application_service
        .apply(&actor, id, ensure_can_manage, |app| {
            Ok(LifecycleTracker::make_offer(
                app,
                payload.into(),
                actor.id,
                time::now(),
            ))
        })
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/accept-offer",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Offer accepted, applicant hired", body = ApplicationResponse),
        (status = 400, description = "Application has no open offer"),
        (status = 403, description = "Caller is not the applicant"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn accept_offer(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let application = state
        .application_service
        .apply(&actor, id, ensure_is_applicant, |app| {
            LifecycleTracker::accept_offer(app, actor.id, time::now())
        })
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/withdraw",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = WithdrawPayload,
    responses(
        (status = 200, description = "Application withdrawn", body = ApplicationResponse),
        (status = 400, description = "Already hired or withdrawn"),
        (status = 403, description = "Caller is not the applicant"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn withdraw(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let payload: WithdrawPayload = optional_json(&body)?;
    payload.validate()?;
    let application = state
        .application_service
        .apply(&actor, id, ensure_is_applicant, |app| {
            LifecycleTracker::withdraw(app, actor.id, payload.reason, time::now())
        })
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/communications",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = CommunicationPayload,
    responses(
        (status = 200, description = "Message recorded", body = ApplicationResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not a party to the application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn add_communication(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<CommunicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let kind = payload.kind.unwrap_or(CommunicationType::Message);
    let application = state
        .application_service
        .apply(&actor, id, ensure_can_view, |app| {
            Ok(LifecycleTracker::add_communication(
                app,
                actor.id,
                payload.message,
                kind,
                time::now(),
            ))
        })
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}
