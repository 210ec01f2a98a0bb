use std::cmp::Reverse;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        application_dto::ApplicationListResponse,
        job_dto::{
            CreateJobPayload, JobCollectionResponse, JobListQuery, JobListResponse, JobResponse,
            RecommendedQuery, UpdateJobPayload,
        },
    },
    error::{Error, Result},
    middleware::auth::Actor,
    models::{job::Job, profile::CandidateProfile, user::UserRole},
    services::match_service::MatchService,
    AppState,
};

/// Scoring profile for candidate callers; anyone else gets no score.
async fn scoring_profile(
    state: &AppState,
    actor: Option<&Actor>,
) -> Result<Option<CandidateProfile>> {
    match actor {
        Some(actor) if actor.role == UserRole::Candidate => {
            match state.user_service.candidate_profile(actor.id).await {
                Err(Error::NotFound(_)) => Ok(None),
                other => other,
            }
        }
        _ => Ok(None),
    }
}

fn can_manage(actor: &Actor, job: &Job) -> bool {
    actor.is_admin() || actor.id == job.employer_id
}

async fn managed_job(state: &AppState, actor: &Actor, id: Uuid) -> Result<Job> {
    let job = state.job_service.get_by_id(id).await?;
    if !can_manage(actor, &job) {
        return Err(Error::Forbidden(
            "Only the owning employer or an admin can manage this job".into(),
        ));
    }
    Ok(job)
}

#[utoipa::path(
    get,
    path = "/api/jobs",
    params(
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page"),
        ("search" = Option<String>, Query, description = "Matches title, description or company"),
        ("city" = Option<String>, Query, description = "Filter by city"),
        ("country" = Option<String>, Query, description = "Filter by country"),
        ("jobType" = Option<String>, Query, description = "Filter by job type"),
        ("level" = Option<String>, Query, description = "Filter by level"),
        ("industry" = Option<String>, Query, description = "Filter by industry"),
        ("remote" = Option<bool>, Query, description = "Remote postings only"),
        ("salaryMin" = Option<i64>, Query, description = "Lowest acceptable salary"),
        ("employer" = Option<Uuid>, Query, description = "Filter by employer")
    ),
    responses(
        (status = 200, description = "Active approved jobs", body = JobListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    actor: Option<Actor>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let profile = scoring_profile(&state, actor.as_ref()).await?;
    let list = state.job_service.list(query).await?;
    let response = JobListResponse::from_list(list, |job| {
        profile
            .as_ref()
            .map(|p| MatchService::job_match_score(job, p))
    });
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/jobs/recommended",
    params(
        ("limit" = Option<i64>, Query, description = "Number of jobs, 1 to 50")
    ),
    responses(
        (status = 200, description = "Jobs ranked by match score", body = JobCollectionResponse),
        (status = 403, description = "Caller is not a candidate")
    )
)]
#[axum::debug_handler]
pub async fn recommended_jobs(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<RecommendedQuery>,
) -> Result<impl IntoResponse> {
    actor.require_role(&[UserRole::Candidate])?;
    let limit = query.limit.unwrap_or(10).clamp(1, 50) as usize;
    let profile = state
        .user_service
        .candidate_profile(actor.id)
        .await?
        .unwrap_or_default();

    let mut scored: Vec<(i32, Job)> = state
        .job_service
        .list_recommendation_pool()
        .await?
        .into_iter()
        .map(|job| (MatchService::job_match_score(&job, &profile), job))
        .collect();
    // Stable sort keeps newer postings first among equal scores.
    scored.sort_by_key(|(score, _)| Reverse(*score));

    let items: Vec<JobResponse> = scored
        .into_iter()
        .take(limit)
        .map(|(score, job)| JobResponse::with_score(job, Some(score)))
        .collect();
    Ok(Json(JobCollectionResponse::from(items)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/mine",
    responses(
        (status = 200, description = "The caller's postings in any status", body = JobCollectionResponse),
        (status = 403, description = "Caller is not an employer")
    )
)]
#[axum::debug_handler]
pub async fn my_jobs(State(state): State<AppState>, actor: Actor) -> Result<impl IntoResponse> {
    actor.require_role(&[UserRole::Employer, UserRole::Admin])?;
    let jobs = state.job_service.list_by_employer(actor.id).await?;
    Ok(Json(JobCollectionResponse::from(jobs)))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = JobResponse),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    actor: Option<Actor>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let job = state
        .job_service
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;
    let visible = job.is_public() || actor.as_ref().is_some_and(|a| can_manage(a, &job));
    if !visible {
        return Err(Error::NotFound("Job not found".into()));
    }

    let job = state.job_service.record_view(id).await?;
    let score = scoring_profile(&state, actor.as_ref())
        .await?
        .map(|profile| MatchService::job_match_score(&job, &profile));
    Ok(Json(JobResponse::with_score(job, score)))
}

#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created, pending approval", body = JobResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an employer")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    actor.require_role(&[UserRole::Employer, UserRole::Admin])?;
    payload.validate()?;
    let employer = state.user_service.get_by_id(actor.id).await?;
    let company_name = payload
        .company_name
        .clone()
        .or(employer.company_name)
        .unwrap_or(employer.name);
    let job = state
        .job_service
        .create(actor.id, company_name, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated", body = JobResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller does not own the job"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    managed_job(&state, &actor, id).await?;
    let job = state.job_service.update(id, payload).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    delete,
    path = "/api/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 204, description = "Job deleted; its applications are kept"),
        (status = 403, description = "Caller does not own the job"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    managed_job(&state, &actor, id).await?;
    state.job_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}/applications",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Applications for the job, best match first", body = ApplicationListResponse),
        (status = 403, description = "Caller does not own the job"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn job_applications(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    managed_job(&state, &actor, id).await?;
    let applications = state.application_service.list_for_job(id).await?;
    Ok(Json(ApplicationListResponse::from(applications)))
}
