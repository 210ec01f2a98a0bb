use axum::response::{IntoResponse, Json};
use utoipa::OpenApi;

use super::{admin, applications, auth, health, jobs};
use crate::dto::{
    application_dto::{
        ApplicationListResponse, ApplicationResponse, CommunicationPayload, EvaluationPayload,
        OfferPayload, ScheduleInterviewPayload, SubmitApplicationPayload, UpdateStatusPayload,
        WithdrawPayload,
    },
    auth_dto::{AuthResponse, LoginPayload, RegisterPayload, UpdateProfilePayload, UserResponse},
    job_dto::{
        CreateJobPayload, JobCollectionResponse, JobListResponse, JobResponse, RejectJobPayload,
        SalaryPayload, SalaryResponse, UpdateJobPayload,
    },
};
use crate::models::{
    application::{
        Answer, ApplicationStatus, Communication, CommunicationType, Evaluation, Interview,
        InterviewType, Offer, TimelineEntry,
    },
    job::{
        EducationRequirement, ExperienceRange, JobLevel, JobLocation, JobRequirements, JobStatus,
        JobType, RemoteType, SalaryPeriod,
    },
    profile::{
        Availability, CandidateLocation, CandidateProfile, EducationEntry, ExperienceEntry,
        SalaryExpectation,
    },
    user::UserRole,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Job Portal API"),
    paths(
        health::health,
        auth::register,
        auth::login,
        auth::me,
        auth::update_profile,
        jobs::list_jobs,
        jobs::recommended_jobs,
        jobs::my_jobs,
        jobs::get_job,
        jobs::create_job,
        jobs::update_job,
        jobs::delete_job,
        jobs::job_applications,
        admin::pending_jobs,
        admin::approve_job,
        admin::reject_job,
        applications::submit_application,
        applications::my_applications,
        applications::get_application,
        applications::update_status,
        applications::schedule_interview,
        applications::evaluate,
        applications::make_offer,
        applications::accept_offer,
        applications::withdraw,
        applications::add_communication,
    ),
    components(schemas(
        RegisterPayload,
        LoginPayload,
        UpdateProfilePayload,
        UserResponse,
        AuthResponse,
        UserRole,
        CandidateProfile,
        CandidateLocation,
        ExperienceEntry,
        EducationEntry,
        SalaryExpectation,
        Availability,
        CreateJobPayload,
        UpdateJobPayload,
        RejectJobPayload,
        SalaryPayload,
        SalaryResponse,
        JobResponse,
        JobListResponse,
        JobCollectionResponse,
        JobLocation,
        JobRequirements,
        ExperienceRange,
        EducationRequirement,
        JobType,
        JobLevel,
        JobStatus,
        SalaryPeriod,
        RemoteType,
        SubmitApplicationPayload,
        UpdateStatusPayload,
        ScheduleInterviewPayload,
        EvaluationPayload,
        OfferPayload,
        WithdrawPayload,
        CommunicationPayload,
        ApplicationResponse,
        ApplicationListResponse,
        ApplicationStatus,
        Answer,
        Interview,
        InterviewType,
        Evaluation,
        Offer,
        Communication,
        CommunicationType,
        TimelineEntry,
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
