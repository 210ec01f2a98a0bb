use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{
    Answer, Application, ApplicationStatus, Communication, CommunicationType, Evaluation,
    Interview, InterviewType, Offer, TimelineEntry,
};
use crate::models::profile::{EducationEntry, ExperienceEntry};
use crate::services::lifecycle_service::EvaluationPatch;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationPayload {
    pub job_id: Uuid,
    #[validate(length(min = 1, max = 2000))]
    pub cover_letter: String,
    #[validate(url)]
    pub resume: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub answers: Vec<Answer>,
}

/// `status` stays a string so unknown values come back as a field error
/// rather than a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    pub status: String,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInterviewPayload {
    pub scheduled_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    #[validate(range(min = 5, max = 480))]
    pub duration: Option<u32>,
    #[validate(length(max = 500))]
    pub location: Option<String>,
    #[validate(url)]
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub interviewers: Vec<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<ScheduleInterviewPayload> for Interview {
    fn from(value: ScheduleInterviewPayload) -> Self {
        Self {
            scheduled_at: value.scheduled_at,
            interview_type: value.interview_type,
            duration: value.duration,
            location: value.location,
            meeting_link: value.meeting_link,
            interviewers: value.interviewers,
            notes: value.notes,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluationPayload {
    #[validate(range(min = 1, max = 5))]
    pub technical_skills: Option<u8>,
    #[validate(range(min = 1, max = 5))]
    pub communication: Option<u8>,
    #[validate(range(min = 1, max = 5))]
    pub cultural_fit: Option<u8>,
    #[validate(range(min = 1, max = 5))]
    pub experience: Option<u8>,
    #[validate(range(min = 1, max = 5))]
    pub overall: Option<u8>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
    pub recommended: Option<bool>,
}

impl From<EvaluationPayload> for EvaluationPatch {
    fn from(value: EvaluationPayload) -> Self {
        Self {
            technical_skills: value.technical_skills,
            communication: value.communication,
            cultural_fit: value.cultural_fit,
            experience: value.experience,
            overall: value.overall,
            notes: value.notes,
            recommended: value.recommended,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferPayload {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub salary: Option<Decimal>,
    #[validate(length(min = 3, max = 3))]
    pub currency: Option<String>,
    pub benefits: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub expires_at: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl From<OfferPayload> for Offer {
    fn from(value: OfferPayload) -> Self {
        Self {
            salary: value.salary,
            currency: value.currency.map(|c| c.to_uppercase()),
            benefits: value.benefits,
            start_date: value.start_date,
            expires_at: value.expires_at,
            notes: value.notes,
            accepted: false,
            accepted_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct WithdrawPayload {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationPayload {
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<CommunicationType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Option<Uuid>,
    pub applicant_id: Uuid,
    pub employer_id: Uuid,
    pub status: ApplicationStatus,
    pub cover_letter: String,
    pub resume: Option<String>,
    pub answers: Vec<Answer>,
    pub match_score: i32,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub interview: Option<Interview>,
    pub evaluation: Option<Evaluation>,
    pub offer: Option<Offer>,
    pub timeline: Vec<TimelineEntry>,
    pub communications: Vec<Communication>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(value: Application) -> Self {
        Self {
            id: value.id,
            job_id: value.job_id,
            applicant_id: value.applicant_id,
            employer_id: value.employer_id,
            status: value.status,
            cover_letter: value.cover_letter,
            resume: value.resume,
            answers: value.answers.0,
            match_score: value.match_score,
            skills: value.skills.0,
            experience: value.experience.0,
            education: value.education.0,
            interview: value.interview.map(|j| j.0),
            evaluation: value.evaluation.map(|j| j.0),
            offer: value.offer.map(|j| j.0),
            timeline: value.timeline.0,
            communications: value.communications.0,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationResponse>,
    pub total: usize,
}

impl From<Vec<Application>> for ApplicationListResponse {
    fn from(value: Vec<Application>) -> Self {
        let items: Vec<ApplicationResponse> = value.into_iter().map(Into::into).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}
