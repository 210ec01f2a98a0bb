use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::profile::{EducationEntry, ExperienceEntry};

string_enum! {
    pub enum ApplicationStatus {
        Applied => "applied",
        Reviewing => "reviewing",
        Shortlisted => "shortlisted",
        InterviewScheduled => "interview-scheduled",
        Interviewed => "interviewed",
        Offered => "offered",
        Hired => "hired",
        Rejected => "rejected",
        Withdrawn => "withdrawn",
    }
}

string_enum! {
    pub enum InterviewType {
        Phone => "phone",
        Video => "video",
        InPerson => "in-person",
        Technical => "technical",
    }
}

string_enum! {
    pub enum CommunicationType {
        Message => "message",
        Email => "email",
        Note => "note",
    }
}

/// One entry of the append-only status log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub action: ApplicationStatus,
    pub timestamp: DateTime<Utc>,
    pub performed_by: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub scheduled_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub interview_type: InterviewType,
    /// Minutes.
    pub duration: Option<u32>,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    #[serde(default)]
    pub interviewers: Vec<String>,
    pub notes: Option<String>,
}

/// Ratings are on a 1 to 5 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Evaluation {
    pub technical_skills: Option<u8>,
    pub communication: Option<u8>,
    pub cultural_fit: Option<u8>,
    pub experience: Option<u8>,
    pub overall: Option<u8>,
    pub notes: Option<String>,
    pub recommended: Option<bool>,
    pub evaluated_by: Option<Uuid>,
    pub evaluated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Offer {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub salary: Option<Decimal>,
    pub currency: Option<String>,
    pub benefits: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub expires_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub accepted: bool,
    pub accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub sender: Uuid,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: CommunicationType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Application {
    pub id: Uuid,
    /// `None` once the posting has been deleted.
    pub job_id: Option<Uuid>,
    pub applicant_id: Uuid,
    pub employer_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub cover_letter: String,
    pub resume: Option<String>,
    pub answers: Json<Vec<Answer>>,
    pub match_score: i32,
    pub skills: Json<Vec<String>>,
    pub experience: Json<Vec<ExperienceEntry>>,
    pub education: Json<Vec<EducationEntry>>,
    pub interview: Option<Json<Interview>>,
    pub evaluation: Option<Json<Evaluation>>,
    pub offer: Option<Json<Offer>>,
    pub timeline: Json<Vec<TimelineEntry>>,
    pub communications: Json<Vec<Communication>>,
    /// Bumped on every tracker write.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_vocabulary_has_nine_values() {
        assert_eq!(ApplicationStatus::ALL.len(), 9);
        assert_eq!(
            "interview-scheduled".parse::<ApplicationStatus>().unwrap(),
            ApplicationStatus::InterviewScheduled
        );
        assert!("archived".parse::<ApplicationStatus>().is_err());
        assert!("Hired".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn timeline_entry_serializes_camel_case() {
        let entry = TimelineEntry {
            action: ApplicationStatus::Offered,
            timestamp: DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
            performed_by: None,
            notes: Some("Offer extended".into()),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["action"], "offered");
        assert!(value.get("performedBy").is_some());
    }

    #[test]
    fn offer_salary_is_a_json_number() {
        let offer: Offer = serde_json::from_str(r#"{"salary": 85000.5, "currency": "EUR"}"#).unwrap();
        assert_eq!(offer.salary, Some(Decimal::new(850005, 1)));
        assert!(!offer.accepted);
        let value = serde_json::to_value(&offer).unwrap();
        assert!(value["salary"].is_number());
    }
}
