use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::job::{
    Job, JobLevel, JobLocation, JobRequirements, JobStatus, JobType, SalaryPeriod,
};
use crate::services::job_service::JobList;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SalaryPayload {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub min: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub max: Option<Decimal>,
    pub currency: Option<String>,
    pub period: Option<SalaryPeriod>,
}

impl SalaryPayload {
    pub fn check_range(&self) -> crate::error::Result<()> {
        let negative = [self.min, self.max]
            .iter()
            .flatten()
            .any(|v| v.is_sign_negative());
        if negative {
            return Err(crate::error::Error::BadRequest(
                "Salary values cannot be negative".into(),
            ));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(crate::error::Error::BadRequest(
                    "Salary minimum cannot exceed the maximum".into(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,
    #[serde(default)]
    pub location: JobLocation,
    #[validate(length(min = 1, max = 20000))]
    pub description: String,
    #[serde(default)]
    pub requirements: JobRequirements,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub salary: SalaryPayload,
    pub job_type: JobType,
    #[validate(length(min = 1, max = 100))]
    pub industry: Option<String>,
    pub level: JobLevel,
    pub status: Option<JobStatus>,
    pub application_deadline: Option<DateTime<Utc>>,
}

/// Fields an owner may change. Moderation flags and counters are not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,
    pub location: Option<JobLocation>,
    #[validate(length(min = 1, max = 20000))]
    pub description: Option<String>,
    pub requirements: Option<JobRequirements>,
    pub responsibilities: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub salary: Option<SalaryPayload>,
    pub job_type: Option<JobType>,
    #[validate(length(min = 1, max = 100))]
    pub industry: Option<String>,
    pub level: Option<JobLevel>,
    pub status: Option<JobStatus>,
    pub application_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RejectJobPayload {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JobListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub job_type: Option<JobType>,
    pub level: Option<JobLevel>,
    pub industry: Option<String>,
    pub remote: Option<bool>,
    pub salary_min: Option<i64>,
    pub employer: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RecommendedQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryResponse {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub min: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub max: Option<Decimal>,
    pub currency: String,
    pub period: SalaryPeriod,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub company_name: String,
    pub location: JobLocation,
    pub description: String,
    pub requirements: JobRequirements,
    pub responsibilities: Vec<String>,
    pub benefits: Vec<String>,
    pub salary: SalaryResponse,
    pub job_type: JobType,
    pub industry: Option<String>,
    pub level: JobLevel,
    pub status: JobStatus,
    pub approved: bool,
    pub application_deadline: Option<DateTime<Utc>>,
    pub application_count: i32,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<i32>,
}

impl JobResponse {
    pub fn with_score(job: Job, match_score: Option<i32>) -> Self {
        Self {
            id: job.id,
            employer_id: job.employer_id,
            title: job.title,
            company_name: job.company_name,
            location: job.location.0,
            description: job.description,
            requirements: job.requirements.0,
            responsibilities: job.responsibilities.0,
            benefits: job.benefits.0,
            salary: SalaryResponse {
                min: job.salary_min,
                max: job.salary_max,
                currency: job.salary_currency,
                period: job.salary_period,
            },
            job_type: job.job_type,
            industry: job.industry,
            level: job.level,
            status: job.status,
            approved: job.approved,
            application_deadline: job.application_deadline,
            application_count: job.application_count,
            views: job.views,
            created_at: job.created_at,
            updated_at: job.updated_at,
            match_score,
        }
    }
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self::with_score(value, None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub items: Vec<JobResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl JobListResponse {
    pub fn from_list(list: JobList, score: impl Fn(&Job) -> Option<i32>) -> Self {
        Self {
            items: list
                .items
                .into_iter()
                .map(|job| {
                    let match_score = score(&job);
                    JobResponse::with_score(job, match_score)
                })
                .collect(),
            total: list.total,
            page: list.page,
            per_page: list.per_page,
            total_pages: list.total_pages,
        }
    }
}

/// Unpaginated listing, used for an employer's own postings and the
/// moderation queue.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JobCollectionResponse {
    pub items: Vec<JobResponse>,
    pub total: usize,
}

impl From<Vec<JobResponse>> for JobCollectionResponse {
    fn from(items: Vec<JobResponse>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

impl From<Vec<Job>> for JobCollectionResponse {
    fn from(jobs: Vec<Job>) -> Self {
        jobs.into_iter()
            .map(JobResponse::from)
            .collect::<Vec<_>>()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn create_payload() -> CreateJobPayload {
        serde_json::from_value(serde_json::json!({
            "title": "Backend Engineer",
            "description": "Own the API",
            "jobType": "full-time",
            "level": "senior",
            "location": { "city": "Lisbon", "country": "Portugal" },
            "requirements": { "skills": ["Rust", "PostgreSQL"] },
            "salary": { "min": 60000, "max": 90000, "period": "yearly" }
        }))
        .unwrap()
    }

    #[test]
    fn create_payload_accepts_camel_case_document() {
        let payload = create_payload();
        assert_ok!(payload.validate());
        assert_eq!(payload.job_type, JobType::FullTime);
        assert_eq!(payload.requirements.skills.len(), 2);
        assert!(!payload.location.remote);
        assert_ok!(payload.salary.check_range());
    }

    #[test]
    fn blank_title_fails_validation() {
        let mut payload = create_payload();
        payload.title = String::new();
        assert_err!(payload.validate());
    }

    #[test]
    fn inverted_salary_range_is_rejected() {
        let salary = SalaryPayload {
            min: Some(Decimal::new(100, 0)),
            max: Some(Decimal::new(50, 0)),
            ..Default::default()
        };
        assert_err!(salary.check_range());
        let negative = SalaryPayload {
            min: Some(Decimal::new(-1, 0)),
            ..Default::default()
        };
        assert_err!(negative.check_range());
    }

    #[test]
    fn update_payload_ignores_unlisted_fields() {
        let payload: UpdateJobPayload = serde_json::from_value(serde_json::json!({
            "title": "Staff Engineer",
            "approved": true,
            "applicationCount": 999,
            "employerId": "00000000-0000-0000-0000-000000000000"
        }))
        .unwrap();
        assert_eq!(payload.title.as_deref(), Some("Staff Engineer"));
        assert!(payload.status.is_none());
    }
}
