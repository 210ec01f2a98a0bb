use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

string_enum! {
    pub enum JobType {
        FullTime => "full-time",
        PartTime => "part-time",
        Contract => "contract",
        Internship => "internship",
        Temporary => "temporary",
        Freelance => "freelance",
    }
}

string_enum! {
    pub enum JobLevel {
        Entry => "entry",
        Junior => "junior",
        Mid => "mid",
        Senior => "senior",
        Lead => "lead",
        Executive => "executive",
    }
}

string_enum! {
    pub enum JobStatus {
        Active => "active",
        Paused => "paused",
        Closed => "closed",
        Draft => "draft",
    }
}

string_enum! {
    pub enum SalaryPeriod {
        Hourly => "hourly",
        Monthly => "monthly",
        Yearly => "yearly",
    }
}

string_enum! {
    pub enum RemoteType {
        FullyRemote => "fully-remote",
        Hybrid => "hybrid",
        OnSite => "on-site",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct JobLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub remote: bool,
    pub remote_type: Option<RemoteType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct JobRequirements {
    pub skills: Vec<String>,
    pub experience: ExperienceRange,
    pub education: EducationRequirement,
}

/// Years of experience asked for by a posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationRequirement {
    pub level: Option<String>,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub company_name: String,
    pub location: Json<JobLocation>,
    pub description: String,
    pub requirements: Json<JobRequirements>,
    pub responsibilities: Json<Vec<String>>,
    pub benefits: Json<Vec<String>>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: String,
    #[sqlx(try_from = "String")]
    pub salary_period: SalaryPeriod,
    #[sqlx(try_from = "String")]
    pub job_type: JobType,
    pub industry: Option<String>,
    #[sqlx(try_from = "String")]
    pub level: JobLevel,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    pub approved: bool,
    pub application_deadline: Option<DateTime<Utc>>,
    pub application_count: i32,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Listed publicly and open for applications.
    pub fn is_public(&self) -> bool {
        self.status == JobStatus::Active && self.approved
    }

    pub fn accepts_applications_at(&self, now: DateTime<Utc>) -> bool {
        self.is_public()
            && self
                .application_deadline
                .map(|deadline| deadline >= now)
                .unwrap_or(true)
    }
}
