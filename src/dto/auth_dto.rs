use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::job::JobType;
use crate::models::profile::{
    Availability, CandidateLocation, CandidateProfile, EducationEntry, ExperienceEntry,
    SalaryExpectation,
};
use crate::models::user::{User, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: UserRole,
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Profile fields a candidate may edit. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub headline: Option<String>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
    #[validate(length(max = 100))]
    pub skills: Option<Vec<String>>,
    #[validate(length(max = 50))]
    pub experience: Option<Vec<ExperienceEntry>>,
    #[validate(length(max = 20))]
    pub education: Option<Vec<EducationEntry>>,
    #[validate(url)]
    pub resume: Option<String>,
    pub location: Option<CandidateLocation>,
    pub preferred_job_types: Option<Vec<JobType>>,
    pub salary_expectation: Option<SalaryExpectation>,
    pub availability: Option<Availability>,
}

impl UpdateProfilePayload {
    pub fn apply_to(self, profile: &mut CandidateProfile) {
        if let Some(headline) = self.headline {
            profile.headline = Some(headline);
        }
        if let Some(bio) = self.bio {
            profile.bio = Some(bio);
        }
        if let Some(skills) = self.skills {
            let mut seen = std::collections::HashSet::new();
            profile.skills = skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
                .collect();
        }
        if let Some(experience) = self.experience {
            profile.experience = experience;
        }
        if let Some(education) = self.education {
            profile.education = education;
        }
        if let Some(resume) = self.resume {
            profile.resume = Some(resume);
        }
        if let Some(location) = self.location {
            profile.location = Some(location);
        }
        if let Some(types) = self.preferred_job_types {
            profile.preferred_job_types = types;
        }
        if let Some(expectation) = self.salary_expectation {
            profile.salary_expectation = Some(expectation);
        }
        if let Some(availability) = self.availability {
            profile.availability = Some(availability);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<CandidateProfile>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let profile = (value.role == UserRole::Candidate).then_some(value.profile.0);
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            company_name: value.company_name,
            profile,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::assert_err;

    #[test]
    fn register_requires_a_valid_email() {
        let payload: RegisterPayload = serde_json::from_value(json!({
            "name": "Sam",
            "email": "not-an-email",
            "password": "long enough",
            "role": "candidate"
        }))
        .unwrap();
        assert_err!(payload.validate());
    }

    #[test]
    fn profile_update_only_touches_supplied_fields() {
        let mut profile = CandidateProfile {
            headline: Some("Engineer".into()),
            skills: vec!["Go".into()],
            ..Default::default()
        };
        let payload: UpdateProfilePayload = serde_json::from_value(json!({
            "skills": [" Rust ", "rust", "", "SQL"],
            "preferredJobTypes": ["contract"]
        }))
        .unwrap();
        payload.apply_to(&mut profile);

        assert_eq!(profile.headline.as_deref(), Some("Engineer"));
        assert_eq!(profile.skills, vec!["Rust".to_string(), "SQL".to_string()]);
        assert_eq!(profile.preferred_job_types, vec![JobType::Contract]);
    }
}
