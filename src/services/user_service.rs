use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::{RegisterPayload, UpdateProfilePayload};
use crate::error::{is_unique_violation, Error, Result};
use crate::models::profile::CandidateProfile;
use crate::models::user::{User, UserRole};
use crate::utils::crypto::{hash_password, verify_password};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, company_name, profile, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        if payload.role == UserRole::Admin {
            return Err(Error::Forbidden(
                "Admin accounts cannot be self-registered".into(),
            ));
        }
        let company_name = match payload.role {
            UserRole::Employer => Some(
                payload
                    .company_name
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| {
                        Error::BadRequest("Employers must provide a company name".into())
                    })?,
            ),
            _ => None,
        };
        let password_hash = hash_password(&payload.password)?;
        let email = payload.email.trim().to_lowercase();

        let query = format!(
            "INSERT INTO users (id, name, email, password_hash, role, company_name, profile)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(payload.name.trim())
            .bind(&email)
            .bind(password_hash)
            .bind(payload.role.as_str())
            .bind(company_name)
            .bind(Json(CandidateProfile::default()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::Conflict("Email is already registered".into())
                } else {
                    e.into()
                }
            })?;

        tracing::info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        match user {
            Some(user) if user.is_active && verify_password(password, &user.password_hash) => {
                Ok(user)
            }
            _ => Err(Error::Unauthorized("Invalid email or password".into())),
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".into()))
    }

    /// Profile used for scoring; `None` for anyone who is not a candidate.
    pub async fn candidate_profile(&self, id: Uuid) -> Result<Option<CandidateProfile>> {
        let user = self.get_by_id(id).await?;
        Ok((user.role == UserRole::Candidate).then_some(user.profile.0))
    }

    pub async fn update_profile(&self, id: Uuid, payload: UpdateProfilePayload) -> Result<User> {
        let user = self.get_by_id(id).await?;
        let name = payload.name.clone();
        let mut profile = user.profile.0;
        payload.apply_to(&mut profile);

        let query = format!(
            "UPDATE users
             SET name = COALESCE($2, name), profile = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(name)
            .bind(Json(profile))
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }
}
