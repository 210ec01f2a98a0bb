use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::SubmitApplicationPayload;
use crate::error::{is_unique_violation, Error, Result};
use crate::middleware::auth::Actor;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::profile::CandidateProfile;
use crate::services::job_service::JobService;
use crate::services::lifecycle_service::{Appended, LifecycleTracker};
use crate::services::match_service::MatchService;
use crate::utils::time;

const APPLICATION_COLUMNS: &str = "id, job_id, applicant_id, employer_id, status, cover_letter, resume, answers, match_score, skills, experience, education, interview, evaluation, offer, timeline, communications, version, created_at, updated_at";

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    jobs: JobService,
}

/// Who may do what with an application.
pub fn ensure_can_view(actor: &Actor, app: &Application) -> Result<()> {
    if actor.is_admin() || actor.id == app.applicant_id || actor.id == app.employer_id {
        Ok(())
    } else {
        Err(Error::Forbidden("Not authorized to access this application".into()))
    }
}

pub fn ensure_can_manage(actor: &Actor, app: &Application) -> Result<()> {
    if actor.is_admin() || actor.id == app.employer_id {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "Only the hiring employer or an admin can manage this application".into(),
        ))
    }
}

pub fn ensure_is_applicant(actor: &Actor, app: &Application) -> Result<()> {
    if actor.id == app.applicant_id {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "Only the applicant can perform this action".into(),
        ))
    }
}

impl ApplicationService {
    pub fn new(pool: PgPool, jobs: JobService) -> Self {
        Self { pool, jobs }
    }

    /// Creates the application and bumps the job's counter in one
    /// transaction. The (job, applicant) unique key turns a concurrent
    /// duplicate into a conflict instead of a second row.
    pub async fn submit(
        &self,
        applicant_id: Uuid,
        profile: CandidateProfile,
        payload: SubmitApplicationPayload,
    ) -> Result<Application> {
        let now = time::now();
        let job = self
            .jobs
            .find_by_id(payload.job_id)
            .await?
            .filter(|job| job.accepts_applications_at(now))
            .ok_or_else(|| {
                Error::BadRequest("Job is not available for applications".into())
            })?;

        let score = MatchService::submission_match_score(
            profile.skills.len(),
            profile.experience.len(),
            profile.education.len(),
        );
        let resume = payload.resume.clone().or(profile.resume.clone());
        let timeline = vec![LifecycleTracker::submitted(applicant_id, now)];

        let mut tx = self.pool.begin().await?;

        let query = format!(
            "INSERT INTO applications (
                id, job_id, applicant_id, employer_id, status, cover_letter, resume, answers,
                match_score, skills, experience, education, timeline, communications
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, '[]'::jsonb)
            RETURNING {}",
            APPLICATION_COLUMNS
        );
        let inserted = sqlx::query_as::<_, Application>(&query)
            .bind(Uuid::new_v4())
            .bind(job.id)
            .bind(applicant_id)
            .bind(job.employer_id)
            .bind(ApplicationStatus::Applied.as_str())
            .bind(&payload.cover_letter)
            .bind(resume)
            .bind(Json(&payload.answers))
            .bind(score)
            .bind(Json(&profile.skills))
            .bind(Json(&profile.experience))
            .bind(Json(&profile.education))
            .bind(Json(&timeline))
            .fetch_one(&mut *tx)
            .await;

        let application = match inserted {
            Ok(app) => app,
            Err(e) if is_unique_violation(&e) => {
                return Err(Error::Conflict(
                    "You have already applied for this job".into(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        sqlx::query(
            "UPDATE jobs SET application_count = application_count + 1 WHERE id = $1",
        )
        .bind(job.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            application_id = %application.id,
            job_id = %job.id,
            applicant_id = %applicant_id,
            match_score = score,
            "application submitted"
        );
        Ok(application)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Application> {
        let query = format!("SELECT {} FROM applications WHERE id = $1", APPLICATION_COLUMNS);
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))
    }

    pub async fn get_for(&self, actor: &Actor, id: Uuid) -> Result<Application> {
        let app = self.get_by_id(id).await?;
        ensure_can_view(actor, &app)?;
        Ok(app)
    }

    pub async fn list_for_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE applicant_id = $1 ORDER BY created_at DESC",
            APPLICATION_COLUMNS
        );
        let items = sqlx::query_as::<_, Application>(&query)
            .bind(applicant_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn list_for_job(&self, job_id: Uuid) -> Result<Vec<Application>> {
        let query = format!(
            "SELECT {} FROM applications WHERE job_id = $1 ORDER BY match_score DESC, created_at ASC",
            APPLICATION_COLUMNS
        );
        let items = sqlx::query_as::<_, Application>(&query)
            .bind(job_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Loads the application, checks the caller, runs `op` and stores the
    /// result. Nothing is written when `authorize` or `op` fails.
    pub async fn apply<A, F>(&self, actor: &Actor, id: Uuid, authorize: A, op: F) -> Result<Application>
    where
        A: FnOnce(&Actor, &Application) -> Result<()>,
        F: FnOnce(&mut Application) -> Result<Appended>,
    {
        let app = self.get_by_id(id).await?;
        self.apply_to(actor, app, authorize, op).await
    }

    /// Same as [`ApplicationService::apply`] on an already loaded row. The
    /// write only lands if the row still has the version that was loaded.
    pub async fn apply_to<A, F>(
        &self,
        actor: &Actor,
        mut app: Application,
        authorize: A,
        op: F,
    ) -> Result<Application>
    where
        A: FnOnce(&Actor, &Application) -> Result<()>,
        F: FnOnce(&mut Application) -> Result<Appended>,
    {
        authorize(actor, &app)?;
        let from = app.status;
        let appended = op(&mut app)?;
        let stored = self.persist(&app, &appended).await?;

        if let Some(entry) = appended.timeline.last() {
            tracing::info!(
                application_id = %app.id,
                actor = %actor.id,
                from = %from,
                to = %entry.action,
                "application status changed"
            );
        }
        Ok(stored)
    }

    /// Writes sub-records and status, and appends the new log entries in the
    /// database. Guarded on `version`, so a second write from a stale copy
    /// is rejected instead of overwriting.
    async fn persist(&self, app: &Application, appended: &Appended) -> Result<Application> {
        let query = format!(
            "UPDATE applications
            SET
                status = $3,
                interview = $4,
                evaluation = $5,
                offer = $6,
                timeline = timeline || $7,
                communications = communications || $8,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING {}",
            APPLICATION_COLUMNS
        );
        let stored = sqlx::query_as::<_, Application>(&query)
            .bind(app.id)
            .bind(app.version)
            .bind(app.status.as_str())
            .bind(app.interview.as_ref().map(|j| Json(&j.0)))
            .bind(app.evaluation.as_ref().map(|j| Json(&j.0)))
            .bind(app.offer.as_ref().map(|j| Json(&j.0)))
            .bind(Json(&appended.timeline))
            .bind(Json(&appended.communications))
            .fetch_optional(&self.pool)
            .await?;

        stored.ok_or_else(|| {
            tracing::warn!(application_id = %app.id, version = app.version, "stale application write");
            Error::Conflict("Application was modified by another request, please retry".into())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use chrono::Utc;

    fn application() -> Application {
        Application {
            id: Uuid::new_v4(),
            job_id: Some(Uuid::new_v4()),
            applicant_id: Uuid::new_v4(),
            employer_id: Uuid::new_v4(),
            status: ApplicationStatus::Applied,
            cover_letter: "Hi".into(),
            resume: None,
            answers: Json(vec![]),
            match_score: 0,
            skills: Json(vec![]),
            experience: Json(vec![]),
            education: Json(vec![]),
            interview: None,
            evaluation: None,
            offer: None,
            timeline: Json(vec![]),
            communications: Json(vec![]),
            version: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn actor(id: Uuid, role: UserRole) -> Actor {
        Actor { id, role }
    }

    #[test]
    fn owning_employer_and_admin_manage() {
        let app = application();
        assert!(ensure_can_manage(&actor(app.employer_id, UserRole::Employer), &app).is_ok());
        assert!(ensure_can_manage(&actor(Uuid::new_v4(), UserRole::Admin), &app).is_ok());
        assert!(matches!(
            ensure_can_manage(&actor(Uuid::new_v4(), UserRole::Employer), &app),
            Err(Error::Forbidden(_))
        ));
        assert!(ensure_can_manage(&actor(app.applicant_id, UserRole::Candidate), &app).is_err());
    }

    #[test]
    fn only_the_applicant_accepts_or_withdraws() {
        let app = application();
        assert!(ensure_is_applicant(&actor(app.applicant_id, UserRole::Candidate), &app).is_ok());
        assert!(ensure_is_applicant(&actor(app.employer_id, UserRole::Employer), &app).is_err());
        assert!(ensure_is_applicant(&actor(Uuid::new_v4(), UserRole::Admin), &app).is_err());
    }

    #[test]
    fn strangers_cannot_view() {
        let app = application();
        assert!(ensure_can_view(&actor(app.applicant_id, UserRole::Candidate), &app).is_ok());
        assert!(ensure_can_view(&actor(app.employer_id, UserRole::Employer), &app).is_ok());
        assert!(ensure_can_view(&actor(Uuid::new_v4(), UserRole::Candidate), &app).is_err());
    }
}
