use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{Job, JobStatus, SalaryPeriod};

const JOB_COLUMNS: &str = "id, employer_id, title, company_name, location, description, requirements, responsibilities, benefits, salary_min, salary_max, salary_currency, salary_period, job_type, industry, level, status, approved, application_deadline, application_count, views, created_at, updated_at";

/// Upper bound on postings scored for a recommendation request.
const RECOMMENDATION_POOL: i64 = 200;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

/// Page number, page size and row offset for a listing request. Pages past
/// the end give an offset beyond every row, so they come back empty.
fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1).saturating_mul(per_page);
    (page, per_page, offset)
}

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

pub struct JobList {
    pub items: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        employer_id: Uuid,
        company_name: String,
        payload: CreateJobPayload,
    ) -> Result<Job> {
        payload.salary.check_range()?;
        let status = payload.status.unwrap_or(JobStatus::Active);
        let period = payload.salary.period.unwrap_or(SalaryPeriod::Yearly);
        let currency = payload
            .salary
            .currency
            .clone()
            .unwrap_or_else(|| "USD".to_string())
            .to_uppercase();

        let query = format!(
            "INSERT INTO jobs (
                id, employer_id, title, company_name, location, description, requirements,
                responsibilities, benefits, salary_min, salary_max, salary_currency, salary_period,
                job_type, industry, level, status, approved, application_deadline
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, FALSE, $18
            )
            RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(Uuid::new_v4())
            .bind(employer_id)
            .bind(payload.title.trim())
            .bind(company_name)
            .bind(Json(&payload.location))
            .bind(&payload.description)
            .bind(Json(&payload.requirements))
            .bind(Json(&payload.responsibilities))
            .bind(Json(&payload.benefits))
            .bind(payload.salary.min)
            .bind(payload.salary.max)
            .bind(currency)
            .bind(period.as_str())
            .bind(payload.job_type.as_str())
            .bind(&payload.industry)
            .bind(payload.level.as_str())
            .bind(status.as_str())
            .bind(payload.application_deadline)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(job_id = %job.id, employer_id = %employer_id, "job posted");
        Ok(job)
    }

    /// Applies the whitelisted fields of `payload`; everything else keeps its
    /// stored value.
    pub async fn update(&self, id: Uuid, payload: UpdateJobPayload) -> Result<Job> {
        let current = self.get_by_id(id).await?;
        let salary = payload.salary.unwrap_or_default();
        let salary_min = salary.min.or(current.salary_min);
        let salary_max = salary.max.or(current.salary_max);
        if let (Some(min), Some(max)) = (salary_min, salary_max) {
            if min > max {
                return Err(Error::BadRequest(
                    "Salary minimum cannot exceed the maximum".into(),
                ));
            }
        }
        salary.check_range()?;

        let query = format!(
            "UPDATE jobs
            SET
                title = COALESCE($2, title),
                company_name = COALESCE($3, company_name),
                location = COALESCE($4, location),
                description = COALESCE($5, description),
                requirements = COALESCE($6, requirements),
                responsibilities = COALESCE($7, responsibilities),
                benefits = COALESCE($8, benefits),
                salary_min = $9,
                salary_max = $10,
                salary_currency = COALESCE($11, salary_currency),
                salary_period = COALESCE($12, salary_period),
                job_type = COALESCE($13, job_type),
                industry = COALESCE($14, industry),
                level = COALESCE($15, level),
                status = COALESCE($16, status),
                application_deadline = COALESCE($17, application_deadline),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(payload.title.as_deref().map(str::trim))
            .bind(payload.company_name)
            .bind(payload.location.map(Json))
            .bind(payload.description)
            .bind(payload.requirements.map(Json))
            .bind(payload.responsibilities.map(Json))
            .bind(payload.benefits.map(Json))
            .bind(salary_min)
            .bind(salary_max)
            .bind(salary.currency.map(|c| c.to_uppercase()))
            .bind(salary.period.map(|p| p.as_str()))
            .bind(payload.job_type.map(|t| t.as_str()))
            .bind(payload.industry)
            .bind(payload.level.map(|l| l.as_str()))
            .bind(payload.status.map(|s| s.as_str()))
            .bind(payload.application_deadline)
            .fetch_one(&self.pool)
            .await?;

        Ok(job)
    }

    /// Public listing: only active, approved postings.
    pub async fn list(&self, query: JobListQuery) -> Result<JobList> {
        let (page, per_page, offset) = page_window(query.page, query.limit);

        let mut filters = vec!["status = 'active'".to_string(), "approved = TRUE".to_string()];
        let mut args: Vec<String> = Vec::new();

        if let Some(search) = query.search.filter(|s| !s.trim().is_empty()) {
            let n = args.len() + 1;
            filters.push(format!(
                "(title ILIKE ${n} OR description ILIKE ${n} OR company_name ILIKE ${n})"
            ));
            args.push(format!("%{}%", search.trim()));
        }
        if let Some(city) = query.city.filter(|s| !s.trim().is_empty()) {
            filters.push(format!("location->>'city' ILIKE ${}", args.len() + 1));
            args.push(city.trim().to_string());
        }
        if let Some(country) = query.country.filter(|s| !s.trim().is_empty()) {
            filters.push(format!("location->>'country' ILIKE ${}", args.len() + 1));
            args.push(country.trim().to_string());
        }
        if let Some(job_type) = query.job_type {
            filters.push(format!("job_type = ${}", args.len() + 1));
            args.push(job_type.as_str().to_string());
        }
        if let Some(level) = query.level {
            filters.push(format!("level = ${}", args.len() + 1));
            args.push(level.as_str().to_string());
        }
        if let Some(industry) = query.industry.filter(|s| !s.trim().is_empty()) {
            filters.push(format!("industry ILIKE ${}", args.len() + 1));
            args.push(format!("%{}%", industry.trim()));
        }
        if let Some(remote) = query.remote {
            filters.push(format!(
                "COALESCE((location->>'remote')::boolean, FALSE) = ${}::boolean",
                args.len() + 1
            ));
            args.push(remote.to_string());
        }
        if let Some(salary_min) = query.salary_min {
            filters.push(format!(
                "COALESCE(salary_max, salary_min) >= ${}::numeric",
                args.len() + 1
            ));
            args.push(salary_min.to_string());
        }
        if let Some(employer) = query.employer {
            filters.push(format!("employer_id = ${}::uuid", args.len() + 1));
            args.push(employer.to_string());
        }

        let where_clause = format!("WHERE {}", filters.join(" AND "));

        let items_query = format!(
            "SELECT {} FROM jobs {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            JOB_COLUMNS,
            where_clause,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Job>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        items_statement = items_statement.bind(per_page).bind(offset);
        let items = items_statement.fetch_all(&self.pool).await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let total_pages = (total + per_page - 1) / per_page;

        Ok(JobList {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Most recent public postings, the candidate set for recommendations.
    pub async fn list_recommendation_pool(&self) -> Result<Vec<Job>> {
        let query = format!(
            "SELECT {} FROM jobs
             WHERE status = 'active' AND approved = TRUE
               AND (application_deadline IS NULL OR application_deadline >= NOW())
             ORDER BY created_at DESC
             LIMIT $1",
            JOB_COLUMNS
        );
        let items = sqlx::query_as::<_, Job>(&query)
            .bind(RECOMMENDATION_POOL)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn list_by_employer(&self, employer_id: Uuid) -> Result<Vec<Job>> {
        let query = format!(
            "SELECT {} FROM jobs WHERE employer_id = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        );
        let items = sqlx::query_as::<_, Job>(&query)
            .bind(employer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn list_pending(&self) -> Result<Vec<Job>> {
        let query = format!(
            "SELECT {} FROM jobs WHERE approved = FALSE AND status <> 'closed' ORDER BY created_at ASC",
            JOB_COLUMNS
        );
        let items = sqlx::query_as::<_, Job>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>> {
        let query = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(job)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Job> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    /// Counts a view in the database itself so concurrent readers never
    /// overwrite each other's increments.
    pub async fn record_view(&self, id: Uuid) -> Result<Job> {
        let query = format!(
            "UPDATE jobs SET views = views + 1 WHERE id = $1 RETURNING {}",
            JOB_COLUMNS
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    pub async fn set_approval(&self, id: Uuid, approved: bool) -> Result<Job> {
        let status: Option<&str> = (!approved).then_some(JobStatus::Closed.as_str());
        let query = format!(
            "UPDATE jobs
             SET approved = $2, status = COALESCE($3, status), updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .bind(approved)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Job not found".into()))?;

        tracing::info!(job_id = %id, approved, "job moderation updated");
        Ok(job)
    }

    /// Removes the posting. Its applications stay and lose their `job_id`.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Job not found".into()));
        }
        tracing::info!(job_id = %id, "job deleted");
        Ok(())
    }
}
