use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use job_portal_backend::{
    config::{get_config, init_config, CONFIG},
    database::pool::{create_pool, run_migrations},
    dto::{
        application_dto::SubmitApplicationPayload, auth_dto::RegisterPayload,
        job_dto::CreateJobPayload,
    },
    error::Error,
    middleware::auth::Actor,
    models::{profile::CandidateProfile, user::UserRole},
    routes::app_router,
    services::{
        application_service::ensure_can_manage,
        lifecycle_service::{EvaluationPatch, LifecycleTracker},
    },
    utils::{crypto::hash_password, time, token::issue_token},
    AppState,
};
use sqlx::PgPool;

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null))
}

async fn setup() -> PgPool {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("API_RPS", "1000");
    env::set_var("AUTH_RPS", "1000");

    if CONFIG.get().is_none() {
        // Tests in this binary share one config built from the same environment.
        init_config().ok();
    }
    let pool = create_pool().await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn hiring_flow_end_to_end() {
    let pool = setup().await;

    let run = Uuid::new_v4().simple().to_string();

    let admin_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role) VALUES ($1, $2, $3, $4, 'admin')",
    )
    .bind(admin_id)
    .bind("Admin")
    .bind(format!("admin_{}@example.com", run))
    .bind(hash_password("admin-password").unwrap())
    .execute(&pool)
    .await
    .expect("seed admin");
    let config = get_config();
    let admin = issue_token(admin_id, UserRole::Admin, &config.jwt_secret, 1).unwrap();

    let app = app_router(config).with_state(AppState::new(pool.clone()));

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Hiring Manager",
            "email": format!("employer_{}@example.com", run),
            "password": "employer-password",
            "role": "employer",
            "companyName": "Acme"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let employer = body["token"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Candidate",
            "email": format!("candidate_{}@example.com", run),
            "password": "candidate-password",
            "role": "candidate"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let candidate = body["token"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        "PUT",
        "/api/users/profile",
        Some(&candidate),
        Some(json!({
            "skills": ["JavaScript", "React"],
            "experience": [{ "title": "Dev", "company": "A", "current": false }],
            "location": { "city": "Lisbon", "country": "Portugal" },
            "preferredJobTypes": ["full-time"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, job) = call(
        &app,
        "POST",
        "/api/jobs",
        Some(&employer),
        Some(json!({
            "title": format!("Frontend Engineer {}", run),
            "description": "Build the UI",
            "jobType": "full-time",
            "level": "entry",
            "location": { "city": "Lisbon", "country": "Portugal" },
            "requirements": { "skills": ["React", "Node.js", "MongoDB"] }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{job}");
    assert_eq!(job["approved"], false);
    let job_id = job["id"].as_str().unwrap().to_string();

    // Unapproved postings take no applications.
    let (status, _) = call(
        &app,
        "POST",
        "/api/applications",
        Some(&candidate),
        Some(json!({ "jobId": job_id, "coverLetter": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/admin/jobs/{}/approve", job_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, detail) = call(&app, "GET", &format!("/api/jobs/{}", job_id), Some(&candidate), None).await;
    assert_eq!(status, StatusCode::OK);
    // 16 skills + 20 city + 15 type + 15 level
    assert_eq!(detail["matchScore"], 66);
    assert_eq!(detail["views"], 1);

    let (_, anonymous) = call(&app, "GET", &format!("/api/jobs/{}", job_id), None, None).await;
    assert!(anonymous.get("matchScore").is_none());
    assert_eq!(anonymous["views"], 2);

    let (status, application) = call(
        &app,
        "POST",
        "/api/applications",
        Some(&candidate),
        Some(json!({ "jobId": job_id, "coverLetter": "I would love to join" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{application}");
    // two skills, one experience entry
    assert_eq!(application["matchScore"], 25);
    assert_eq!(application["status"], "applied");
    let app_id = application["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        "POST",
        "/api/applications",
        Some(&candidate),
        Some(json!({ "jobId": job_id, "coverLetter": "Again" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You have already applied for this job");

    let (_, job) = call(&app, "GET", &format!("/api/jobs/{}", job_id), Some(&employer), None).await;
    assert_eq!(job["applicationCount"], 1);

    let (status, _) = call(
        &app,
        "PUT",
        &format!("/api/applications/{}/status", app_id),
        Some(&candidate),
        Some(json!({ "status": "hired" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/api/applications/{}/status", app_id),
        Some(&employer),
        Some(json!({ "status": "reviewing", "notes": "Strong profile" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timeline"].as_array().unwrap().len(), 2);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/applications/{}/interview", app_id),
        Some(&employer),
        Some(json!({ "scheduledAt": "2030-01-15T10:00:00Z", "type": "video" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "interview-scheduled");

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/applications/{}/accept-offer", app_id),
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/applications/{}/offer", app_id),
        Some(&employer),
        Some(json!({ "salary": 55000, "currency": "eur" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/applications/{}/accept-offer", app_id),
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "hired");
    assert_eq!(body["offer"]["accepted"], true);
    let timeline = body["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 5);
    let actions: Vec<&str> = timeline.iter().map(|e| e["action"].as_str().unwrap()).collect();
    assert_eq!(
        actions,
        ["applied", "reviewing", "interview-scheduled", "offered", "hired"]
    );

    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/applications/{}/withdraw", app_id),
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/applications/{}/communications", app_id),
        Some(&candidate),
        Some(json!({ "message": "Thank you!" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["communications"][0]["type"], "message");
    assert_eq!(body["status"], "hired");

    let (status, list) = call(
        &app,
        "GET",
        &format!("/api/jobs/{}/applications", job_id),
        Some(&employer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);

    let (status, page) = call(&app, "GET", "/api/jobs?page=9223372036854775807", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 0);

    // Deleting the posting keeps the application on record.
    let (status, _) = call(&app, "DELETE", &format!("/api/jobs/{}", job_id), Some(&employer), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, kept) = call(
        &app,
        "GET",
        &format!("/api/applications/{}", app_id),
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(kept["jobId"].is_null());
    assert_eq!(kept["status"], "hired");

    let (_, mine) = call(&app, "GET", "/api/applications/mine", Some(&candidate), None).await;
    assert_eq!(mine["total"], 1);
}

#[tokio::test]
#[ignore = "needs a PostgreSQL database in DATABASE_URL"]
async fn stale_application_write_is_rejected() {
    let state = AppState::new(setup().await);
    let run = Uuid::new_v4().simple().to_string();

    let employer = state
        .user_service
        .register(RegisterPayload {
            name: "Recruiter".into(),
            email: format!("recruiter_{}@example.com", run),
            password: "recruiter-password".into(),
            role: UserRole::Employer,
            company_name: Some("Acme".into()),
        })
        .await
        .expect("employer");
    let candidate = state
        .user_service
        .register(RegisterPayload {
            name: "Applicant".into(),
            email: format!("applicant_{}@example.com", run),
            password: "applicant-password".into(),
            role: UserRole::Candidate,
            company_name: None,
        })
        .await
        .expect("candidate");

    let posting: CreateJobPayload = serde_json::from_value(json!({
        "title": format!("Data Engineer {}", run),
        "description": "Pipelines",
        "jobType": "contract",
        "level": "mid"
    }))
    .unwrap();
    let job = state
        .job_service
        .create(employer.id, "Acme".into(), posting)
        .await
        .expect("job");
    state.job_service.set_approval(job.id, true).await.expect("approve");

    let submission: SubmitApplicationPayload =
        serde_json::from_value(json!({ "jobId": job.id, "coverLetter": "Hello" })).unwrap();
    let submitted = state
        .application_service
        .submit(candidate.id, CandidateProfile::default(), submission)
        .await
        .expect("submit");

    let reviewer = Actor {
        id: employer.id,
        role: UserRole::Employer,
    };
    let rating = |overall: u8| EvaluationPatch {
        overall: Some(overall),
        ..Default::default()
    };

    // Two reviewers start from the same copy; the status never changes.
    let loaded = state
        .application_service
        .get_by_id(submitted.id)
        .await
        .expect("load");
    let stale = loaded.clone();

    let stored = state
        .application_service
        .apply_to(&reviewer, loaded, ensure_can_manage, |app| {
            Ok(LifecycleTracker::evaluate(app, rating(4), reviewer.id, time::now()))
        })
        .await
        .expect("first write");
    assert_eq!(stored.version, submitted.version + 1);

    let err = state
        .application_service
        .apply_to(&reviewer, stale, ensure_can_manage, |app| {
            Ok(LifecycleTracker::evaluate(app, rating(2), reviewer.id, time::now()))
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let current = state
        .application_service
        .get_by_id(submitted.id)
        .await
        .expect("reload");
    assert_eq!(current.evaluation.map(|e| e.0.overall), Some(Some(4)));
    assert_eq!(current.version, stored.version);
}
