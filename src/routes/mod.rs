pub mod admin;
pub mod applications;
pub mod auth;
pub mod docs;
pub mod health;
pub mod jobs;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};

use crate::{
    config::Config,
    middleware::{
        auth::{optional_bearer_auth, require_bearer_auth},
        rate_limit::{rps_middleware, RateLimiter},
    },
    AppState,
};

/// Every route the service exposes, with auth and rate limiting applied.
pub fn app_router(config: &Config) -> Router<AppState> {
    let auth_api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .layer(from_fn_with_state(
            RateLimiter::new(config.auth_rps),
            rps_middleware,
        ));

    let public_api = Router::new()
        .route("/api/jobs", get(jobs::list_jobs))
        .route("/api/jobs/:id", get(jobs::get_job))
        .layer(from_fn(optional_bearer_auth));

    let protected_api = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/users/profile", put(auth::update_profile))
        .route("/api/jobs", post(jobs::create_job))
        .route("/api/jobs/recommended", get(jobs::recommended_jobs))
        .route("/api/jobs/mine", get(jobs::my_jobs))
        .route(
            "/api/jobs/:id",
            put(jobs::update_job).delete(jobs::delete_job),
        )
        .route("/api/jobs/:id/applications", get(jobs::job_applications))
        .route("/api/admin/jobs/pending", get(admin::pending_jobs))
        .route("/api/admin/jobs/:id/approve", put(admin::approve_job))
        .route("/api/admin/jobs/:id/reject", put(admin::reject_job))
        .route("/api/applications", post(applications::submit_application))
        .route("/api/applications/mine", get(applications::my_applications))
        .route("/api/applications/:id", get(applications::get_application))
        .route(
            "/api/applications/:id/status",
            put(applications::update_status),
        )
        .route(
            "/api/applications/:id/interview",
            post(applications::schedule_interview),
        )
        .route(
            "/api/applications/:id/evaluate",
            post(applications::evaluate),
        )
        .route("/api/applications/:id/offer", post(applications::make_offer))
        .route(
            "/api/applications/:id/accept-offer",
            post(applications::accept_offer),
        )
        .route(
            "/api/applications/:id/withdraw",
            post(applications::withdraw),
        )
        .route(
            "/api/applications/:id/communications",
            post(applications::add_communication),
        )
        .layer(from_fn(require_bearer_auth));

    let api = auth_api
        .merge(public_api)
        .merge(protected_api)
        .layer(from_fn_with_state(
            RateLimiter::new(config.api_rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/docs/openapi.json", get(docs::openapi_json))
        .merge(api)
}
