use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use validator::Validate;

use crate::{
    config::get_config,
    dto::auth_dto::{AuthResponse, LoginPayload, RegisterPayload, UpdateProfilePayload, UserResponse},
    error::Result,
    middleware::auth::Actor,
    models::user::{User, UserRole},
    utils::token::issue_token,
    AppState,
};

fn auth_response(user: User) -> Result<AuthResponse> {
    let config = get_config();
    let token = issue_token(user.id, user.role, &config.jwt_secret, config.jwt_ttl_hours)?;
    Ok(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid payload or email already registered"),
        (status = 403, description = "Role cannot be self-registered")
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(auth_response(user)?)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .authenticate(&payload.email, &payload.password)
        .await?;
    tracing::info!(user_id = %user.id, "user signed in");
    Ok(Json(auth_response(user)?))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
#[axum::debug_handler]
pub async fn me(State(state): State<AppState>, actor: Actor) -> Result<impl IntoResponse> {
    let user = state.user_service.get_by_id(actor.id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not a candidate")
    )
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    actor.require_role(&[UserRole::Candidate])?;
    payload.validate()?;
    let user = state.user_service.update_profile(actor.id, payload).await?;
    Ok(Json(UserResponse::from(user)))
}
