use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::UserRole;
use crate::utils::token::decode_token;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    pub role: Option<String>,
}

/// The authenticated caller, resolved from the bearer token's claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_role(&self, allowed: &[UserRole]) -> Result<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "Role '{}' is not allowed to perform this action",
                self.role
            )))
        }
    }
}

impl TryFrom<&Claims> for Actor {
    type Error = Error;

    fn try_from(claims: &Claims) -> Result<Self> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::Unauthorized("invalid_token".into()))?;
        let role = claims
            .role
            .as_deref()
            .and_then(|r| r.to_ascii_lowercase().parse::<UserRole>().ok())
            .ok_or_else(|| Error::Unauthorized("invalid_token".into()))?;
        Ok(Self { id, role })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or_else(|| Error::Unauthorized("missing_authorization".into()))?;
        Actor::try_from(claims)
    }
}

fn bearer_claims(headers: &HeaderMap) -> std::result::Result<Claims, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("missing_authorization")?;
    let auth_str = auth_header.to_str().map_err(|_| "bad_authorization")?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or("unsupported_scheme")?;

    let config = crate::config::get_config();
    decode_token(token.trim(), &config.jwt_secret).ok_or("invalid_token")
}

fn unauthorized(reason: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "error": reason }))).into_response()
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match bearer_claims(req.headers()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(reason) => unauthorized(reason),
    }
}

/// Attaches claims when a valid token is present and lets anonymous
/// requests through untouched.
pub async fn optional_bearer_auth(mut req: Request, next: Next) -> Response {
    if let Ok(claims) = bearer_claims(req.headers()) {
        req.extensions_mut().insert(claims);
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: Option<&str>) -> Claims {
        Claims {
            sub: sub.to_string(),
            exp: usize::MAX,
            iat: None,
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn actor_requires_uuid_subject_and_known_role() {
        let id = Uuid::new_v4();
        let actor = Actor::try_from(&claims(&id.to_string(), Some("Employer"))).unwrap();
        assert_eq!(actor.id, id);
        assert_eq!(actor.role, UserRole::Employer);

        assert!(Actor::try_from(&claims("not-a-uuid", Some("admin"))).is_err());
        assert!(Actor::try_from(&claims(&id.to_string(), None)).is_err());
        assert!(Actor::try_from(&claims(&id.to_string(), Some("hr"))).is_err());
    }

    #[test]
    fn role_gate_is_forbidden_not_unauthorized() {
        let actor = Actor {
            id: Uuid::new_v4(),
            role: UserRole::Candidate,
        };
        assert!(actor.require_role(&[UserRole::Candidate]).is_ok());
        assert!(matches!(
            actor.require_role(&[UserRole::Employer, UserRole::Admin]),
            Err(Error::Forbidden(_))
        ));
    }
}
