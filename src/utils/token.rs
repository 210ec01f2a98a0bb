use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::user::UserRole;

pub fn issue_token(user_id: Uuid, role: UserRole, secret: &str, ttl_hours: i64) -> Result<String> {
    let now = crate::utils::time::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
        iat: Some(now.timestamp() as usize),
        role: Some(role.as_str().to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to sign token: {}", e)))
}

pub fn decode_token(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_decode_with_the_same_secret() {
        let id = Uuid::new_v4();
        let token = issue_token(id, UserRole::Employer, "secret", 1).unwrap();
        let claims = decode_token(&token, "secret").expect("valid token");
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.role.as_deref(), Some("employer"));
        assert!(decode_token(&token, "other-secret").is_none());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = issue_token(Uuid::new_v4(), UserRole::Candidate, "secret", -2).unwrap();
        assert!(decode_token(&token, "secret").is_none());
    }
}
