use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, models::Role};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden(format!(
            "requires role '{}', current role is '{}'",
            role.as_str(),
            user.role.as_str()
        )));
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

pub fn ensure_seller(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Seller)
}

/// Pull the JWT from the Authorization header, falling back to the
/// `authToken` cookie the web client sets.
fn extract_token(parts: &axum::http::request::Parts) -> Result<String, AppError> {
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;
        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        }
        return Ok(auth_str.trim_start_matches("Bearer ").trim().to_string());
    }

    if let Some(cookie_header) = parts.headers.get(header::COOKIE) {
        let cookies = cookie_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid cookie header".into()))?;
        for pair in cookies.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                if name == "authToken" {
                    return Ok(value.trim().to_string());
                }
            }
        }
    }

    Err(AppError::Unauthorized("Missing credentials".into()))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        Ok(AuthUser {
            user_id,
            email: decoded.claims.email.clone(),
            role: decoded.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            role,
        }
    }

    #[test]
    fn ensure_role_matches() {
        assert!(ensure_admin(&auth(Role::Admin)).is_ok());
        assert!(ensure_seller(&auth(Role::Seller)).is_ok());
    }

    #[test]
    fn ensure_role_reports_required_and_actual() {
        let err = ensure_admin(&auth(Role::Seller)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("admin"), "{msg}");
        assert!(msg.contains("seller"), "{msg}");
    }
}
