//! Bearer-credential extractors
//!
//! Every business route takes `AuthUser` (or `AdminUser`) as an
//! argument; the cron route takes `CronGuard`. Extraction failures map
//! to 401/403 through `ApiError`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;

use super::error::ApiError;
use super::state::AppState;
use crate::auth::{constant_time_eq, hash_api_key, verify_session_token};
use crate::database::models::User;

/// Any authenticated, active account
pub struct AuthUser(pub User);

/// An authenticated account with the admin role
pub struct AdminUser(pub User);

/// The cron shared secret (scheduler-triggered endpoints)
pub struct CronGuard;

#[async_trait::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = bearer_credential(parts).ok_or(ApiError::Unauthorized)?;

        // Session tokens are self-describing; try them first
        if let Some(user_id) =
            verify_session_token(&credential, &state.auth.session_secret, Utc::now())
        {
            let user = state
                .users
                .find_by_id(user_id)?
                .filter(|u| u.is_active)
                .ok_or(ApiError::Unauthorized)?;
            return Ok(Self(user));
        }

        // Fall back to a long-lived API key
        let user = state
            .users
            .find_by_api_key_hash(&hash_api_key(&credential))?
            .ok_or(ApiError::Unauthorized)?;

        Ok(Self(user))
    }
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(ApiError::Forbidden("admin role required".to_string()));
        }

        Ok(Self(user))
    }
}

#[async_trait::async_trait]
impl FromRequestParts<AppState> for CronGuard {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = bearer_credential(parts).ok_or(ApiError::Unauthorized)?;

        if !constant_time_eq(&credential, &state.auth.cron_secret) {
            return Err(ApiError::Unauthorized);
        }

        Ok(Self)
    }
}

fn bearer_credential(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/leads");
        if let Some(value) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_bearer_credential_extraction() {
        let parts = parts_with_auth(Some("Bearer abc123"));
        assert_eq!(bearer_credential(&parts).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_missing_header() {
        let parts = parts_with_auth(None);
        assert!(bearer_credential(&parts).is_none());
    }

    #[test]
    fn test_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic abc123"));
        assert!(bearer_credential(&parts).is_none());
    }

    #[test]
    fn test_empty_token() {
        let parts = parts_with_auth(Some("Bearer "));
        assert!(bearer_credential(&parts).is_none());
    }
}
