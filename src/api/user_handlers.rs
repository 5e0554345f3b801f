use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};

use super::auth::{AdminUser, AuthUser};
use super::error::ApiError;
use super::responses::*;
use super::state::AppState;
use crate::auth::{generate_api_key, hash_api_key, mint_session_token};
use crate::database::models::NewUser;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// Exchange an API key for a short-lived session token
#[utoipa::path(
    post,
    path = "/api/v1/auth/session",
    tag = "auth",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Signed session token", body = SessionResponse),
        (status = 401, description = "Unknown or inactive key", body = ErrorResponse)
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = state
        .users
        .find_by_api_key_hash(&hash_api_key(&request.api_key))?
        .ok_or(ApiError::Unauthorized)?;

    let now = Utc::now();
    let token = mint_session_token(
        user.id,
        state.auth.session_ttl_secs,
        &state.auth.session_secret,
        now,
    );

    tracing::info!("Session opened for {}", user.email);

    Ok(Json(SessionResponse {
        token,
        expires_at: now + Duration::seconds(state.auth.session_ttl_secs),
        user: user.into(),
    }))
}

/// The caller's identity
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Resolved account", body = UserResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

/// List accounts (admin)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "All accounts", body = Vec<UserResponse>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.get_all()?.into_iter().map(Into::into).collect();

    Ok(Json(users))
}

/// Create an account (admin)
///
/// The response carries the plaintext API key; it is not retrievable
/// afterwards.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = CreateUserResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("valid email is required".to_string()));
    }

    if state.users.find_by_email(&email)?.is_some() {
        return Err(ApiError::Conflict(format!("{} is already registered", email)));
    }

    let api_key = generate_api_key();
    let user = state.users.insert(NewUser::new(
        email,
        request.display_name.trim().to_string(),
        request.role,
        hash_api_key(&api_key),
    ))?;

    tracing::info!("Account {} created", user.email);

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            user: user.into(),
            api_key,
        }),
    ))
}

/// Activate or deactivate an account (admin)
///
/// Deactivation revokes the API key and any outstanding session tokens
/// without losing the account row.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/active",
    tag = "users",
    params(("id" = i64, Path, description = "Account ID")),
    request_body = SetActiveRequest,
    responses(
        (status = 204, description = "Account updated"),
        (status = 400, description = "Cannot deactivate yourself", body = ErrorResponse),
        (status = 404, description = "Unknown account", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn set_user_active(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
    Json(request): Json<SetActiveRequest>,
) -> Result<StatusCode, ApiError> {
    if id == admin.id && !request.active {
        return Err(ApiError::BadRequest(
            "an account cannot deactivate itself".to_string(),
        ));
    }

    if state.users.set_active(id, request.active)? == 0 {
        return Err(ApiError::NotFound(format!("user {}", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Delete an account (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Cannot delete yourself", body = ErrorResponse),
        (status = 404, description = "Unknown account", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if id == admin.id {
        return Err(ApiError::BadRequest(
            "an account cannot delete itself".to_string(),
        ));
    }

    if state.users.delete(id)? == 0 {
        return Err(ApiError::NotFound(format!("user {}", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}
