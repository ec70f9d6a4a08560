use std::sync::Arc;

use axum::{extract::{rejection::JsonRejection, State}, http::StatusCode, Json};
use serde::Serialize;

use service::auth::domain::{AuthProfile, GoogleLoginInput, LoginInput, SignupInput, UserSummary};
use service::auth::AuthService;

use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService>,
}

/// Body of every successful signup/login
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub profile: AuthProfile,
}

impl SessionResponse {
    fn new(message: &'static str, profile: AuthProfile) -> Self {
        Self { message, profile }
    }
}

#[utoipa::path(
    post, path = "/api/auth/signup", tag = "auth",
    request_body = crate::openapi::SignupRequest,
    responses(
        (status = 201, description = "Registered", body = crate::openapi::SessionResponseDoc),
        (status = 400, description = "Duplicate email or invalid body", body = crate::openapi::ErrorResponseDoc),
        (status = 500, description = "Signup failed", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn signup(
    State(state): State<ServerState>,
    payload: Result<Json<SignupInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let Json(input) = payload.map_err(ApiError::from_rejection)?;
    let profile = state.auth.signup(input).await.map_err(|e| ApiError::from_auth(e, "Signup failed"))?;
    Ok((StatusCode::CREATED, Json(SessionResponse::new("User registered successfully", profile))))
}

#[utoipa::path(
    post, path = "/api/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = crate::openapi::SessionResponseDoc),
        (status = 400, description = "Account must use Google login", body = crate::openapi::ErrorResponseDoc),
        (status = 401, description = "Invalid credentials", body = crate::openapi::ErrorResponseDoc),
        (status = 404, description = "User not found", body = crate::openapi::ErrorResponseDoc),
        (status = 500, description = "Login failed", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Json(input) = payload.map_err(ApiError::from_rejection)?;
    let profile = state.auth.login(input).await.map_err(|e| ApiError::from_auth(e, "Login failed"))?;
    Ok(Json(SessionResponse::new("Login successful", profile)))
}

#[utoipa::path(
    post, path = "/api/auth/google", tag = "auth",
    request_body = crate::openapi::GoogleLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = crate::openapi::SessionResponseDoc),
        (status = 401, description = "Google authentication failed", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn google_login(
    State(state): State<ServerState>,
    payload: Result<Json<GoogleLoginInput>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Json(input) = payload.map_err(ApiError::from_rejection)?;
    let profile = state
        .auth
        .google_login(&input.token)
        .await
        .map_err(|e| ApiError::from_auth(e, "Google authentication failed"))?;
    Ok(Json(SessionResponse::new("Google login successful", profile)))
}

#[utoipa::path(
    get, path = "/api/auth/students", tag = "auth",
    responses(
        (status = 200, description = "All students", body = [crate::openapi::StudentDoc]),
        (status = 500, description = "Failed to fetch students", body = crate::openapi::ErrorResponseDoc)
    )
)]
pub async fn list_students(State(state): State<ServerState>) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let students = state
        .auth
        .list_students()
        .await
        .map_err(|e| ApiError::from_auth(e, "Failed to fetch students"))?;
    Ok(Json(students))
}
