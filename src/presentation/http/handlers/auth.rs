//! Authentication Handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::application::dto::request::{LoginRequest, RefreshTokenRequest, RegisterRequest};
use crate::application::dto::response::{RegisterResponse, StudentResponse, TokenResponse};
use crate::application::services::{AuthError, AuthService, AuthServiceImpl, RegisterDto};
use crate::config::JwtSettings;
use crate::domain::{Gender, Seeking};
use crate::infrastructure::repositories::{
    PgSessionRepository, PgSettingsRepository, PgStudentRepository,
};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn auth_service(
    state: &AppState,
) -> AuthServiceImpl<PgStudentRepository, PgSessionRepository, PgSettingsRepository> {
    let jwt_settings = JwtSettings {
        secret: state.settings.jwt.secret.clone(),
        access_token_expiry_minutes: state.settings.jwt.access_token_expiry_minutes,
        refresh_token_expiry_days: state.settings.jwt.refresh_token_expiry_days,
    };
    AuthServiceImpl::new(
        Arc::new(PgStudentRepository::new(state.db.clone())),
        Arc::new(PgSessionRepository::new(state.db.clone())),
        Arc::new(PgSettingsRepository::new(state.db.clone())),
        state.snowflake.clone(),
        jwt_settings,
    )
}

fn map_auth_error(e: AuthError) -> AppError {
    match e {
        AuthError::EmailExists => AppError::Conflict("Email already registered".into()),
        AuthError::Underage => AppError::BusinessRule("Students must be at least 18".into()),
        AuthError::InvalidCredentials => {
            AppError::Unauthorized("Invalid email or password".into())
        }
        AuthError::Banned => AppError::Forbidden("Account is banned".into()),
        AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
        AuthError::InvalidToken | AuthError::SessionNotFound => {
            AppError::Unauthorized("Invalid token".into())
        }
        AuthError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Register a new student
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let service = auth_service(&state);

    let dto = RegisterDto {
        email: body.email,
        password: body.password,
        name: body.name,
        birthdate: body.birthdate,
        gender: Gender::from_str(body.gender.as_deref().unwrap_or("unspecified")),
        seeking: Seeking::from_str(body.seeking.as_deref().unwrap_or("everyone")),
        campus: body.campus,
    };

    let (student, tokens) = service.register(dto).await.map_err(map_auth_error)?;

    let response = RegisterResponse {
        student: StudentResponse::from_student(student, true),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        token_type: tokens.token_type,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with credentials
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let service = auth_service(&state);

    let tokens = service
        .authenticate(&body.email, &body.password)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(TokenResponse::from(tokens)))
}

/// Rotate a refresh token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let service = auth_service(&state);

    let tokens = service
        .refresh_token(&body.refresh_token)
        .await
        .map_err(map_auth_error)?;

    Ok(Json(TokenResponse::from(tokens)))
}

/// Revoke the presented refresh token
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<StatusCode, AppError> {
    let service = auth_service(&state);

    service
        .revoke_token(&body.refresh_token)
        .await
        .map_err(map_auth_error)?;

    Ok(StatusCode::NO_CONTENT)
}
