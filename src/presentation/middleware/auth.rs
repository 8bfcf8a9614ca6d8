//! Authentication Middleware
//!
//! JWT validation middleware for protected routes, plus the admin gate
//! layered on top of it for moderation endpoints.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::application::services::{decode_access_token, AuthError};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authenticated student extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub student_id: i64,
    pub is_admin: bool,
}

/// Authentication middleware that validates JWT access tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer
        .ok_or_else(|| AppError::Unauthorized("Missing or malformed authorization header".into()))?;

    let claims = decode_access_token(bearer.token(), &state.settings.jwt.secret).map_err(|e| {
        match e {
            AuthError::TokenExpired => AppError::Unauthorized("Token expired".into()),
            _ => AppError::Unauthorized("Invalid token".into()),
        }
    })?;

    let student_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid token claims".into()))?;

    request.extensions_mut().insert(AuthUser {
        student_id,
        is_admin: claims.adm,
    });

    Ok(next.run(request).await)
}

/// Admin gate; must run after `auth_middleware` so the extension exists.
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;

    if !auth_user.is_admin {
        return Err(AppError::Forbidden("Admin access required".into()));
    }

    Ok(next.run(request).await)
}
