//! Discovery Feed Handler

use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};

use crate::application::dto::request::FeedQuery;
use crate::application::dto::response::CandidateResponse;
use crate::application::services::{DiscoveryError, DiscoveryService, DiscoveryServiceImpl};
use crate::infrastructure::repositories::{
    PgPhotoRepository, PgSettingsRepository, PgStudentRepository,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Candidate feed for the authenticated student
pub async fn get_feed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<CandidateResponse>>, AppError> {
    let service = DiscoveryServiceImpl::new(
        Arc::new(PgStudentRepository::new(state.db.clone())),
        Arc::new(PgPhotoRepository::new(state.db.clone())),
        Arc::new(PgSettingsRepository::new(state.db.clone())),
        state.settings.discovery.max_feed_size,
    );

    let limit = query
        .limit
        .unwrap_or(state.settings.discovery.max_feed_size);

    let candidates = service
        .feed(auth.student_id, limit)
        .await
        .map_err(map_discovery_error)?;

    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

fn map_discovery_error(e: DiscoveryError) -> AppError {
    match e {
        DiscoveryError::NotFound => AppError::NotFound("Student not found".into()),
        DiscoveryError::Internal(msg) => AppError::Internal(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_errors_map_to_app_errors() {
        assert!(matches!(
            map_discovery_error(DiscoveryError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            map_discovery_error(DiscoveryError::Internal("db down".into())),
            AppError::Internal(_)
        ));
    }
}
