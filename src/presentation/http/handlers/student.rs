//! Student Profile Handlers
//!
//! Own-profile management plus the public profile view other students
//! see. Photo, interest, and prompt sub-resources all live here.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{
    AddPhotoRequest, AnswerPromptRequest, SetInterestsRequest, UpdateProfileRequest,
    UpdateSettingsRequest,
};
use crate::application::dto::response::{
    InterestResponse, PhotoResponse, ProfileResponse, PromptAnswerResponse, SettingsResponse,
};
use crate::application::services::{
    ProfileError, ProfileService, ProfileServiceImpl, UpdateProfileDto, UpdateSettingsDto,
};
use crate::domain::{BlockRepository, InterestRepository, PromptRepository, Seeking};
use crate::infrastructure::repositories::{
    PgBlockRepository, PgInterestRepository, PgPhotoRepository, PgPromptRepository,
    PgSettingsRepository, PgStudentRepository,
};
use crate::presentation::http::handlers::parse_id;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

type ProfileSvc = ProfileServiceImpl<
    PgStudentRepository,
    PgPhotoRepository,
    PgInterestRepository,
    PgPromptRepository,
    PgSettingsRepository,
>;

fn profile_service(state: &AppState) -> ProfileSvc {
    ProfileServiceImpl::new(
        Arc::new(PgStudentRepository::new(state.db.clone())),
        Arc::new(PgPhotoRepository::new(state.db.clone())),
        Arc::new(PgInterestRepository::new(state.db.clone())),
        Arc::new(PgPromptRepository::new(state.db.clone())),
        Arc::new(PgSettingsRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

fn map_profile_error(e: ProfileError) -> AppError {
    match e {
        ProfileError::NotFound => AppError::NotFound("Student not found".into()),
        ProfileError::PhotoNotFound => AppError::NotFound("Photo not found".into()),
        ProfileError::PromptNotFound => AppError::NotFound("Prompt not found".into()),
        ProfileError::TooManyPhotos => AppError::BusinessRule("Photo limit reached".into()),
        ProfileError::TooManyInterests => {
            AppError::BusinessRule("Interest limit exceeded".into())
        }
        ProfileError::AnswerTooLong => AppError::Validation("Answer too long".into()),
        ProfileError::InvalidAgeRange => AppError::Validation("Invalid age range".into()),
        ProfileError::Forbidden => AppError::Forbidden("Permission denied".into()),
        ProfileError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Get the caller's own profile
pub async fn get_current_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = profile_service(&state)
        .get_profile(auth.student_id)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(ProfileResponse::from_profile(profile, true)))
}

/// Update the caller's profile fields
pub async fn update_current_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let update = UpdateProfileDto {
        name: body.name,
        bio: body.bio,
        campus: body.campus,
        program: body.program,
        graduation_year: body.graduation_year,
        seeking: body.seeking.as_deref().map(Seeking::from_str),
    };

    let profile = profile_service(&state)
        .update_profile(auth.student_id, update)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(ProfileResponse::from_profile(profile, true)))
}

/// Public profile of another student.
///
/// Hidden (404) when the target is banned, the pair is blocked in either
/// direction, or the target has discovery disabled.
pub async fn get_student(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(student_id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    let student_id = parse_id(&student_id)?;

    let block_repo = PgBlockRepository::new(state.db.clone());
    if block_repo.exists_between(auth.student_id, student_id).await? {
        return Err(AppError::NotFound("Student not found".into()));
    }

    let profile = profile_service(&state)
        .get_profile(student_id)
        .await
        .map_err(map_profile_error)?;

    if profile.student.banned {
        return Err(AppError::NotFound("Student not found".into()));
    }

    if student_id != auth.student_id {
        let settings = profile_service(&state)
            .get_settings(student_id)
            .await
            .map_err(map_profile_error)?;
        if !settings.discovery_enabled {
            return Err(AppError::NotFound("Student not found".into()));
        }
    }

    Ok(Json(ProfileResponse::from_profile(profile, false)))
}

/// Get the caller's discovery settings
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = profile_service(&state)
        .get_settings(auth.student_id)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(SettingsResponse::from(settings)))
}

/// Update the caller's discovery settings
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let update = UpdateSettingsDto {
        discovery_enabled: body.discovery_enabled,
        min_age: body.min_age,
        max_age: body.max_age,
        show_me: body.show_me.as_deref().map(Seeking::from_str),
        notify_matches: body.notify_matches,
        notify_messages: body.notify_messages,
    };

    let settings = profile_service(&state)
        .update_settings(auth.student_id, update)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(SettingsResponse::from(settings)))
}

/// Append a photo to the caller's profile
pub async fn add_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<AddPhotoRequest>,
) -> Result<(StatusCode, Json<PhotoResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let photo = profile_service(&state)
        .add_photo(auth.student_id, body.url)
        .await
        .map_err(map_profile_error)?;

    Ok((StatusCode::CREATED, Json(PhotoResponse::from(photo))))
}

/// Remove one of the caller's photos
pub async fn remove_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(photo_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let photo_id = parse_id(&photo_id)?;

    profile_service(&state)
        .remove_photo(auth.student_id, photo_id)
        .await
        .map_err(map_profile_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Make one of the caller's photos the primary photo
pub async fn set_primary_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(photo_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let photo_id = parse_id(&photo_id)?;

    profile_service(&state)
        .set_primary_photo(auth.student_id, photo_id)
        .await
        .map_err(map_profile_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replace the caller's interest selection
pub async fn set_interests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SetInterestsRequest>,
) -> Result<Json<Vec<InterestResponse>>, AppError> {
    body.validate().map_err(validation_error)?;

    let interests = profile_service(&state)
        .set_interests(auth.student_id, body.interest_ids)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(interests.into_iter().map(Into::into).collect()))
}

/// Selectable interest catalog
pub async fn list_interests(
    State(state): State<AppState>,
) -> Result<Json<Vec<InterestResponse>>, AppError> {
    let interest_repo = PgInterestRepository::new(state.db.clone());
    let interests = interest_repo.find_all().await?;

    Ok(Json(interests.into_iter().map(Into::into).collect()))
}

/// Answerable prompt catalog
pub async fn list_prompts(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let prompt_repo = PgPromptRepository::new(state.db.clone());
    let prompts = prompt_repo.find_all().await?;

    let body: Vec<serde_json::Value> = prompts
        .into_iter()
        .map(|p| {
            serde_json::json!({
                "id": p.id.to_string(),
                "question": p.question,
            })
        })
        .collect();

    Ok(Json(serde_json::Value::Array(body)))
}

/// Answer (or replace the answer to) a prompt
pub async fn answer_prompt(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(prompt_id): Path<String>,
    Json(body): Json<AnswerPromptRequest>,
) -> Result<Json<PromptAnswerResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let prompt_id = parse_id(&prompt_id)?;

    let prompt_repo = PgPromptRepository::new(state.db.clone());
    let prompt = prompt_repo
        .find_by_id(prompt_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Prompt not found".into()))?;

    let answer = profile_service(&state)
        .answer_prompt(auth.student_id, prompt_id, body.answer)
        .await
        .map_err(map_profile_error)?;

    Ok(Json(PromptAnswerResponse::from((prompt, answer))))
}

/// Remove the caller's answer to a prompt
pub async fn remove_prompt_answer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(prompt_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let prompt_id = parse_id(&prompt_id)?;

    profile_service(&state)
        .remove_prompt_answer(auth.student_id, prompt_id)
        .await
        .map_err(map_profile_error)?;

    Ok(StatusCode::NO_CONTENT)
}
