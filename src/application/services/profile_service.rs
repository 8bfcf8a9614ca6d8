//! Profile Service
//!
//! Profile editing: bio fields, photos, interests, prompt answers, and the
//! per-student settings row.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    Interest, InterestRepository, Photo, PhotoRepository, Prompt, PromptAnswer, PromptRepository,
    Seeking, SettingsRepository, Student, StudentRepository, StudentSettings, MAX_ANSWER_LENGTH,
    MAX_INTERESTS, MAX_PHOTOS,
};
use crate::shared::snowflake::SnowflakeGenerator;

/// Profile service trait
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Full profile of a student (photos, interests, prompt answers)
    async fn get_profile(&self, student_id: i64) -> Result<ProfileDto, ProfileError>;

    /// Update the student's own profile fields
    async fn update_profile(
        &self,
        student_id: i64,
        update: UpdateProfileDto,
    ) -> Result<ProfileDto, ProfileError>;

    /// Append a photo
    async fn add_photo(&self, student_id: i64, url: String) -> Result<Photo, ProfileError>;

    /// Remove an owned photo; re-promotes another photo if the primary left
    async fn remove_photo(&self, student_id: i64, photo_id: i64) -> Result<(), ProfileError>;

    /// Mark an owned photo as the primary one
    async fn set_primary_photo(&self, student_id: i64, photo_id: i64) -> Result<(), ProfileError>;

    /// Replace the student's interest set
    async fn set_interests(
        &self,
        student_id: i64,
        interest_ids: Vec<i64>,
    ) -> Result<Vec<Interest>, ProfileError>;

    /// Answer (or re-answer) a prompt
    async fn answer_prompt(
        &self,
        student_id: i64,
        prompt_id: i64,
        answer: String,
    ) -> Result<PromptAnswer, ProfileError>;

    /// Remove a prompt answer
    async fn remove_prompt_answer(
        &self,
        student_id: i64,
        prompt_id: i64,
    ) -> Result<(), ProfileError>;

    /// Settings row
    async fn get_settings(&self, student_id: i64) -> Result<StudentSettings, ProfileError>;

    async fn update_settings(
        &self,
        student_id: i64,
        update: UpdateSettingsDto,
    ) -> Result<StudentSettings, ProfileError>;
}

/// Aggregated profile view
#[derive(Debug, Clone)]
pub struct ProfileDto {
    pub student: Student,
    pub photos: Vec<Photo>,
    pub interests: Vec<Interest>,
    pub prompts: Vec<(Prompt, PromptAnswer)>,
}

/// Profile field updates; None leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub campus: Option<String>,
    pub program: Option<String>,
    pub graduation_year: Option<i32>,
    pub seeking: Option<Seeking>,
}

/// Settings updates; None leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateSettingsDto {
    pub discovery_enabled: Option<bool>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub show_me: Option<Seeking>,
    pub notify_matches: Option<bool>,
    pub notify_messages: Option<bool>,
}

/// Profile service errors
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Student not found")]
    NotFound,

    #[error("Photo not found")]
    PhotoNotFound,

    #[error("Prompt not found")]
    PromptNotFound,

    #[error("Photo limit reached")]
    TooManyPhotos,

    #[error("Interest limit exceeded")]
    TooManyInterests,

    #[error("Answer too long")]
    AnswerTooLong,

    #[error("Invalid age range")]
    InvalidAgeRange,

    #[error("Permission denied")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::shared::error::AppError> for ProfileError {
    fn from(e: crate::shared::error::AppError) -> Self {
        ProfileError::Internal(e.to_string())
    }
}

/// ProfileService implementation
pub struct ProfileServiceImpl<St, Ph, In, Pr, Cf>
where
    St: StudentRepository,
    Ph: PhotoRepository,
    In: InterestRepository,
    Pr: PromptRepository,
    Cf: SettingsRepository,
{
    student_repo: Arc<St>,
    photo_repo: Arc<Ph>,
    interest_repo: Arc<In>,
    prompt_repo: Arc<Pr>,
    settings_repo: Arc<Cf>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<St, Ph, In, Pr, Cf> ProfileServiceImpl<St, Ph, In, Pr, Cf>
where
    St: StudentRepository,
    Ph: PhotoRepository,
    In: InterestRepository,
    Pr: PromptRepository,
    Cf: SettingsRepository,
{
    pub fn new(
        student_repo: Arc<St>,
        photo_repo: Arc<Ph>,
        interest_repo: Arc<In>,
        prompt_repo: Arc<Pr>,
        settings_repo: Arc<Cf>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            student_repo,
            photo_repo,
            interest_repo,
            prompt_repo,
            settings_repo,
            id_generator,
        }
    }

    async fn require_student(&self, student_id: i64) -> Result<Student, ProfileError> {
        self.student_repo
            .find_by_id(student_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    async fn owned_photo(&self, student_id: i64, photo_id: i64) -> Result<Photo, ProfileError> {
        let photo = self
            .photo_repo
            .find_by_id(photo_id)
            .await?
            .ok_or(ProfileError::PhotoNotFound)?;

        if photo.student_id != student_id {
            return Err(ProfileError::Forbidden);
        }

        Ok(photo)
    }
}

#[async_trait]
impl<St, Ph, In, Pr, Cf> ProfileService for ProfileServiceImpl<St, Ph, In, Pr, Cf>
where
    St: StudentRepository + 'static,
    Ph: PhotoRepository + 'static,
    In: InterestRepository + 'static,
    Pr: PromptRepository + 'static,
    Cf: SettingsRepository + 'static,
{
    async fn get_profile(&self, student_id: i64) -> Result<ProfileDto, ProfileError> {
        let student = self.require_student(student_id).await?;
        let photos = self.photo_repo.find_by_student(student_id).await?;
        let interests = self.interest_repo.find_by_student(student_id).await?;
        let prompts = self.prompt_repo.find_answers(student_id).await?;

        Ok(ProfileDto {
            student,
            photos,
            interests,
            prompts,
        })
    }

    async fn update_profile(
        &self,
        student_id: i64,
        update: UpdateProfileDto,
    ) -> Result<ProfileDto, ProfileError> {
        let mut student = self.require_student(student_id).await?;

        if let Some(name) = update.name {
            student.name = name;
        }
        if let Some(bio) = update.bio {
            student.bio = if bio.is_empty() { None } else { Some(bio) };
        }
        if let Some(campus) = update.campus {
            student.campus = if campus.is_empty() { None } else { Some(campus) };
        }
        if let Some(program) = update.program {
            student.program = if program.is_empty() { None } else { Some(program) };
        }
        if let Some(year) = update.graduation_year {
            student.graduation_year = Some(year);
        }
        if let Some(seeking) = update.seeking {
            student.seeking = seeking;
        }
        student.updated_at = Utc::now();

        self.student_repo.update(&student).await?;
        self.get_profile(student_id).await
    }

    async fn add_photo(&self, student_id: i64, url: String) -> Result<Photo, ProfileError> {
        self.require_student(student_id).await?;

        let count = self.photo_repo.count_by_student(student_id).await?;
        if count as usize >= MAX_PHOTOS {
            return Err(ProfileError::TooManyPhotos);
        }

        let photo = Photo {
            id: self.id_generator.generate(),
            student_id,
            url,
            position: count as i32,
            // First photo becomes the primary automatically
            is_primary: count == 0,
            created_at: Utc::now(),
        };

        Ok(self.photo_repo.create(&photo).await?)
    }

    async fn remove_photo(&self, student_id: i64, photo_id: i64) -> Result<(), ProfileError> {
        let photo = self.owned_photo(student_id, photo_id).await?;

        self.photo_repo.delete(photo.id).await?;

        // Keep the one-primary invariant when the primary was removed
        if photo.is_primary {
            let remaining = self.photo_repo.find_by_student(student_id).await?;
            if let Some(next) = remaining.first() {
                self.photo_repo.set_primary(student_id, next.id).await?;
            }
        }

        Ok(())
    }

    async fn set_primary_photo(&self, student_id: i64, photo_id: i64) -> Result<(), ProfileError> {
        self.owned_photo(student_id, photo_id).await?;
        self.photo_repo.set_primary(student_id, photo_id).await?;
        Ok(())
    }

    async fn set_interests(
        &self,
        student_id: i64,
        interest_ids: Vec<i64>,
    ) -> Result<Vec<Interest>, ProfileError> {
        if interest_ids.len() > MAX_INTERESTS {
            return Err(ProfileError::TooManyInterests);
        }

        self.require_student(student_id).await?;

        Ok(self
            .interest_repo
            .replace_for_student(student_id, &interest_ids)
            .await?)
    }

    async fn answer_prompt(
        &self,
        student_id: i64,
        prompt_id: i64,
        answer: String,
    ) -> Result<PromptAnswer, ProfileError> {
        if answer.chars().count() > MAX_ANSWER_LENGTH {
            return Err(ProfileError::AnswerTooLong);
        }

        self.prompt_repo
            .find_by_id(prompt_id)
            .await?
            .ok_or(ProfileError::PromptNotFound)?;

        let answer = PromptAnswer {
            student_id,
            prompt_id,
            answer,
            updated_at: Utc::now(),
        };

        Ok(self.prompt_repo.upsert_answer(&answer).await?)
    }

    async fn remove_prompt_answer(
        &self,
        student_id: i64,
        prompt_id: i64,
    ) -> Result<(), ProfileError> {
        self.prompt_repo.delete_answer(student_id, prompt_id).await?;
        Ok(())
    }

    async fn get_settings(&self, student_id: i64) -> Result<StudentSettings, ProfileError> {
        self.settings_repo
            .find_by_student(student_id)
            .await?
            .ok_or(ProfileError::NotFound)
    }

    async fn update_settings(
        &self,
        student_id: i64,
        update: UpdateSettingsDto,
    ) -> Result<StudentSettings, ProfileError> {
        let mut settings = self.get_settings(student_id).await?;

        if let Some(v) = update.discovery_enabled {
            settings.discovery_enabled = v;
        }
        if let Some(v) = update.min_age {
            settings.min_age = v;
        }
        if let Some(v) = update.max_age {
            settings.max_age = v;
        }
        if let Some(v) = update.show_me {
            settings.show_me = v;
        }
        if let Some(v) = update.notify_matches {
            settings.notify_matches = v;
        }
        if let Some(v) = update.notify_messages {
            settings.notify_messages = v;
        }

        if settings.min_age < 18 || settings.max_age < settings.min_age {
            return Err(ProfileError::InvalidAgeRange);
        }

        settings.updated_at = Utc::now();
        Ok(self.settings_repo.update(&settings).await?)
    }
}
