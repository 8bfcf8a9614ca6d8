//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 2, max = 50, message = "Name must be 2-50 characters"))]
    pub name: String,

    /// ISO-8601 date, e.g. "2004-09-21"
    pub birthdate: NaiveDate,

    /// "woman" | "man" | "nonbinary" | "unspecified"
    pub gender: Option<String>,

    /// "everyone" | "women" | "men"
    pub seeking: Option<String>,

    #[validate(length(max = 100, message = "Campus must be at most 100 characters"))]
    pub campus: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Update profile request; omitted fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 50, message = "Name must be 2-50 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 100, message = "Campus must be at most 100 characters"))]
    pub campus: Option<String>,

    #[validate(length(max = 100, message = "Program must be at most 100 characters"))]
    pub program: Option<String>,

    #[validate(range(min = 2000, max = 2100, message = "Graduation year out of range"))]
    pub graduation_year: Option<i32>,

    pub seeking: Option<String>,
}

/// Update settings request; omitted fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    pub discovery_enabled: Option<bool>,

    #[validate(range(min = 18, max = 100, message = "Minimum age must be 18-100"))]
    pub min_age: Option<i32>,

    #[validate(range(min = 18, max = 100, message = "Maximum age must be 18-100"))]
    pub max_age: Option<i32>,

    pub show_me: Option<String>,
    pub notify_matches: Option<bool>,
    pub notify_messages: Option<bool>,
}

/// Add photo request
#[derive(Debug, Deserialize, Validate)]
pub struct AddPhotoRequest {
    #[validate(url(message = "Invalid photo URL"))]
    pub url: String,
}

/// Replace interest selection request
#[derive(Debug, Deserialize, Validate)]
pub struct SetInterestsRequest {
    #[validate(length(max = 10, message = "At most 10 interests"))]
    pub interest_ids: Vec<i64>,
}

/// Answer prompt request
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerPromptRequest {
    #[validate(length(min = 1, max = 300, message = "Answer must be 1-300 characters"))]
    pub answer: String,
}

/// Swipe request
#[derive(Debug, Deserialize)]
pub struct CreateSwipeRequest {
    pub swipee_id: String,

    /// "like" | "pass"
    pub direction: String,
}

/// Send message request (REST fallback for the hub)
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub content: String,
}

/// Report request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportRequest {
    pub reported_id: String,

    /// One of the report reason codes
    pub reason: String,

    #[validate(length(max = 1000, message = "Details must be at most 1000 characters"))]
    pub details: Option<String>,
}

/// Block request
#[derive(Debug, Deserialize)]
pub struct CreateBlockRequest {
    pub blocked_id: String,
}

/// Resolve report request
#[derive(Debug, Deserialize)]
pub struct ResolveReportRequest {
    /// "resolved" | "dismissed"
    pub status: String,
}

/// Discovery feed query parameters
#[derive(Debug, Deserialize, Default)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

/// Message history query parameters
#[derive(Debug, Deserialize, Default)]
pub struct MessageQuery {
    /// Return messages with an id smaller than this cursor
    pub before: Option<String>,
    pub limit: Option<i32>,
}

/// Admin report queue query parameters
#[derive(Debug, Deserialize, Default)]
pub struct ReportQuery {
    /// "open" | "resolved" | "dismissed"
    pub status: Option<String>,
    pub limit: Option<i32>,
}
