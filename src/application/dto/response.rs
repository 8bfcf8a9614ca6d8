//! Response DTOs
//!
//! Data structures for API response bodies. Snowflake ids serialize as
//! strings so JavaScript clients do not lose precision.

use serde::Serialize;

use crate::application::services::{AuthTokens, CandidateDto, MatchPreviewDto, ProfileDto};
use crate::domain::{
    Block, Interest, Match, Message, Photo, Prompt, PromptAnswer, Report, Student, StudentSettings,
};

/// Authentication tokens response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthTokens> for TokenResponse {
    fn from(tokens: AuthTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: tokens.token_type,
        }
    }
}

/// Registration response (student plus tokens)
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub student: StudentResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// Student response
///
/// `email` is only present on the owner's own profile.
#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    pub bio: Option<String>,
    pub age: i32,
    pub gender: String,
    pub campus: Option<String>,
    pub program: Option<String>,
    pub graduation_year: Option<i32>,
    pub verified: bool,
    pub created_at: String,
}

impl StudentResponse {
    pub fn from_student(student: Student, include_email: bool) -> Self {
        Self {
            id: student.id.to_string(),
            email: if include_email {
                Some(student.email.clone())
            } else {
                None
            },
            age: student.age(),
            name: student.name,
            bio: student.bio,
            gender: student.gender.as_str().to_string(),
            campus: student.campus,
            program: student.program,
            graduation_year: student.graduation_year,
            verified: student.verified,
            created_at: student.created_at.to_rfc3339(),
        }
    }
}

/// Photo response
#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub id: String,
    pub url: String,
    pub position: i32,
    pub is_primary: bool,
}

impl From<Photo> for PhotoResponse {
    fn from(p: Photo) -> Self {
        Self {
            id: p.id.to_string(),
            url: p.url,
            position: p.position,
            is_primary: p.is_primary,
        }
    }
}

/// Interest response
#[derive(Debug, Serialize)]
pub struct InterestResponse {
    pub id: String,
    pub name: String,
}

impl From<Interest> for InterestResponse {
    fn from(i: Interest) -> Self {
        Self {
            id: i.id.to_string(),
            name: i.name,
        }
    }
}

/// A prompt with the student's answer
#[derive(Debug, Serialize)]
pub struct PromptAnswerResponse {
    pub prompt_id: String,
    pub question: String,
    pub answer: String,
}

impl From<(Prompt, PromptAnswer)> for PromptAnswerResponse {
    fn from((prompt, answer): (Prompt, PromptAnswer)) -> Self {
        Self {
            prompt_id: prompt.id.to_string(),
            question: prompt.question,
            answer: answer.answer,
        }
    }
}

/// Full profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub student: StudentResponse,
    pub photos: Vec<PhotoResponse>,
    pub interests: Vec<InterestResponse>,
    pub prompts: Vec<PromptAnswerResponse>,
}

impl ProfileResponse {
    pub fn from_profile(profile: ProfileDto, include_email: bool) -> Self {
        Self {
            student: StudentResponse::from_student(profile.student, include_email),
            photos: profile.photos.into_iter().map(Into::into).collect(),
            interests: profile.interests.into_iter().map(Into::into).collect(),
            prompts: profile.prompts.into_iter().map(Into::into).collect(),
        }
    }
}

/// Discovery feed card
#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    pub student: StudentResponse,
    pub photos: Vec<PhotoResponse>,
}

impl From<CandidateDto> for CandidateResponse {
    fn from(c: CandidateDto) -> Self {
        Self {
            student: StudentResponse::from_student(c.student, false),
            photos: c.photos.into_iter().map(Into::into).collect(),
        }
    }
}

/// Swipe result response
#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    pub swipe_id: String,
    pub direction: String,
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
}

/// Match summary response
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub id: String,
    pub other: StudentResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<MessageResponse>,
    pub unread_count: i64,
    /// Live presence of the other student, from the hub's Redis keys
    pub online: bool,
    pub created_at: String,
}

impl From<MatchPreviewDto> for MatchResponse {
    fn from(p: MatchPreviewDto) -> Self {
        Self {
            id: p.match_record.id.to_string(),
            other: StudentResponse::from_student(p.other, false),
            other_photo_url: p.other_primary_photo.map(|ph| ph.url),
            last_message: p.last_message.map(Into::into),
            unread_count: p.unread_count,
            online: false,
            created_at: p.match_record.created_at.to_rfc3339(),
        }
    }
}

/// Bare match response, used after a swipe and on GET by id
#[derive(Debug, Serialize)]
pub struct MatchDetailResponse {
    pub id: String,
    pub student_a_id: String,
    pub student_b_id: String,
    pub created_at: String,
    pub closed_at: Option<String>,
}

impl From<Match> for MatchDetailResponse {
    fn from(m: Match) -> Self {
        Self {
            id: m.id.to_string(),
            student_a_id: m.student_a_id.to_string(),
            student_b_id: m.student_b_id.to_string(),
            created_at: m.created_at.to_rfc3339(),
            closed_at: m.closed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub match_id: String,
    pub sender_id: String,
    pub content: String,
    pub read_at: Option<String>,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id.to_string(),
            match_id: m.match_id.to_string(),
            sender_id: m.sender_id.to_string(),
            content: m.content,
            read_at: m.read_at.map(|t| t.to_rfc3339()),
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Settings response
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub discovery_enabled: bool,
    pub min_age: i32,
    pub max_age: i32,
    pub show_me: String,
    pub notify_matches: bool,
    pub notify_messages: bool,
}

impl From<StudentSettings> for SettingsResponse {
    fn from(s: StudentSettings) -> Self {
        Self {
            discovery_enabled: s.discovery_enabled,
            min_age: s.min_age,
            max_age: s.max_age,
            show_me: s.show_me.as_str().to_string(),
            notify_matches: s.notify_matches,
            notify_messages: s.notify_messages,
        }
    }
}

/// Report response
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: String,
    pub reporter_id: String,
    pub reported_id: String,
    pub reason: String,
    pub details: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl From<Report> for ReportResponse {
    fn from(r: Report) -> Self {
        Self {
            id: r.id.to_string(),
            reporter_id: r.reporter_id.to_string(),
            reported_id: r.reported_id.to_string(),
            reason: r.reason.as_str().to_string(),
            details: r.details,
            status: r.status.as_str().to_string(),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Block list entry
#[derive(Debug, Serialize)]
pub struct BlockResponse {
    pub blocked_id: String,
    pub created_at: String,
}

impl From<Block> for BlockResponse {
    fn from(b: Block) -> Self {
        Self {
            blocked_id: b.blocked_id.to_string(),
            created_at: b.created_at.to_rfc3339(),
        }
    }
}
