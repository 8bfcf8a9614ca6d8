//! Auth session entity and repository trait.
//!
//! Maps to the `sessions` table. Used for JWT refresh token management:
//! refresh tokens are opaque, stored only as SHA-256 hashes, and rotated on
//! every refresh.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// UUID primary key
    pub id: Uuid,

    pub student_id: i64,

    /// SHA-256 hash of the refresh token (never store raw tokens)
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,

    /// Raw user agent string or device description
    pub device_info: Option<String>,

    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a new session for a student.
    pub fn new(student_id: i64, refresh_token_hash: String, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            student_id,
            refresh_token_hash,
            device_info: None,
            expires_at,
            created_at: now,
            last_used_at: now,
            revoked_at: None,
        }
    }

    /// A session is active when neither revoked nor expired.
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Repository trait for Session data access operations.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError>;

    async fn create(&self, session: &Session) -> Result<Session, AppError>;

    /// Replace the stored token hash and extend expiry (token rotation).
    async fn update_token_hash(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Revoke a single session (logout).
    async fn revoke(&self, id: Uuid) -> Result<(), AppError>;

    /// Revoke every session of a student (used on ban).
    async fn revoke_all_for_student(&self, student_id: i64) -> Result<u64, AppError>;

    /// Delete expired and revoked sessions. Returns rows removed.
    async fn delete_expired(&self) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_session_is_active() {
        let s = Session::new(1, "hash".into(), Utc::now() + Duration::days(7));
        assert!(s.is_active());
    }

    #[test]
    fn test_expired_session_is_inactive() {
        let s = Session::new(1, "hash".into(), Utc::now() - Duration::minutes(1));
        assert!(!s.is_active());
    }

    #[test]
    fn test_revoked_session_is_inactive() {
        let mut s = Session::new(1, "hash".into(), Utc::now() + Duration::days(7));
        s.revoked_at = Some(Utc::now());
        assert!(!s.is_active());
    }
}
