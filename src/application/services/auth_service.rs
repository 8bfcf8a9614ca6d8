//! Authentication Service
//!
//! Handles student authentication, JWT token management, and session handling.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::JwtSettings;
use crate::domain::{
    Gender, Seeking, Session, SessionRepository, SettingsRepository, Student, StudentRepository,
    StudentSettings,
};
use crate::shared::snowflake::SnowflakeGenerator;

/// Minimum age to register.
pub const MIN_AGE: i32 = 18;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new student and create their default settings row
    async fn register(&self, request: RegisterDto) -> Result<(Student, AuthTokens), AuthError>;

    /// Authenticate a student with credentials
    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthTokens, AuthError>;

    /// Refresh access token using refresh token (rotation)
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;

    /// Revoke refresh token (logout)
    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError>;
}

/// Registration input
#[derive(Debug, Clone)]
pub struct RegisterDto {
    pub email: String,
    pub password: String,
    pub name: String,
    pub birthdate: NaiveDate,
    pub gender: Gender,
    pub seeking: Seeking,
    pub campus: Option<String>,
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (student ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Admin accounts may hit moderation endpoints
    #[serde(default)]
    pub adm: bool,
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is banned")]
    Banned,

    #[error("Must be at least 18 to register")]
    Underage,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Email already exists")]
    EmailExists,

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// AuthService implementation
pub struct AuthServiceImpl<St, Se, Cf>
where
    St: StudentRepository,
    Se: SessionRepository,
    Cf: SettingsRepository,
{
    student_repo: Arc<St>,
    session_repo: Arc<Se>,
    settings_repo: Arc<Cf>,
    id_generator: Arc<SnowflakeGenerator>,
    jwt_settings: JwtSettings,
}

impl<St, Se, Cf> AuthServiceImpl<St, Se, Cf>
where
    St: StudentRepository,
    Se: SessionRepository,
    Cf: SettingsRepository,
{
    pub fn new(
        student_repo: Arc<St>,
        session_repo: Arc<Se>,
        settings_repo: Arc<Cf>,
        id_generator: Arc<SnowflakeGenerator>,
        jwt_settings: JwtSettings,
    ) -> Self {
        Self {
            student_repo,
            session_repo,
            settings_repo,
            id_generator,
            jwt_settings,
        }
    }

    /// Hash a password using Argon2id
    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, student_id: i64, is_admin: bool) -> Result<AuthTokens, AuthError> {
        let now = Utc::now();
        let access_expiry = now + Duration::minutes(self.jwt_settings.access_token_expiry_minutes);

        let access_claims = Claims {
            sub: student_id.to_string(),
            exp: access_expiry.timestamp(),
            iat: now.timestamp(),
            adm: is_admin,
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_settings.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))?;

        // Opaque refresh token; only its hash is ever stored
        let refresh_token = format!("{}.{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.jwt_settings.access_token_expiry_minutes * 60,
            token_type: "Bearer".to_string(),
        })
    }

    /// Hash refresh token for storage
    fn hash_refresh_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    async fn create_session(&self, student_id: i64, refresh_token: &str) -> Result<(), AuthError> {
        let token_hash = self.hash_refresh_token(refresh_token);
        let session = Session::new(
            student_id,
            token_hash,
            Utc::now() + Duration::days(self.jwt_settings.refresh_token_expiry_days),
        );

        self.session_repo
            .create(&session)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Decode and validate an access token against the configured secret.
/// Shared by the auth middleware and the hub handshake.
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

#[async_trait]
impl<St, Se, Cf> AuthService for AuthServiceImpl<St, Se, Cf>
where
    St: StudentRepository + 'static,
    Se: SessionRepository + 'static,
    Cf: SettingsRepository + 'static,
{
    async fn register(&self, request: RegisterDto) -> Result<(Student, AuthTokens), AuthError> {
        if self
            .student_repo
            .email_exists(&request.email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
        {
            return Err(AuthError::EmailExists);
        }

        let password_hash = self.hash_password(&request.password)?;
        let now = Utc::now();

        let student = Student {
            id: self.id_generator.generate(),
            email: request.email,
            password_hash,
            name: request.name,
            bio: None,
            birthdate: request.birthdate,
            gender: request.gender,
            seeking: request.seeking,
            campus: request.campus,
            program: None,
            graduation_year: None,
            verified: false,
            banned: false,
            is_admin: false,
            last_active_at: now,
            created_at: now,
            updated_at: now,
        };

        if student.age() < MIN_AGE {
            return Err(AuthError::Underage);
        }

        let created = self
            .student_repo
            .create(&student)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        // Every student gets a settings row at registration
        self.settings_repo
            .create(&StudentSettings::defaults(created.id))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let tokens = self.generate_tokens(created.id, created.is_admin)?;
        self.create_session(created.id, &tokens.refresh_token).await?;

        Ok((created, tokens))
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<AuthTokens, AuthError> {
        let student = self
            .student_repo
            .find_by_email(email)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.verify_password(password, &student.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if student.banned {
            return Err(AuthError::Banned);
        }

        let tokens = self.generate_tokens(student.id, student.is_admin)?;
        self.create_session(student.id, &tokens.refresh_token).await?;

        self.student_repo
            .touch_last_active(student.id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(tokens)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let token_hash = self.hash_refresh_token(refresh_token);

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::SessionNotFound)?;

        if !session.is_active() {
            return Err(AuthError::TokenExpired);
        }

        let student = self
            .student_repo
            .find_by_id(session.student_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::SessionNotFound)?;

        if student.banned {
            return Err(AuthError::Banned);
        }

        // Token rotation: the presented refresh token is consumed here
        let new_tokens = self.generate_tokens(student.id, student.is_admin)?;
        let new_token_hash = self.hash_refresh_token(&new_tokens.refresh_token);
        let new_expires_at =
            Utc::now() + Duration::days(self.jwt_settings.refresh_token_expiry_days);

        self.session_repo
            .update_token_hash(session.id, &new_token_hash, new_expires_at)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(new_tokens)
    }

    async fn revoke_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        let token_hash = self.hash_refresh_token(refresh_token);

        let session = self
            .session_repo
            .find_by_token_hash(&token_hash)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::SessionNotFound)?;

        self.session_repo
            .revoke(session.id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_roundtrip_through_jwt() {
        let secret = "a-test-secret-that-is-long-enough!!";
        let claims = Claims {
            sub: "42".into(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            iat: Utc::now().timestamp(),
            adm: true,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let decoded = decode_access_token(&token, secret).unwrap();
        assert_eq!(decoded.sub, "42");
        assert!(decoded.adm);
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = "a-test-secret-that-is-long-enough!!";
        let claims = Claims {
            sub: "42".into(),
            exp: (Utc::now() - Duration::minutes(5)).timestamp(),
            iat: (Utc::now() - Duration::minutes(10)).timestamp(),
            adm: false,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            decode_access_token(&token, secret),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims {
            sub: "42".into(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            iat: Utc::now().timestamp(),
            adm: false,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"first-secret-that-is-long-enough!"),
        )
        .unwrap();

        assert!(matches!(
            decode_access_token(&token, "other-secret-that-is-long-enough!"),
            Err(AuthError::InvalidToken)
        ));
    }
}
