//! Student entity and repository trait.
//!
//! Maps to the `students` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Gender enum matching database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Unspecified,
    Woman,
    Man,
    Nonbinary,
}

impl Gender {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "woman" => Self::Woman,
            "man" => Self::Man,
            "nonbinary" => Self::Nonbinary,
            _ => Self::Unspecified,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Woman => "woman",
            Self::Man => "man",
            Self::Nonbinary => "nonbinary",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who a student wants to see in their discovery feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Seeking {
    #[default]
    Everyone,
    Women,
    Men,
}

impl Seeking {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "women" => Self::Women,
            "men" => Self::Men,
            _ => Self::Everyone,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Everyone => "everyone",
            Self::Women => "women",
            Self::Men => "men",
        }
    }

    /// Whether a candidate of the given gender passes this preference.
    pub fn accepts(&self, gender: Gender) -> bool {
        match self {
            Self::Everyone => true,
            Self::Women => gender == Gender::Woman,
            Self::Men => gender == Gender::Man,
        }
    }
}

/// Represents a student account and profile.
///
/// Maps to the `students` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - email: VARCHAR(255) NOT NULL UNIQUE
/// - password_hash: VARCHAR(255) NOT NULL
/// - name: VARCHAR(64) NOT NULL
/// - bio: TEXT NULL
/// - birthdate: DATE NOT NULL
/// - gender / seeking: VARCHAR(20)
/// - campus / program: VARCHAR(100) NULL
/// - graduation_year: INT NULL
/// - verified / banned / is_admin: BOOLEAN
/// - last_active_at / created_at / updated_at: TIMESTAMPTZ
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Email address (unique)
    pub email: String,

    /// Argon2 password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name shown on the profile
    pub name: String,

    /// Free-text bio
    pub bio: Option<String>,

    /// Date of birth; age is derived, never stored
    pub birthdate: NaiveDate,

    pub gender: Gender,
    pub seeking: Seeking,

    /// Campus the student attends
    pub campus: Option<String>,

    /// Degree program
    pub program: Option<String>,

    pub graduation_year: Option<i32>,

    /// Campus email verified
    pub verified: bool,

    /// Banned by moderation; banned students cannot authenticate
    pub banned: bool,

    /// Admin accounts can access moderation endpoints
    pub is_admin: bool,

    pub last_active_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Age in whole years as of `today`.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        let mut age = today.years_since(self.birthdate).unwrap_or(0) as i32;
        if age < 0 {
            age = 0;
        }
        age
    }

    /// Age in whole years as of now.
    pub fn age(&self) -> i32 {
        self.age_on(Utc::now().date_naive())
    }
}

/// Filter applied to the discovery feed query.
///
/// Combines the requesting student's settings with the hard exclusions
/// (already swiped, matched, blocked either way, banned, hidden).
#[derive(Debug, Clone)]
pub struct DiscoveryFilter {
    /// The student requesting the feed
    pub student_id: i64,
    pub seeking: Seeking,
    /// Requester's own gender, checked against candidates' `seeking`
    pub gender: Gender,
    pub min_age: i32,
    pub max_age: i32,
    pub limit: i64,
}

/// Repository trait for Student data access operations.
///
/// The trait is defined in the domain layer to maintain dependency inversion.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// Find a student by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError>;

    /// Find a student by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError>;

    /// Create a new student.
    async fn create(&self, student: &Student) -> Result<Student, AppError>;

    /// Update an existing student's profile fields.
    async fn update(&self, student: &Student) -> Result<Student, AppError>;

    /// Check if an email address is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// Touch `last_active_at` for activity-ordered feeds.
    async fn touch_last_active(&self, id: i64) -> Result<(), AppError>;

    /// Set the banned flag.
    async fn set_banned(&self, id: i64, banned: bool) -> Result<(), AppError>;

    /// Discovery feed: candidates passing the filter, excluding students the
    /// requester has swiped on, matched with, or blocked in either direction.
    async fn find_discovery_candidates(
        &self,
        filter: &DiscoveryFilter,
    ) -> Result<Vec<Student>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_student(birthdate: NaiveDate) -> Student {
        let now = Utc::now();
        Student {
            id: 1,
            email: "sam@campus.edu".into(),
            password_hash: "hash".into(),
            name: "Sam".into(),
            bio: None,
            birthdate,
            gender: Gender::Woman,
            seeking: Seeking::Everyone,
            campus: None,
            program: None,
            graduation_year: None,
            verified: false,
            banned: false,
            is_admin: false,
            last_active_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_gender_roundtrip() {
        for g in [Gender::Unspecified, Gender::Woman, Gender::Man, Gender::Nonbinary] {
            assert_eq!(Gender::from_str(g.as_str()), g);
        }
        assert_eq!(Gender::from_str("unknown"), Gender::Unspecified);
    }

    #[test]
    fn test_seeking_roundtrip() {
        for s in [Seeking::Everyone, Seeking::Women, Seeking::Men] {
            assert_eq!(Seeking::from_str(s.as_str()), s);
        }
        assert_eq!(Seeking::from_str(""), Seeking::Everyone);
    }

    #[test]
    fn test_seeking_accepts() {
        assert!(Seeking::Everyone.accepts(Gender::Nonbinary));
        assert!(Seeking::Women.accepts(Gender::Woman));
        assert!(!Seeking::Women.accepts(Gender::Man));
        assert!(Seeking::Men.accepts(Gender::Man));
        assert!(!Seeking::Men.accepts(Gender::Nonbinary));
    }

    #[test]
    fn test_age_on_handles_birthday_boundary() {
        let student = test_student(NaiveDate::from_ymd_opt(2003, 6, 15).unwrap());

        let day_before = NaiveDate::from_ymd_opt(2026, 6, 14).unwrap();
        let birthday = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();

        assert_eq!(student.age_on(day_before), 22);
        assert_eq!(student.age_on(birthday), 23);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let student = test_student(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        let serialized = serde_json::to_string(&student).unwrap();
        assert!(!serialized.contains("password_hash"));
        assert!(!serialized.contains("hash"));
    }
}
