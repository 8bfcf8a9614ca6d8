//! Student Repository Implementation
//!
//! PostgreSQL implementation of the StudentRepository trait.
//! Maps between the database schema and the domain Student entity.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::domain::{DiscoveryFilter, Gender, Seeking, Student, StudentRepository};
use crate::shared::error::AppError;

/// Database row representation matching the students table schema.
#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    id: i64,
    email: String,
    password_hash: String,
    name: String,
    bio: Option<String>,
    birthdate: NaiveDate,
    gender: String,
    seeking: String,
    campus: Option<String>,
    program: Option<String>,
    graduation_year: Option<i32>,
    verified: bool,
    banned: bool,
    is_admin: bool,
    last_active_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl StudentRow {
    fn into_student(self) -> Student {
        Student {
            id: self.id,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            bio: self.bio,
            birthdate: self.birthdate,
            gender: Gender::from_str(&self.gender),
            seeking: Seeking::from_str(&self.seeking),
            campus: self.campus,
            program: self.program,
            graduation_year: self.graduation_year,
            verified: self.verified,
            banned: self.banned,
            is_admin: self.is_admin,
            last_active_at: self.last_active_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const STUDENT_COLUMNS: &str = "id, email, password_hash, name, bio, birthdate, gender, seeking, \
     campus, program, graduation_year, verified, banned, is_admin, \
     last_active_at, created_at, updated_at";

/// PostgreSQL student repository implementation.
#[derive(Clone)]
pub struct PgStudentRepository {
    pool: PgPool,
}

impl PgStudentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for PgStudentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_student()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_student()))
    }

    async fn create(&self, student: &Student) -> Result<Student, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
            INSERT INTO students (id, email, password_hash, name, bio, birthdate,
                                  gender, seeking, campus, program, graduation_year)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(student.id)
        .bind(&student.email)
        .bind(&student.password_hash)
        .bind(&student.name)
        .bind(&student.bio)
        .bind(student.birthdate)
        .bind(student.gender.as_str())
        .bind(student.seeking.as_str())
        .bind(&student.campus)
        .bind(&student.program)
        .bind(student.graduation_year)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_student())
    }

    async fn update(&self, student: &Student) -> Result<Student, AppError> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            r#"
            UPDATE students
            SET name = $2, bio = $3, seeking = $4, campus = $5, program = $6,
                graduation_year = $7, verified = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(student.id)
        .bind(&student.name)
        .bind(&student.bio)
        .bind(student.seeking.as_str())
        .bind(&student.campus)
        .bind(&student.program)
        .bind(student.graduation_year)
        .bind(student.verified)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_student())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM students WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    async fn touch_last_active(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE students SET last_active_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_banned(&self, id: i64, banned: bool) -> Result<(), AppError> {
        sqlx::query("UPDATE students SET banned = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(banned)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Discovery feed query.
    ///
    /// Excludes the requester, banned and discovery-disabled students,
    /// anyone already swiped on, and blocked pairs in either direction.
    /// Filtering is mutual on both orientation and age: the candidate must
    /// fit the requester's window, and the requester must fit the
    /// candidate's `show_me` and age bounds, so the feed never surfaces
    /// someone who could not like the requester back.
    async fn find_discovery_candidates(
        &self,
        filter: &DiscoveryFilter,
    ) -> Result<Vec<Student>, AppError> {
        let rows = sqlx::query_as::<_, StudentRow>(&discovery_candidates_sql())
            .bind(filter.student_id)
            .bind(filter.seeking.as_str())
            .bind(filter.gender.as_str())
            .bind(filter.min_age)
            .bind(filter.max_age)
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_student()).collect())
    }
}

/// Feed candidates for `$1` (requester id), `$2` requester `show_me`,
/// `$3` requester gender, `$4`/`$5` requester age window, `$6` limit.
fn discovery_candidates_sql() -> String {
    format!(
        r#"
        SELECT {STUDENT_COLUMNS} FROM students s
        WHERE s.id != $1
          AND s.banned = FALSE
          AND ($2 = 'everyone' OR
               ($2 = 'women' AND s.gender = 'woman') OR
               ($2 = 'men' AND s.gender = 'man'))
          AND date_part('year', age(s.birthdate)) BETWEEN $4 AND $5
          AND EXISTS (SELECT 1 FROM student_settings ss
                      WHERE ss.student_id = s.id
                        AND ss.discovery_enabled
                        AND (ss.show_me = 'everyone' OR
                             (ss.show_me = 'women' AND $3 = 'woman') OR
                             (ss.show_me = 'men' AND $3 = 'man'))
                        AND date_part('year', age(
                                (SELECT me.birthdate FROM students me WHERE me.id = $1)))
                            BETWEEN ss.min_age AND ss.max_age)
          AND NOT EXISTS (SELECT 1 FROM swipes sw
                          WHERE sw.swiper_id = $1 AND sw.swipee_id = s.id)
          AND NOT EXISTS (SELECT 1 FROM blocks b
                          WHERE (b.blocker_id = $1 AND b.blocked_id = s.id)
                             OR (b.blocker_id = s.id AND b.blocked_id = $1))
        ORDER BY s.last_active_at DESC
        LIMIT $6
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // The feed must be mutual: the requester has to satisfy each
    // candidate's own settings, not just the other way around.
    #[test]
    fn test_feed_query_filters_on_candidate_settings() {
        let sql = discovery_candidates_sql();
        assert!(sql.contains("BETWEEN ss.min_age AND ss.max_age"));
        assert!(sql.contains("ss.show_me"));
        assert!(sql.contains("ss.discovery_enabled"));
        // Reciprocity reads settings, never the profile seeking column
        assert!(!sql.contains("s.seeking"));
    }

    #[test]
    fn test_feed_query_excludes_swiped_and_blocked() {
        let sql = discovery_candidates_sql();
        assert!(sql.contains("sw.swiper_id = $1 AND sw.swipee_id = s.id"));
        assert!(sql.contains("b.blocker_id = s.id AND b.blocked_id = $1"));
    }
}
