//! Swipe Service
//!
//! Records swipes and creates the match on a mutual like. The invariant that
//! a match exists only after mutual like lives here; the pair-unique index in
//! the match repository makes the concurrent mutual-swipe race idempotent.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    BlockRepository, Match, MatchRepository, StudentRepository, Swipe, SwipeDirection,
    SwipeRepository,
};
use crate::shared::snowflake::SnowflakeGenerator;

/// Swipe service trait
#[async_trait]
pub trait SwipeService: Send + Sync {
    /// Record a like/pass. Returns the created match when this swipe
    /// completed a mutual like.
    async fn swipe(
        &self,
        swiper_id: i64,
        swipee_id: i64,
        direction: SwipeDirection,
    ) -> Result<SwipeOutcome, SwipeError>;
}

/// Result of a swipe
#[derive(Debug, Clone)]
pub struct SwipeOutcome {
    pub swipe: Swipe,
    /// Present only when this swipe created a match
    pub new_match: Option<Match>,
}

/// Swipe service errors
#[derive(Debug, thiserror::Error)]
pub enum SwipeError {
    #[error("Student not found")]
    StudentNotFound,

    #[error("Cannot swipe on yourself")]
    SelfSwipe,

    #[error("Already swiped on this student")]
    AlreadySwiped,

    #[error("Swiping is not allowed between blocked students")]
    Blocked,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::shared::error::AppError> for SwipeError {
    fn from(e: crate::shared::error::AppError) -> Self {
        SwipeError::Internal(e.to_string())
    }
}

/// SwipeService implementation
pub struct SwipeServiceImpl<Sw, Ma, St, Bl>
where
    Sw: SwipeRepository,
    Ma: MatchRepository,
    St: StudentRepository,
    Bl: BlockRepository,
{
    swipe_repo: Arc<Sw>,
    match_repo: Arc<Ma>,
    student_repo: Arc<St>,
    block_repo: Arc<Bl>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<Sw, Ma, St, Bl> SwipeServiceImpl<Sw, Ma, St, Bl>
where
    Sw: SwipeRepository,
    Ma: MatchRepository,
    St: StudentRepository,
    Bl: BlockRepository,
{
    pub fn new(
        swipe_repo: Arc<Sw>,
        match_repo: Arc<Ma>,
        student_repo: Arc<St>,
        block_repo: Arc<Bl>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            swipe_repo,
            match_repo,
            student_repo,
            block_repo,
            id_generator,
        }
    }
}

#[async_trait]
impl<Sw, Ma, St, Bl> SwipeService for SwipeServiceImpl<Sw, Ma, St, Bl>
where
    Sw: SwipeRepository + 'static,
    Ma: MatchRepository + 'static,
    St: StudentRepository + 'static,
    Bl: BlockRepository + 'static,
{
    async fn swipe(
        &self,
        swiper_id: i64,
        swipee_id: i64,
        direction: SwipeDirection,
    ) -> Result<SwipeOutcome, SwipeError> {
        if swiper_id == swipee_id {
            return Err(SwipeError::SelfSwipe);
        }

        let swipee = self
            .student_repo
            .find_by_id(swipee_id)
            .await?
            .ok_or(SwipeError::StudentNotFound)?;

        if swipee.banned {
            return Err(SwipeError::StudentNotFound);
        }

        if self.block_repo.exists_between(swiper_id, swipee_id).await? {
            return Err(SwipeError::Blocked);
        }

        if self
            .swipe_repo
            .find_between(swiper_id, swipee_id)
            .await?
            .is_some()
        {
            return Err(SwipeError::AlreadySwiped);
        }

        let swipe = Swipe {
            id: self.id_generator.generate(),
            swiper_id,
            swipee_id,
            direction,
            created_at: Utc::now(),
        };
        let swipe = self.swipe_repo.create(&swipe).await?;

        // Pass never creates a match
        if direction == SwipeDirection::Pass {
            return Ok(SwipeOutcome {
                swipe,
                new_match: None,
            });
        }

        // A match exists only after mutual like
        if !self.swipe_repo.has_liked(swipee_id, swiper_id).await? {
            return Ok(SwipeOutcome {
                swipe,
                new_match: None,
            });
        }

        // Two concurrent mutual swipes may both reach this point; create()
        // resolves the pair conflict by returning the existing row.
        let candidate = Match::new(self.id_generator.generate(), swiper_id, swipee_id);
        let created = self.match_repo.create(&candidate).await?;

        tracing::info!(
            match_id = created.id,
            student_a = created.student_a_id,
            student_b = created.student_b_id,
            "Mutual like, match created"
        );

        Ok(SwipeOutcome {
            swipe,
            new_match: Some(created),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Block, DiscoveryFilter, Gender, Seeking, Student,
    };
    use crate::shared::error::AppError;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        SwipeRepo {}

        #[async_trait]
        impl SwipeRepository for SwipeRepo {
            async fn find_between(&self, swiper_id: i64, swipee_id: i64) -> Result<Option<Swipe>, AppError>;
            async fn create(&self, swipe: &Swipe) -> Result<Swipe, AppError>;
            async fn has_liked(&self, swiper_id: i64, swipee_id: i64) -> Result<bool, AppError>;
            async fn delete_passes_before(&self, cutoff: chrono::DateTime<chrono::Utc>) -> Result<u64, AppError>;
        }
    }

    mock! {
        MatchRepo {}

        #[async_trait]
        impl MatchRepository for MatchRepo {
            async fn find_by_id(&self, id: i64) -> Result<Option<Match>, AppError>;
            async fn find_by_pair(&self, first: i64, second: i64) -> Result<Option<Match>, AppError>;
            async fn find_open_for_student(&self, student_id: i64) -> Result<Vec<Match>, AppError>;
            async fn create(&self, m: &Match) -> Result<Match, AppError>;
            async fn close(&self, id: i64) -> Result<(), AppError>;
            async fn close_all_for_student(&self, student_id: i64) -> Result<Vec<i64>, AppError>;
        }
    }

    mock! {
        StudentRepo {}

        #[async_trait]
        impl StudentRepository for StudentRepo {
            async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError>;
            async fn create(&self, student: &Student) -> Result<Student, AppError>;
            async fn update(&self, student: &Student) -> Result<Student, AppError>;
            async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
            async fn touch_last_active(&self, id: i64) -> Result<(), AppError>;
            async fn set_banned(&self, id: i64, banned: bool) -> Result<(), AppError>;
            async fn find_discovery_candidates(&self, filter: &DiscoveryFilter) -> Result<Vec<Student>, AppError>;
        }
    }

    mock! {
        BlockRepo {}

        #[async_trait]
        impl BlockRepository for BlockRepo {
            async fn exists_between(&self, first: i64, second: i64) -> Result<bool, AppError>;
            async fn find_by_blocker(&self, blocker_id: i64) -> Result<Vec<Block>, AppError>;
            async fn create(&self, block: &Block) -> Result<Block, AppError>;
            async fn delete(&self, blocker_id: i64, blocked_id: i64) -> Result<(), AppError>;
        }
    }

    fn test_student(id: i64) -> Student {
        let now = Utc::now();
        Student {
            id,
            email: format!("s{id}@campus.edu"),
            password_hash: "hash".into(),
            name: format!("Student {id}"),
            bio: None,
            birthdate: chrono::NaiveDate::from_ymd_opt(2002, 3, 4).unwrap(),
            gender: Gender::Woman,
            seeking: Seeking::Everyone,
            campus: None,
            program: None,
            graduation_year: None,
            verified: true,
            banned: false,
            is_admin: false,
            last_active_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(
        swipes: MockSwipeRepo,
        matches: MockMatchRepo,
        students: MockStudentRepo,
        blocks: MockBlockRepo,
    ) -> SwipeServiceImpl<MockSwipeRepo, MockMatchRepo, MockStudentRepo, MockBlockRepo> {
        SwipeServiceImpl::new(
            Arc::new(swipes),
            Arc::new(matches),
            Arc::new(students),
            Arc::new(blocks),
            Arc::new(SnowflakeGenerator::new(1, 1)),
        )
    }

    #[tokio::test]
    async fn test_self_swipe_rejected() {
        let svc = service(
            MockSwipeRepo::new(),
            MockMatchRepo::new(),
            MockStudentRepo::new(),
            MockBlockRepo::new(),
        );

        let result = svc.swipe(1, 1, SwipeDirection::Like).await;
        assert!(matches!(result, Err(SwipeError::SelfSwipe)));
    }

    #[tokio::test]
    async fn test_duplicate_swipe_rejected() {
        let mut swipes = MockSwipeRepo::new();
        let mut students = MockStudentRepo::new();
        let mut blocks = MockBlockRepo::new();

        students
            .expect_find_by_id()
            .with(eq(2))
            .returning(|id| Ok(Some(test_student(id))));
        blocks.expect_exists_between().returning(|_, _| Ok(false));
        swipes.expect_find_between().returning(|swiper, swipee| {
            Ok(Some(Swipe {
                id: 99,
                swiper_id: swiper,
                swipee_id: swipee,
                direction: SwipeDirection::Pass,
                created_at: Utc::now(),
            }))
        });

        let svc = service(swipes, MockMatchRepo::new(), students, blocks);
        let result = svc.swipe(1, 2, SwipeDirection::Like).await;
        assert!(matches!(result, Err(SwipeError::AlreadySwiped)));
    }

    #[tokio::test]
    async fn test_blocked_pair_rejected() {
        let mut students = MockStudentRepo::new();
        let mut blocks = MockBlockRepo::new();

        students
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_student(id))));
        blocks.expect_exists_between().returning(|_, _| Ok(true));

        let svc = service(MockSwipeRepo::new(), MockMatchRepo::new(), students, blocks);
        let result = svc.swipe(1, 2, SwipeDirection::Like).await;
        assert!(matches!(result, Err(SwipeError::Blocked)));
    }

    #[tokio::test]
    async fn test_pass_never_creates_match() {
        let mut swipes = MockSwipeRepo::new();
        let mut students = MockStudentRepo::new();
        let mut blocks = MockBlockRepo::new();

        students
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_student(id))));
        blocks.expect_exists_between().returning(|_, _| Ok(false));
        swipes.expect_find_between().returning(|_, _| Ok(None));
        swipes.expect_create().returning(|s| Ok(s.clone()));
        // has_liked must not even be consulted for a pass
        swipes.expect_has_liked().never();

        let svc = service(swipes, MockMatchRepo::new(), students, blocks);
        let outcome = svc.swipe(1, 2, SwipeDirection::Pass).await.unwrap();
        assert!(outcome.new_match.is_none());
    }

    #[tokio::test]
    async fn test_mutual_like_creates_match() {
        let mut swipes = MockSwipeRepo::new();
        let mut matches = MockMatchRepo::new();
        let mut students = MockStudentRepo::new();
        let mut blocks = MockBlockRepo::new();

        students
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_student(id))));
        blocks.expect_exists_between().returning(|_, _| Ok(false));
        swipes.expect_find_between().returning(|_, _| Ok(None));
        swipes.expect_create().returning(|s| Ok(s.clone()));
        swipes
            .expect_has_liked()
            .with(eq(2), eq(1))
            .returning(|_, _| Ok(true));
        matches.expect_create().returning(|m| Ok(m.clone()));

        let svc = service(swipes, matches, students, blocks);
        let outcome = svc.swipe(1, 2, SwipeDirection::Like).await.unwrap();

        let m = outcome.new_match.expect("match should be created");
        assert_eq!((m.student_a_id, m.student_b_id), (1, 2));
    }

    #[tokio::test]
    async fn test_one_sided_like_creates_no_match() {
        let mut swipes = MockSwipeRepo::new();
        let mut students = MockStudentRepo::new();
        let mut blocks = MockBlockRepo::new();

        students
            .expect_find_by_id()
            .returning(|id| Ok(Some(test_student(id))));
        blocks.expect_exists_between().returning(|_, _| Ok(false));
        swipes.expect_find_between().returning(|_, _| Ok(None));
        swipes.expect_create().returning(|s| Ok(s.clone()));
        swipes.expect_has_liked().returning(|_, _| Ok(false));

        let svc = service(swipes, MockMatchRepo::new(), students, blocks);
        let outcome = svc.swipe(1, 2, SwipeDirection::Like).await.unwrap();
        assert!(outcome.new_match.is_none());
    }
}
