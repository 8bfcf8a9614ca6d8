//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! This module provides concrete implementations of the repository traits
//! defined in the domain layer. Each repository handles data access for
//! a specific entity type.
//!
//! ## Available Repositories
//!
//! - **StudentRepository** - Student accounts and the discovery feed query
//! - **PhotoRepository** - Profile photo management
//! - **InterestRepository** - Interest vocabulary and per-student selection
//! - **PromptRepository** - Prompt catalogue and student answers
//! - **SwipeRepository** - Swipe verdicts with the mutual-like check
//! - **MatchRepository** - Normalized-pair matches
//! - **MessageRepository** - Chat messages with cursor pagination
//! - **SettingsRepository** - Per-student discovery settings
//! - **SessionRepository** - Refresh-token sessions
//! - **ReportRepository / ActivityLogRepository** - Moderation queue and audit
//! - **BlockRepository** - Block pairs

pub mod block_repository;
pub mod interest_repository;
pub mod match_repository;
pub mod message_repository;
pub mod photo_repository;
pub mod prompt_repository;
pub mod report_repository;
pub mod session_repository;
pub mod settings_repository;
pub mod student_repository;
pub mod swipe_repository;

pub use block_repository::PgBlockRepository;
pub use interest_repository::PgInterestRepository;
pub use match_repository::PgMatchRepository;
pub use message_repository::PgMessageRepository;
pub use photo_repository::PgPhotoRepository;
pub use prompt_repository::PgPromptRepository;
pub use report_repository::{PgActivityLogRepository, PgReportRepository};
pub use session_repository::PgSessionRepository;
pub use settings_repository::PgSettingsRepository;
pub use student_repository::PgStudentRepository;
pub use swipe_repository::PgSwipeRepository;
