//! # Domain Entities
//!
//! Core domain entities for the dating backend. All entities map directly to
//! their corresponding database tables.
//!
//! ## Core Entities
//!
//! - **Student**: account, credentials, and profile fields
//! - **Photo / Interest / Prompt**: profile content
//! - **Swipe**: a like/pass verdict on another profile
//! - **Match**: created only after a mutual like; closed, never deleted
//! - **Message**: chat message belonging to exactly one match
//!
//! ## Supporting Entities
//!
//! - **StudentSettings**: discovery and notification preferences
//! - **Session**: refresh-token sessions for JWT auth
//! - **Report / Block / ActivityLog**: moderation surface
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access
//! operations. These traits are implemented in the infrastructure layer,
//! following the dependency inversion principle.

mod block;
mod interest;
mod matching;
mod message;
mod photo;
mod prompt;
mod report;
mod session;
mod settings;
mod student;
mod swipe;

pub use block::{Block, BlockRepository};
pub use interest::{Interest, InterestRepository, MAX_INTERESTS};
pub use matching::{Match, MatchRepository};
pub use message::{Message, MessageRepository, MAX_MESSAGE_LENGTH};
pub use photo::{Photo, PhotoRepository, MAX_PHOTOS};
pub use prompt::{Prompt, PromptAnswer, PromptRepository, MAX_ANSWER_LENGTH};
pub use report::{
    ActivityLogEntry, ActivityLogRepository, Report, ReportReason, ReportRepository, ReportStatus,
};
pub use session::{Session, SessionRepository};
pub use settings::{SettingsRepository, StudentSettings};
pub use student::{DiscoveryFilter, Gender, Seeking, Student, StudentRepository};
pub use swipe::{Swipe, SwipeDirection, SwipeRepository};
