//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Registration, login, refresh token rotation
//! - **ProfileService**: Profile, photos, interests, prompts, settings
//! - **DiscoveryService**: Candidate feed for swiping
//! - **SwipeService**: Swipe recording and mutual-like match creation
//! - **MatchService**: Match listing, previews, unmatching
//! - **MessageService**: Chat messages within a match
//! - **ModerationService**: Reports, blocks, admin queue, bans

pub mod auth_service;
pub mod discovery_service;
pub mod match_service;
pub mod message_service;
pub mod moderation_service;
pub mod profile_service;
pub mod swipe_service;

// Re-export auth service types
pub use auth_service::{
    decode_access_token, AuthError, AuthService, AuthServiceImpl, AuthTokens, Claims, RegisterDto,
};

// Re-export profile service types
pub use profile_service::{
    ProfileDto, ProfileError, ProfileService, ProfileServiceImpl, UpdateProfileDto,
    UpdateSettingsDto,
};

// Re-export discovery service types
pub use discovery_service::{CandidateDto, DiscoveryError, DiscoveryService, DiscoveryServiceImpl};

// Re-export swipe service types
pub use swipe_service::{SwipeError, SwipeOutcome, SwipeService, SwipeServiceImpl};

// Re-export match service types
pub use match_service::{MatchError, MatchPreviewDto, MatchService, MatchServiceImpl};

// Re-export message service types
pub use message_service::{MessageError, MessageService, MessageServiceImpl};

// Re-export moderation service types
pub use moderation_service::{ModerationError, ModerationService, ModerationServiceImpl};
