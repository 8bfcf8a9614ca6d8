//! # CampusMatch Backend Library
//!
//! This crate provides a campus dating backend with:
//! - RESTful HTTP API endpoints
//! - WebSocket chat hub for real-time messaging within matches
//! - PostgreSQL for persistent storage
//! - Redis for presence, typing indicators, and rate limiting
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: Database, cache, metrics, and background jobs
//! - **Presentation Layer**: HTTP handlers and the websocket hub
//!
//! ## Module Structure
//!
//! ```text
//! campus_match/
//! +-- config/        Configuration management
//! +-- domain/        Domain entities and repository traits
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Database, cache, metrics, and job implementations
//! +-- presentation/  HTTP routes, middleware, and the chat hub
//! +-- shared/        Common utilities (errors, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and websocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
