//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - Database repositories (PostgreSQL)
//! - Cache implementations (Redis)
//! - Prometheus metrics
//! - Background maintenance jobs

pub mod cache;
pub mod database;
pub mod jobs;
pub mod metrics;
pub mod repositories;
