//! # Domain Layer
//!
//! The domain layer contains the core business objects of the dating backend.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts
//! - Entities encapsulate domain behavior (pair normalization, age
//!   derivation, session validity)

pub mod entities;

pub use entities::*;
