//! Shared Test Utilities

#![allow(dead_code)]

use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

/// Unique email per test run so registration tests never collide
pub fn unique_email() -> String {
    format!("student-{}@campus.test", Uuid::new_v4().simple())
}

/// Plausible display name, random per call
pub fn unique_name() -> String {
    Name().fake()
}
