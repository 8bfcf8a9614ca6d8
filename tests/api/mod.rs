//! HTTP Surface Tests

mod error_shape_tests;
mod health_tests;
mod hub_protocol_tests;
mod request_validation_tests;
