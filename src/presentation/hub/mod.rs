//! Realtime Chat Hub
//!
//! Websocket endpoint for in-match chat: message delivery, typing
//! indicators, read receipts, and match lifecycle pushes. Connections
//! are tracked in a concurrent registry keyed by connection id so one
//! student can hold several devices at once.

pub mod handler;
#[allow(clippy::module_inception)]
pub mod hub;
pub mod messages;

pub use handler::hub_handler;
pub use hub::ChatHub;
pub use messages::{ClientFrame, MatchPayload, MessagePayload, ServerFrame};
