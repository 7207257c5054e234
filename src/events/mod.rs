//! # Orchestration Events
//!
//! Broadcast fan-out of structured lifecycle and workflow events. Event
//! names live in [`crate::constants::events`]; subscribers are a host
//! concern and publishing with no subscribers is not an error.

pub mod publisher;

pub use publisher::{EventPublisher, PublishError, PublishedEvent};
