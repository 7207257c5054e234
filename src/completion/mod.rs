//! # Completion Signaling
//!
//! The channel by which a lifecycle handler or workflow communicates its
//! final status back to the invoker. Two delivery modes exist, selected by
//! how the component was invoked: a polling caller reads the latest result
//! from a [`PollingSink`]; an external orchestrator that is not polling
//! receives exactly one push delivery through a [`PushSink`] over an
//! abstract [`CompletionTransport`], so orchestration logic never depends on
//! the transport.

pub mod envelope;
pub mod sink;

pub use envelope::{CompletionEnvelope, CompletionStatus};
pub use sink::{CompletionSink, CompletionTransport, PollingSink, PushSink};
