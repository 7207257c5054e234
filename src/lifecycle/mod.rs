//! # Resource Lifecycle Handling
//!
//! The Create/Update/Delete dispatch contract that every externally-invoked
//! idempotent operation implements. A handler computes a stable physical
//! resource id from its input properties, diffs old against new desired state
//! on Update, and returns a standardized result envelope.
//!
//! Dispatch is driven by a tagged [`LifecycleRequest`] routed through a
//! capability map of registered handlers; errors are converted into
//! structured `FAILURE` envelopes at the boundary so the host process never
//! crashes.

pub mod diff;
pub mod dispatch;
pub mod handler;
pub mod physical_id;

pub use diff::SetDiff;
pub use dispatch::{LifecycleDispatcher, LifecycleRequest};
pub use handler::{HandlerOutput, ResourceLifecycleHandler};
pub use physical_id::PhysicalResourceId;
