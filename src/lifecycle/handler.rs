//! # Lifecycle Handler Contract
//!
//! One handler implements the Create/Update/Delete triad for one idempotent
//! external resource kind. Handlers funnel every external call through
//! [`crate::resilience::BackoffExecutor`] and never retry at their own layer.

use crate::lifecycle::physical_id::PhysicalResourceId;
use crate::resilience::RemoteError;
use std::collections::HashMap;

/// Successful handler output; the dispatcher wraps it into the completion
/// envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandlerOutput {
    /// Attributes exposed to dependents of the resource
    pub data: HashMap<String, serde_json::Value>,
}

impl HandlerOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

/// The Create/Update/Delete contract for one external resource kind.
///
/// Idempotency rules every implementation must hold:
///
/// - `on_create` called twice with identical properties and no intervening
///   `on_delete` must not create two external resources: either detect the
///   pre-existing resource by its deterministic lookup key, or let the
///   already-exists error code surface and the dispatcher treats it as
///   success.
/// - `on_update` computes the set difference between old and new desired
///   state (see [`crate::lifecycle::diff::SetDiff`]) whenever the underlying
///   operation supports incremental mutation. Resources that do not are
///   replaced by the dispatcher (create new, then delete old) and never see
///   `on_update` for a changed physical id.
/// - `on_delete` must be safe to call on an already-deleted resource; the
///   dispatcher additionally guards it against mismatched physical ids.
#[async_trait::async_trait]
pub trait ResourceLifecycleHandler: Send + Sync {
    /// Resource kind key used by the dispatcher's capability map
    fn resource_kind(&self) -> &'static str;

    /// Deterministic physical id computed from input properties
    fn physical_resource_id(&self, properties: &serde_json::Value) -> PhysicalResourceId;

    async fn on_create(
        &self,
        properties: &serde_json::Value,
    ) -> Result<HandlerOutput, RemoteError>;

    async fn on_update(
        &self,
        old_properties: &serde_json::Value,
        new_properties: &serde_json::Value,
        physical_resource_id: &PhysicalResourceId,
    ) -> Result<HandlerOutput, RemoteError>;

    async fn on_delete(
        &self,
        properties: &serde_json::Value,
        physical_resource_id: &PhysicalResourceId,
    ) -> Result<HandlerOutput, RemoteError>;
}
