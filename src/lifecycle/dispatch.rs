//! # Lifecycle Dispatch
//!
//! Routes tagged lifecycle requests to the registered handler for their
//! resource kind and enforces the identity rules that make handlers safe to
//! re-invoke:
//!
//! - an Update whose new properties compute a different physical id is a
//!   rename: the new resource is created first, the old one torn down only
//!   after the new one succeeds;
//! - a Delete whose physical id does not match the id computed from the
//!   supplied properties is a no-op success, guarding against deleting a
//!   resource that was already replaced;
//! - already-exists errors on Create and already-gone errors on Delete are
//!   treated as success.
//!
//! Every outcome, including handler errors, is returned as a structured
//! completion envelope; dispatch never panics or propagates.

use crate::completion::envelope::CompletionEnvelope;
use crate::lifecycle::handler::ResourceLifecycleHandler;
use crate::lifecycle::physical_id::PhysicalResourceId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tagged lifecycle request describing the resource kind and event.
///
/// Handler lookup is an explicit per-kind capability map keyed by
/// `resource_kind`, not runtime type inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "requestType", rename_all = "PascalCase", rename_all_fields = "camelCase")]
pub enum LifecycleRequest {
    Create {
        resource_kind: String,
        properties: serde_json::Value,
    },
    Update {
        resource_kind: String,
        old_properties: serde_json::Value,
        properties: serde_json::Value,
        physical_resource_id: PhysicalResourceId,
    },
    Delete {
        resource_kind: String,
        properties: serde_json::Value,
        physical_resource_id: PhysicalResourceId,
    },
}

impl LifecycleRequest {
    pub fn resource_kind(&self) -> &str {
        match self {
            LifecycleRequest::Create { resource_kind, .. }
            | LifecycleRequest::Update { resource_kind, .. }
            | LifecycleRequest::Delete { resource_kind, .. } => resource_kind,
        }
    }
}

/// Capability map of lifecycle handlers, one per resource kind
#[derive(Default)]
pub struct LifecycleDispatcher {
    handlers: DashMap<&'static str, Arc<dyn ResourceLifecycleHandler>>,
}

impl LifecycleDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its resource kind; the latest registration
    /// for a kind wins.
    pub fn register(&self, handler: Arc<dyn ResourceLifecycleHandler>) {
        let kind = handler.resource_kind();
        debug!(resource_kind = kind, "Registering lifecycle handler");
        self.handlers.insert(kind, handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatch a request, converting every outcome into a completion
    /// envelope.
    pub async fn dispatch(&self, request: LifecycleRequest) -> CompletionEnvelope {
        let kind = request.resource_kind().to_string();
        let handler = match self.handlers.get(kind.as_str()) {
            Some(entry) => entry.value().clone(),
            None => {
                warn!(resource_kind = %kind, "No lifecycle handler registered");
                return CompletionEnvelope::failure(
                    PhysicalResourceId::new(kind.clone()),
                    format!("no lifecycle handler registered for kind '{kind}'"),
                );
            }
        };

        match request {
            LifecycleRequest::Create { properties, .. } => {
                self.handle_create(handler, &properties).await
            }
            LifecycleRequest::Update {
                old_properties,
                properties,
                physical_resource_id,
                ..
            } => {
                self.handle_update(handler, &old_properties, &properties, physical_resource_id)
                    .await
            }
            LifecycleRequest::Delete {
                properties,
                physical_resource_id,
                ..
            } => {
                self.handle_delete(handler, &properties, physical_resource_id)
                    .await
            }
        }
    }

    async fn handle_create(
        &self,
        handler: Arc<dyn ResourceLifecycleHandler>,
        properties: &serde_json::Value,
    ) -> CompletionEnvelope {
        let physical_id = handler.physical_resource_id(properties);
        match handler.on_create(properties).await {
            Ok(output) => {
                info!(
                    resource_kind = handler.resource_kind(),
                    physical_resource_id = %physical_id,
                    "Resource created"
                );
                CompletionEnvelope::success(physical_id).with_data(output.data)
            }
            Err(error) if error.is_already_exists() => {
                info!(
                    resource_kind = handler.resource_kind(),
                    physical_resource_id = %physical_id,
                    "Resource already exists, treating creation as success"
                );
                CompletionEnvelope::success(physical_id)
            }
            Err(error) => CompletionEnvelope::failure(physical_id, error.to_string()),
        }
    }

    async fn handle_update(
        &self,
        handler: Arc<dyn ResourceLifecycleHandler>,
        old_properties: &serde_json::Value,
        new_properties: &serde_json::Value,
        current_id: PhysicalResourceId,
    ) -> CompletionEnvelope {
        let new_id = handler.physical_resource_id(new_properties);

        if new_id != current_id {
            // Rename: the new resource must exist before the old one is
            // removed, so there is no observable gap.
            info!(
                resource_kind = handler.resource_kind(),
                old_id = %current_id,
                new_id = %new_id,
                "Physical id changed, replacing resource"
            );

            let created = match handler.on_create(new_properties).await {
                Ok(output) => output,
                Err(error) if error.is_already_exists() => Default::default(),
                Err(error) => {
                    return CompletionEnvelope::failure(current_id, error.to_string());
                }
            };

            return match handler.on_delete(old_properties, &current_id).await {
                Ok(_) => CompletionEnvelope::success(new_id).with_data(created.data),
                Err(error) if error.is_already_gone() => {
                    CompletionEnvelope::success(new_id).with_data(created.data)
                }
                Err(error) => CompletionEnvelope::failure(
                    new_id,
                    format!("replacement succeeded but old resource teardown failed: {error}"),
                ),
            };
        }

        match handler
            .on_update(old_properties, new_properties, &current_id)
            .await
        {
            Ok(output) => {
                info!(
                    resource_kind = handler.resource_kind(),
                    physical_resource_id = %current_id,
                    "Resource updated"
                );
                CompletionEnvelope::success(current_id).with_data(output.data)
            }
            Err(error) => CompletionEnvelope::failure(current_id, error.to_string()),
        }
    }

    async fn handle_delete(
        &self,
        handler: Arc<dyn ResourceLifecycleHandler>,
        properties: &serde_json::Value,
        physical_id: PhysicalResourceId,
    ) -> CompletionEnvelope {
        let tracked_id = handler.physical_resource_id(properties);
        if tracked_id != physical_id {
            // The resource was replaced by a later Update; this delete
            // targets the superseded id and must not touch the live one.
            info!(
                resource_kind = handler.resource_kind(),
                supplied_id = %physical_id,
                tracked_id = %tracked_id,
                "Physical id mismatch on delete, skipping"
            );
            return CompletionEnvelope::success(physical_id);
        }

        match handler.on_delete(properties, &physical_id).await {
            Ok(_) => {
                info!(
                    resource_kind = handler.resource_kind(),
                    physical_resource_id = %physical_id,
                    "Resource deleted"
                );
                CompletionEnvelope::success(physical_id)
            }
            Err(error) if error.is_already_gone() => {
                warn!(
                    resource_kind = handler.resource_kind(),
                    physical_resource_id = %physical_id,
                    code = %error.code,
                    "Resource already gone, treating delete as success"
                );
                CompletionEnvelope::success(physical_id)
            }
            Err(error) => CompletionEnvelope::failure(physical_id, error.to_string()),
        }
    }
}
