//! Resource lifecycle completion envelope.

use crate::lifecycle::PhysicalResourceId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Final status reported to the invoker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    Success,
    Failure,
}

/// Envelope carried by every completion delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEnvelope {
    pub status: CompletionStatus,

    pub physical_resource_id: PhysicalResourceId,

    /// Attributes exposed to dependents
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,

    /// Failure explanation, present only on FAILURE
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CompletionEnvelope {
    pub fn success(physical_resource_id: PhysicalResourceId) -> Self {
        Self {
            status: CompletionStatus::Success,
            physical_resource_id,
            data: HashMap::new(),
            reason: None,
        }
    }

    pub fn failure(physical_resource_id: PhysicalResourceId, reason: impl Into<String>) -> Self {
        Self {
            status: CompletionStatus::Failure,
            physical_resource_id,
            data: HashMap::new(),
            reason: Some(reason.into()),
        }
    }

    pub fn with_data(mut self, data: HashMap<String, serde_json::Value>) -> Self {
        self.data = data;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == CompletionStatus::Success
    }
}
