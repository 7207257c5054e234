//! # Fan-Out Scheduling
//!
//! Applies one operation to many independent work items (target accounts,
//! stacks) with a concurrency cap, collects per-item outcomes and reduces
//! them to an aggregate status. One item's failure never cancels siblings;
//! every dispatched item runs to a terminal state before the aggregate is
//! computed.

pub mod scheduler;

pub use scheduler::{FanOutError, FanOutScheduler};

use crate::types::{ExecutionStatus, StepResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An opaque unit of work within a fan-out batch.
///
/// Whether an item is mandatory is an explicit, required input: a
/// non-mandatory item's failure is tolerated and does not fail the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    /// Unique within the batch
    pub id: String,

    /// Structured input for the operation
    #[serde(default)]
    pub payload: serde_json::Value,

    /// Whether this item's failure fails the whole batch
    pub mandatory: bool,

    /// Ordering hint: this item is not dispatched until the named items
    /// reach a terminal state. Unknown ids are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,
}

impl WorkItem {
    /// Mandatory work item
    pub fn new(id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            payload,
            mandatory: true,
            depends_on: None,
        }
    }

    /// Work item whose failure is tolerated
    pub fn non_mandatory(id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            mandatory: false,
            ..Self::new(id, payload)
        }
    }

    pub fn with_depends_on(mut self, depends_on: Vec<String>) -> Self {
        self.depends_on = Some(depends_on);
        self
    }
}

/// Fan-out batch request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutRequest {
    pub items: Vec<WorkItem>,

    pub max_concurrency: usize,

    /// Gate evaluated once before dispatch; `Some(false)` skips the whole
    /// batch and reports success without running any item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_condition: Option<bool>,
}

impl FanOutRequest {
    pub fn new(items: Vec<WorkItem>, max_concurrency: usize) -> Self {
        Self {
            items,
            max_concurrency,
            baseline_condition: None,
        }
    }

    pub fn with_baseline_condition(mut self, condition: bool) -> Self {
        self.baseline_condition = Some(condition);
        self
    }
}

/// Per-item outcomes and the reduced aggregate status of one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutBatchResult {
    pub results: HashMap<String, StepResult>,

    pub aggregate: ExecutionStatus,
}

impl FanOutBatchResult {
    pub fn is_success(&self) -> bool {
        self.aggregate.is_success_like()
    }

    /// Ids of items whose result is a (mandatory) failure
    pub fn failed_items(&self) -> Vec<&str> {
        let mut failed: Vec<&str> = self
            .results
            .iter()
            .filter(|(_, result)| result.is_failure())
            .map(|(id, _)| id.as_str())
            .collect();
        failed.sort_unstable();
        failed
    }
}
