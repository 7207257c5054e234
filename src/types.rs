//! # Shared Step Types
//!
//! The step result envelope exchanged between every Execute/Verify step and
//! its caller, and the closed status enum that drives workflow routing.
//!
//! Every step invocation produces exactly one [`ExecutionStatus`];
//! [`ExecutionStatus::InProgress`] is the only non-terminal value and the only
//! value that causes the workflow engine to loop.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Status produced by every step invocation.
///
/// `ALREADY_EXISTS`, `NOT_RELEVANT` and `NON_MANDATORY_FAILURE` are terminal
/// success aliases: the underlying operation did no new work or failed for an
/// optional item, which the workflow treats as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    InProgress,
    #[serde(alias = "SUCCEEDED")]
    Success,
    Failure,
    AlreadyExists,
    NotRelevant,
    NonMandatoryFailure,
}

impl ExecutionStatus {
    /// Check if this status stops further polling
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// Check if this is a terminal status that counts as success
    pub fn is_success_like(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::AlreadyExists | Self::NotRelevant | Self::NonMandatoryFailure
        )
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
            Self::AlreadyExists => write!(f, "ALREADY_EXISTS"),
            Self::NotRelevant => write!(f, "NOT_RELEVANT"),
            Self::NonMandatoryFailure => write!(f, "NON_MANDATORY_FAILURE"),
        }
    }
}

/// Step input/output envelope produced by Execute and Verify steps and
/// consumed by the workflow engine's choice routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    /// Outcome of this step invocation
    pub status: ExecutionStatus,

    /// Step-specific output attributes
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,

    /// Human-readable failure detail, present only on FAILURE
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl StepResult {
    pub fn new(status: ExecutionStatus) -> Self {
        Self {
            status,
            data: HashMap::new(),
            error_detail: None,
        }
    }

    pub fn success() -> Self {
        Self::new(ExecutionStatus::Success)
    }

    pub fn in_progress() -> Self {
        Self::new(ExecutionStatus::InProgress)
    }

    pub fn already_exists() -> Self {
        Self::new(ExecutionStatus::AlreadyExists)
    }

    pub fn not_relevant() -> Self {
        Self::new(ExecutionStatus::NotRelevant)
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Failure,
            data: HashMap::new(),
            error_detail: Some(detail.into()),
        }
    }

    /// Attach an output attribute to the envelope
    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn is_failure(&self) -> bool {
        self.status == ExecutionStatus::Failure
    }
}
