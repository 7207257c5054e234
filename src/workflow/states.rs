//! # Workflow States and Transition Table
//!
//! The transition table routes on the status value returned by the Execute
//! or Verify step. Routing is total: an absent or unexpected status maps to
//! `Fail`.
//!
//! | Status | From Execute | From Verify |
//! |---|---|---|
//! | `SUCCESS` | Wait | Success |
//! | `ALREADY_EXISTS` | Success | Success |
//! | `NOT_RELEVANT` / `NON_MANDATORY_FAILURE` | Success | Success |
//! | `IN_PROGRESS` | Wait | Wait (loop) |
//! | anything else / absent | Fail | Fail |

use crate::types::ExecutionStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow engine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Start,
    Execute,
    Wait,
    Verify,
    Success,
    Fail,
}

impl WorkflowState {
    /// Check if this state stops the engine
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Fail)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Execute => write!(f, "execute"),
            Self::Wait => write!(f, "wait"),
            Self::Verify => write!(f, "verify"),
            Self::Success => write!(f, "success"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Choice routing after the Execute step
pub fn after_execute(status: Option<ExecutionStatus>) -> WorkflowState {
    match status {
        Some(ExecutionStatus::Success) | Some(ExecutionStatus::InProgress) => WorkflowState::Wait,
        Some(ExecutionStatus::AlreadyExists)
        | Some(ExecutionStatus::NotRelevant)
        | Some(ExecutionStatus::NonMandatoryFailure) => WorkflowState::Success,
        Some(ExecutionStatus::Failure) | None => WorkflowState::Fail,
    }
}

/// Choice routing after the Verify step
pub fn after_verify(status: Option<ExecutionStatus>) -> WorkflowState {
    match status {
        Some(ExecutionStatus::Success)
        | Some(ExecutionStatus::AlreadyExists)
        | Some(ExecutionStatus::NotRelevant)
        | Some(ExecutionStatus::NonMandatoryFailure) => WorkflowState::Success,
        Some(ExecutionStatus::InProgress) => WorkflowState::Wait,
        Some(ExecutionStatus::Failure) | None => WorkflowState::Fail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_success_goes_to_wait() {
        assert_eq!(
            after_execute(Some(ExecutionStatus::Success)),
            WorkflowState::Wait
        );
        assert_eq!(
            after_execute(Some(ExecutionStatus::InProgress)),
            WorkflowState::Wait
        );
    }

    #[test]
    fn test_execute_terminal_success_aliases_short_circuit() {
        assert_eq!(
            after_execute(Some(ExecutionStatus::AlreadyExists)),
            WorkflowState::Success
        );
        assert_eq!(
            after_execute(Some(ExecutionStatus::NotRelevant)),
            WorkflowState::Success
        );
        assert_eq!(
            after_execute(Some(ExecutionStatus::NonMandatoryFailure)),
            WorkflowState::Success
        );
    }

    #[test]
    fn test_verify_success_terminates() {
        assert_eq!(
            after_verify(Some(ExecutionStatus::Success)),
            WorkflowState::Success
        );
        assert_eq!(
            after_verify(Some(ExecutionStatus::InProgress)),
            WorkflowState::Wait
        );
    }

    #[test]
    fn test_absent_status_fails() {
        assert_eq!(after_execute(None), WorkflowState::Fail);
        assert_eq!(after_verify(None), WorkflowState::Fail);
    }

    #[test]
    fn test_failure_fails_from_both_steps() {
        assert_eq!(
            after_execute(Some(ExecutionStatus::Failure)),
            WorkflowState::Fail
        );
        assert_eq!(
            after_verify(Some(ExecutionStatus::Failure)),
            WorkflowState::Fail
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(WorkflowState::Success.is_terminal());
        assert!(WorkflowState::Fail.is_terminal());
        assert!(!WorkflowState::Wait.is_terminal());
        assert!(!WorkflowState::Execute.is_terminal());
    }
}
