//! # System Constants
//!
//! Core constants and enums that define the operational boundaries of the
//! provisioning orchestration core: the retryable-error contract shared by
//! every remote-call wrapper, default polling and backoff timings, and the
//! event names published during orchestration.

use serde::{Deserialize, Serialize};

// Re-export the shared step status for convenience
pub use crate::types::ExecutionStatus;

/// Core system events published while driving provisioning operations
pub mod events {
    // Workflow lifecycle events
    pub const WORKFLOW_STARTED: &str = "workflow.started";
    pub const WORKFLOW_STATE_CHANGED: &str = "workflow.state_changed";
    pub const WORKFLOW_COMPLETED: &str = "workflow.completed";
    pub const WORKFLOW_FAILED: &str = "workflow.failed";

    // Fan-out batch events
    pub const FANOUT_BATCH_STARTED: &str = "fanout.batch_started";
    pub const FANOUT_BATCH_SKIPPED: &str = "fanout.batch_skipped";
    pub const FANOUT_ITEM_COMPLETED: &str = "fanout.item_completed";
    pub const FANOUT_BATCH_COMPLETED: &str = "fanout.batch_completed";

    // Resource lifecycle events
    pub const LIFECYCLE_CREATE_COMPLETED: &str = "lifecycle.create_completed";
    pub const LIFECYCLE_UPDATE_COMPLETED: &str = "lifecycle.update_completed";
    pub const LIFECYCLE_DELETE_COMPLETED: &str = "lifecycle.delete_completed";

    // Completion signaling events
    pub const COMPLETION_DELIVERED: &str = "completion.delivered";
    pub const COMPLETION_DELIVERY_FAILED: &str = "completion.delivery_failed";
}

/// System-wide defaults
pub mod system {
    /// Default starting delay for exponential backoff
    pub const DEFAULT_STARTING_DELAY_MS: u64 = 500;

    /// Default number of remote-call attempts before giving up
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Wait interval between Verify polls for stack/build style operations
    pub const STACK_WAIT_SECONDS: u64 = 10;

    /// Wait interval between Verify polls for account-creation and
    /// cross-account batch operations
    pub const ACCOUNT_WAIT_SECONDS: u64 = 60;

    /// Attempts used when pushing a completion callback
    pub const COMPLETION_DELIVERY_ATTEMPTS: u32 = 3;

    /// Default fan-out concurrency cap
    pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
}

/// The closed set of symbolic error codes treated as transient.
///
/// This predicate is the single most important correctness contract in the
/// system: a terminal error classified retryable spins for the whole backoff
/// budget before surfacing; a transient error classified terminal fails
/// spuriously under load. Codes outside this set are terminal.
pub mod retryable_codes {
    /// Rate and throttling signals from the external control plane
    pub const THROTTLING: &[&str] = &[
        "Throttling",
        "ThrottlingException",
        "TooManyRequestsException",
        "RequestLimitExceeded",
    ];

    /// Concurrent-modification signals
    pub const CONCURRENT_MODIFICATION: &[&str] = &[
        "ConcurrentModificationException",
        "ConcurrentUpdateException",
    ];

    /// Transient internal errors of the external control plane
    pub const TRANSIENT_INTERNAL: &[&str] = &[
        "InternalErrorException",
        "InternalException",
        "ServiceUnavailableException",
    ];

    /// Resource-temporarily-unavailable signals
    pub const TEMPORARILY_UNAVAILABLE: &[&str] = &[
        "LimitExceededException",
        "ResourceInUseException",
    ];
}

/// Error codes on Delete that mean the resource is already gone; delete must
/// be safe to call on an already-deleted resource, so these are swallowed.
pub const ALREADY_GONE_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "NotFoundException",
    "NoSuchEntity",
];

/// Error codes on Create that mean the resource already exists and the
/// creation counts as success.
pub const ALREADY_EXISTS_CODES: &[&str] = &[
    "AlreadyExistsException",
    "ResourceAlreadyExistsException",
    "EntityAlreadyExists",
];

/// Check whether a symbolic code belongs to the retryable set
pub fn is_retryable_code(code: &str) -> bool {
    retryable_codes::THROTTLING.contains(&code)
        || retryable_codes::CONCURRENT_MODIFICATION.contains(&code)
        || retryable_codes::TRANSIENT_INTERNAL.contains(&code)
        || retryable_codes::TEMPORARILY_UNAVAILABLE.contains(&code)
}

/// Preset wait profiles for the workflow engine's Wait state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitProfile {
    /// Build and stack deployment operations (10s)
    Stack,
    /// Account creation and cross-account batch operations (60s)
    Account,
}

impl WaitProfile {
    pub fn interval(&self) -> std::time::Duration {
        match self {
            WaitProfile::Stack => std::time::Duration::from_secs(system::STACK_WAIT_SECONDS),
            WaitProfile::Account => std::time::Duration::from_secs(system::ACCOUNT_WAIT_SECONDS),
        }
    }
}
