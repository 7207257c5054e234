#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Provision Core
//!
//! Rust core for asynchronous provisioning orchestration: the generic
//! machinery used to drive long-running, eventually-consistent external
//! operations (account creation, stack deployment, cross-account batch
//! jobs) to completion.
//!
//! ## Architecture
//!
//! Control flow runs leaf-first through five components:
//!
//! - [`resilience`] - every external call is funneled through a
//!   throttling-aware retry executor with exponential backoff and full
//!   jitter
//! - [`lifecycle`] - the Create/Update/Delete dispatch contract with
//!   idempotent identity and old/new state diffing
//! - [`fanout`] - bounded-concurrency application of one operation to many
//!   work items with asymmetric result aggregation
//! - [`workflow`] - an explicit Start/Execute/Wait/Verify/Choice state
//!   machine that polls an operation until it reaches a terminal status
//! - [`completion`] - poll-and-return or push-callback delivery of the
//!   final outcome, decoupled from the transport
//!
//! An external trigger starts a workflow; its Execute step may delegate to
//! the fan-out scheduler, which invokes lifecycle handlers whose external
//! calls all go through the backoff executor; the workflow polls its Verify
//! step until terminal, then the completion sink reports the outcome.
//!
//! ## Scheduling model
//!
//! Cooperative, step-at-a-time polling: no long-lived thread per workflow.
//! The fan-out batch is the only component with genuine parallelism; all
//! other components are single-threaded per invocation. The only suspension
//! points are the workflow's Wait state and the backoff delays.
//!
//! ## Quick start
//!
//! ```rust
//! use provision_core::types::{ExecutionStatus, StepResult};
//! use provision_core::workflow::{after_execute, WorkflowState};
//!
//! // Routing is a pure transition table over step statuses
//! assert_eq!(
//!     after_execute(Some(ExecutionStatus::AlreadyExists)),
//!     WorkflowState::Success
//! );
//!
//! let envelope = StepResult::failure("stack rollback");
//! assert_eq!(envelope.status, ExecutionStatus::Failure);
//! ```

pub mod completion;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod fanout;
pub mod lifecycle;
pub mod logging;
pub mod resilience;
pub mod types;
pub mod workflow;

pub use completion::{CompletionEnvelope, CompletionSink, CompletionStatus, CompletionTransport, PollingSink, PushSink};
pub use config::ProvisionConfig;
pub use constants::{is_retryable_code, WaitProfile};
pub use error::{ProvisionError, Result};
pub use events::EventPublisher;
pub use fanout::{FanOutBatchResult, FanOutError, FanOutRequest, FanOutScheduler, WorkItem};
pub use lifecycle::{
    HandlerOutput, LifecycleDispatcher, LifecycleRequest, PhysicalResourceId,
    ResourceLifecycleHandler, SetDiff,
};
pub use resilience::{BackoffExecutor, RemoteError, RetryError, RetryPolicy};
pub use types::{ExecutionStatus, StepResult};
pub use workflow::{
    after_execute, after_verify, FanOutStep, WorkflowEngine, WorkflowEngineConfig,
    WorkflowOutcome, WorkflowState, WorkflowSteps,
};
