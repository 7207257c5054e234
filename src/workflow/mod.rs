//! # Workflow Engine
//!
//! A small explicit state machine (Start, Execute, Wait, Verify, Choice,
//! Success, Fail) that drives a long-running external operation to a
//! terminal status. Routing is a pure transition table over
//! [`crate::types::ExecutionStatus`], independently testable without any
//! workflow runtime; the engine adds the Wait suspension, per-step retry
//! through the backoff executor and the finalize compensation hook.

pub mod engine;
pub mod fanout_step;
pub mod states;

pub use engine::{WorkflowEngine, WorkflowEngineConfig, WorkflowOutcome, WorkflowSteps};
pub use fanout_step::FanOutStep;
pub use states::{after_execute, after_verify, WorkflowState};
