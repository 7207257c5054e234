//! # Polling Workflow Engine
//!
//! Drives one long-running external operation to a terminal status:
//! Execute, then Wait/Verify cycles until Verify returns a terminal value.
//! Transient call failures inside Execute/Verify are absorbed by the backoff
//! executor within that single step invocation; the Wait/Verify loop is for
//! an operation that is legitimately still running, never for retrying a
//! failed call.

use crate::constants::{events, WaitProfile};
use crate::events::EventPublisher;
use crate::resilience::{BackoffExecutor, RemoteError, RetryPolicy};
use crate::types::{ExecutionStatus, StepResult};
use crate::workflow::states::{after_execute, after_verify, WorkflowState};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The Execute/Verify step pair driven by the engine.
///
/// `finalize` mirrors a try/finally discipline: it always runs after
/// Execute, whether Execute succeeded or raised, so partially-created
/// resources are either confirmed or cleaned up.
#[async_trait::async_trait]
pub trait WorkflowSteps: Send + Sync {
    /// Start the long-running operation
    async fn execute(&self) -> Result<StepResult, RemoteError>;

    /// Poll the operation's status
    async fn verify(&self) -> Result<StepResult, RemoteError>;

    /// Compensation hook; the outcome passed in is Execute's result, with
    /// raised errors already converted to a failure envelope
    async fn finalize(&self, _execute_outcome: &StepResult) {}
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct WorkflowEngineConfig {
    /// Suspension between Verify polls
    pub wait_interval: Duration,

    /// Optional hard deadline on the whole run, checked as an extra Choice
    /// branch before each Wait. The base design has no deadline; a stuck
    /// external operation then polls until the hosting scheduler kills it.
    pub deadline: Option<Duration>,

    /// Retry policy applied to each Execute/Verify invocation
    pub retry_policy: RetryPolicy,
}

impl Default for WorkflowEngineConfig {
    fn default() -> Self {
        Self {
            wait_interval: WaitProfile::Stack.interval(),
            deadline: None,
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl WorkflowEngineConfig {
    /// Preset wait interval for the given operation class
    pub fn for_profile(profile: WaitProfile) -> Self {
        Self {
            wait_interval: profile.interval(),
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Terminal outcome of one engine run
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub workflow_id: Uuid,

    /// `Success` or `Fail`
    pub state: WorkflowState,

    /// The step result captured at the terminal transition; carries the
    /// `errorDetail` from the point of failure
    pub result: StepResult,

    /// Number of Verify invocations performed
    pub verify_cycles: u32,

    /// Status history of the logical operation, Execute first
    pub history: Vec<ExecutionStatus>,
}

impl WorkflowOutcome {
    pub fn is_success(&self) -> bool {
        self.state == WorkflowState::Success
    }
}

/// Explicit polling state machine for one logical operation
#[derive(Debug, Clone, Default)]
pub struct WorkflowEngine {
    config: WorkflowEngineConfig,
    backoff: BackoffExecutor,
    events: EventPublisher,
}

impl WorkflowEngine {
    pub fn new(config: WorkflowEngineConfig) -> Self {
        Self {
            backoff: BackoffExecutor::with_policy(config.retry_policy),
            config,
            events: EventPublisher::default(),
        }
    }

    pub fn with_event_publisher(mut self, events: EventPublisher) -> Self {
        self.events = events;
        self
    }

    /// Run the state machine to a terminal state.
    ///
    /// Execute always completes (successfully or not) before Wait/Verify
    /// begins; `finalize` runs unconditionally after Execute.
    pub async fn run<S: WorkflowSteps + ?Sized>(&self, steps: &S) -> WorkflowOutcome {
        let workflow_id = Uuid::new_v4();
        let started = Instant::now();
        let mut history = Vec::new();

        info!(workflow_id = %workflow_id, "Workflow started");
        let _ = self
            .events
            .publish(
                events::WORKFLOW_STARTED,
                serde_json::json!({ "workflowId": workflow_id }),
            )
            .await;

        let execute_result = match self.backoff.execute(|| steps.execute()).await {
            Ok(result) => result,
            Err(retry_error) => StepResult::failure(retry_error.to_string()),
        };
        steps.finalize(&execute_result).await;
        history.push(execute_result.status);

        let mut state = after_execute(Some(execute_result.status));
        self.publish_transition(workflow_id, WorkflowState::Execute, state).await;

        if state.is_terminal() {
            return self
                .finish(workflow_id, state, execute_result, 0, history)
                .await;
        }

        let mut verify_cycles = 0u32;
        loop {
            // Deadline guard: an explicit extra Choice branch before
            // suspending again
            if let Some(deadline) = self.config.deadline {
                if started.elapsed() >= deadline {
                    warn!(workflow_id = %workflow_id, ?deadline, "Workflow deadline exceeded");
                    let result = StepResult::failure(format!(
                        "workflow deadline of {deadline:?} exceeded while polling"
                    ));
                    return self
                        .finish(workflow_id, WorkflowState::Fail, result, verify_cycles, history)
                        .await;
                }
            }

            debug!(workflow_id = %workflow_id, "Waiting before verify");
            tokio::time::sleep(self.config.wait_interval).await;

            let verify_result = match self.backoff.execute(|| steps.verify()).await {
                Ok(result) => result,
                Err(retry_error) => StepResult::failure(retry_error.to_string()),
            };
            verify_cycles += 1;
            history.push(verify_result.status);

            state = after_verify(Some(verify_result.status));
            self.publish_transition(workflow_id, WorkflowState::Verify, state).await;

            if state.is_terminal() {
                return self
                    .finish(workflow_id, state, verify_result, verify_cycles, history)
                    .await;
            }
        }
    }

    async fn publish_transition(&self, workflow_id: Uuid, from: WorkflowState, to: WorkflowState) {
        debug!(workflow_id = %workflow_id, from = %from, to = %to, "Workflow transition");
        let _ = self
            .events
            .publish(
                events::WORKFLOW_STATE_CHANGED,
                serde_json::json!({
                    "workflowId": workflow_id,
                    "from": from.to_string(),
                    "to": to.to_string(),
                }),
            )
            .await;
    }

    async fn finish(
        &self,
        workflow_id: Uuid,
        state: WorkflowState,
        result: StepResult,
        verify_cycles: u32,
        history: Vec<ExecutionStatus>,
    ) -> WorkflowOutcome {
        let event_name = if state == WorkflowState::Success {
            info!(workflow_id = %workflow_id, status = %result.status, "Workflow succeeded");
            events::WORKFLOW_COMPLETED
        } else {
            warn!(
                workflow_id = %workflow_id,
                error_detail = result.error_detail.as_deref().unwrap_or("unknown"),
                "Workflow failed"
            );
            events::WORKFLOW_FAILED
        };
        let _ = self
            .events
            .publish(
                event_name,
                serde_json::json!({
                    "workflowId": workflow_id,
                    "status": result.status.to_string(),
                }),
            )
            .await;

        WorkflowOutcome {
            workflow_id,
            state,
            result,
            verify_cycles,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Scripted steps: each invocation pops the next programmed outcome
    struct ScriptedSteps {
        execute_script: Mutex<Vec<Result<StepResult, RemoteError>>>,
        verify_script: Mutex<Vec<Result<StepResult, RemoteError>>>,
        execute_calls: AtomicU32,
        finalized: AtomicBool,
    }

    impl ScriptedSteps {
        fn new(
            execute_script: Vec<Result<StepResult, RemoteError>>,
            verify_script: Vec<Result<StepResult, RemoteError>>,
        ) -> Self {
            Self {
                execute_script: Mutex::new(execute_script),
                verify_script: Mutex::new(verify_script),
                execute_calls: AtomicU32::new(0),
                finalized: AtomicBool::new(false),
            }
        }
    }

    #[async_trait::async_trait]
    impl WorkflowSteps for ScriptedSteps {
        async fn execute(&self) -> Result<StepResult, RemoteError> {
            self.execute_calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.execute_script.lock();
            if script.is_empty() {
                return Ok(StepResult::success());
            }
            script.remove(0)
        }

        async fn verify(&self) -> Result<StepResult, RemoteError> {
            let mut script = self.verify_script.lock();
            if script.is_empty() {
                return Ok(StepResult::success());
            }
            script.remove(0)
        }

        async fn finalize(&self, _execute_outcome: &StepResult) {
            self.finalized.store(true, Ordering::SeqCst);
        }
    }

    fn fast_engine() -> WorkflowEngine {
        WorkflowEngine::new(WorkflowEngineConfig {
            wait_interval: Duration::from_millis(1),
            deadline: None,
            retry_policy: RetryPolicy {
                starting_delay: Duration::from_millis(1),
                max_attempts: 3,
            },
        })
    }

    #[tokio::test]
    async fn test_already_exists_short_circuits_without_polling() {
        let steps = ScriptedSteps::new(vec![Ok(StepResult::already_exists())], vec![]);
        let outcome = fast_engine().run(&steps).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.verify_cycles, 0);
        assert_eq!(outcome.history, vec![ExecutionStatus::AlreadyExists]);
    }

    #[tokio::test]
    async fn test_execute_failure_fails_immediately() {
        let steps = ScriptedSteps::new(vec![Ok(StepResult::failure("quota exceeded"))], vec![]);
        let outcome = fast_engine().run(&steps).await;

        assert_eq!(outcome.state, WorkflowState::Fail);
        assert_eq!(outcome.result.error_detail.as_deref(), Some("quota exceeded"));
        assert_eq!(outcome.verify_cycles, 0);
    }

    #[tokio::test]
    async fn test_finalize_runs_when_execute_raises() {
        let steps = ScriptedSteps::new(
            vec![Err(RemoteError::new("AccessDeniedException", "denied"))],
            vec![],
        );
        let outcome = fast_engine().run(&steps).await;

        assert_eq!(outcome.state, WorkflowState::Fail);
        assert!(steps.finalized.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_transient_execute_errors_are_invisible() {
        let steps = ScriptedSteps::new(
            vec![
                Err(RemoteError::new("ThrottlingException", "rate")),
                Err(RemoteError::new("ThrottlingException", "rate")),
                Ok(StepResult::already_exists()),
            ],
            vec![],
        );
        let outcome = fast_engine().run(&steps).await;

        assert!(outcome.is_success());
        assert_eq!(steps.execute_calls.load(Ordering::SeqCst), 3);
        // Retries never appear in the status history
        assert_eq!(outcome.history, vec![ExecutionStatus::AlreadyExists]);
    }

    #[tokio::test]
    async fn test_polls_until_verify_succeeds() {
        let steps = ScriptedSteps::new(
            vec![Ok(StepResult::in_progress())],
            vec![
                Ok(StepResult::in_progress()),
                Ok(StepResult::in_progress()),
                Ok(StepResult::success()),
            ],
        );
        let outcome = fast_engine().run(&steps).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.verify_cycles, 3);
    }

    #[tokio::test]
    async fn test_deadline_is_an_explicit_fail_branch() {
        let engine = WorkflowEngine::new(WorkflowEngineConfig {
            wait_interval: Duration::from_millis(5),
            deadline: Some(Duration::from_millis(20)),
            retry_policy: RetryPolicy {
                starting_delay: Duration::from_millis(1),
                max_attempts: 1,
            },
        });
        // Verify never leaves IN_PROGRESS
        let steps = ScriptedSteps::new(vec![Ok(StepResult::success())], vec![]);
        struct StuckSteps(ScriptedSteps);

        #[async_trait::async_trait]
        impl WorkflowSteps for StuckSteps {
            async fn execute(&self) -> Result<StepResult, RemoteError> {
                self.0.execute().await
            }
            async fn verify(&self) -> Result<StepResult, RemoteError> {
                Ok(StepResult::in_progress())
            }
        }

        let outcome = engine.run(&StuckSteps(steps)).await;
        assert_eq!(outcome.state, WorkflowState::Fail);
        assert!(outcome
            .result
            .error_detail
            .as_deref()
            .unwrap()
            .contains("deadline"));
    }
}
