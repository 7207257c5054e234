//! End-to-end workflow engine scenarios: polling until a terminal status,
//! short-circuiting on terminal success aliases, and the full
//! workflow -> fan-out -> lifecycle -> backoff composition.

use futures::FutureExt;
use parking_lot::Mutex;
use provision_core::completion::{CompletionSink, PollingSink};
use provision_core::fanout::{FanOutRequest, FanOutScheduler, WorkItem};
use provision_core::lifecycle::{
    HandlerOutput, LifecycleDispatcher, LifecycleRequest, PhysicalResourceId,
    ResourceLifecycleHandler,
};
use provision_core::resilience::{BackoffExecutor, RemoteError, RetryPolicy};
use provision_core::types::{ExecutionStatus, StepResult};
use provision_core::workflow::{
    FanOutStep, WorkflowEngine, WorkflowEngineConfig, WorkflowState, WorkflowSteps,
};
use provision_core::CompletionEnvelope;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

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

struct PollingOperation {
    verify_results: Mutex<Vec<StepResult>>,
}

#[async_trait::async_trait]
impl WorkflowSteps for PollingOperation {
    async fn execute(&self) -> Result<StepResult, RemoteError> {
        Ok(StepResult::in_progress())
    }

    async fn verify(&self) -> Result<StepResult, RemoteError> {
        Ok(self.verify_results.lock().remove(0))
    }
}

/// Scenario A: Execute returns IN_PROGRESS, Verify returns IN_PROGRESS twice
/// then SUCCESS; the engine walks
/// Start -> Execute -> Wait -> Verify -> Wait -> Verify -> Wait -> Verify -> Success.
#[tokio::test]
async fn scenario_a_polls_three_times_then_succeeds() {
    let steps = PollingOperation {
        verify_results: Mutex::new(vec![
            StepResult::in_progress(),
            StepResult::in_progress(),
            StepResult::success(),
        ]),
    };

    let outcome = fast_engine().run(&steps).await;

    assert_eq!(outcome.state, WorkflowState::Success);
    assert_eq!(outcome.verify_cycles, 3);
    assert_eq!(
        outcome.history,
        vec![
            ExecutionStatus::InProgress,
            ExecutionStatus::InProgress,
            ExecutionStatus::InProgress,
            ExecutionStatus::Success,
        ]
    );
}

struct AlreadyProvisioned;

#[async_trait::async_trait]
impl WorkflowSteps for AlreadyProvisioned {
    async fn execute(&self) -> Result<StepResult, RemoteError> {
        Ok(StepResult::already_exists())
    }

    async fn verify(&self) -> Result<StepResult, RemoteError> {
        panic!("verify must never run for a short-circuited workflow");
    }
}

/// Scenario B: Execute returns ALREADY_EXISTS; the engine goes
/// Start -> Execute -> Success without ever entering Wait.
#[tokio::test]
async fn scenario_b_already_exists_skips_polling() {
    let outcome = fast_engine().run(&AlreadyProvisioned).await;

    assert_eq!(outcome.state, WorkflowState::Success);
    assert_eq!(outcome.verify_cycles, 0);
    assert_eq!(outcome.history, vec![ExecutionStatus::AlreadyExists]);
}

/// Account-creation handler with a throttling control plane: the first call
/// per account is rejected with a rate signal, so success requires the
/// backoff executor underneath.
struct AccountHandler {
    accounts: Mutex<HashSet<String>>,
    throttled_once: Mutex<HashSet<String>>,
    remote_calls: AtomicU32,
    backoff: BackoffExecutor,
}

impl AccountHandler {
    fn new() -> Self {
        Self {
            accounts: Mutex::new(HashSet::new()),
            throttled_once: Mutex::new(HashSet::new()),
            remote_calls: AtomicU32::new(0),
            backoff: BackoffExecutor::with_policy(RetryPolicy {
                starting_delay: Duration::from_millis(1),
                max_attempts: 3,
            }),
        }
    }

    fn account_name(properties: &serde_json::Value) -> String {
        properties["accountName"].as_str().unwrap_or_default().to_string()
    }

    async fn create_account(&self, name: &str) -> Result<(), RemoteError> {
        self.remote_calls.fetch_add(1, Ordering::SeqCst);
        if self.throttled_once.lock().insert(name.to_string()) {
            return Err(RemoteError::new("TooManyRequestsException", "slow down"));
        }
        self.accounts.lock().insert(name.to_string());
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResourceLifecycleHandler for AccountHandler {
    fn resource_kind(&self) -> &'static str {
        "organization-account"
    }

    fn physical_resource_id(&self, properties: &serde_json::Value) -> PhysicalResourceId {
        PhysicalResourceId::from_parts("account", &[&Self::account_name(properties)])
    }

    async fn on_create(
        &self,
        properties: &serde_json::Value,
    ) -> Result<HandlerOutput, RemoteError> {
        let name = Self::account_name(properties);
        self.backoff
            .execute(|| self.create_account(&name))
            .await
            .map_err(|error| error.remote_error().clone())?;
        Ok(HandlerOutput::new().with_data("accountName", serde_json::json!(name)))
    }

    async fn on_update(
        &self,
        _old_properties: &serde_json::Value,
        _new_properties: &serde_json::Value,
        _physical_resource_id: &PhysicalResourceId,
    ) -> Result<HandlerOutput, RemoteError> {
        Ok(HandlerOutput::new())
    }

    async fn on_delete(
        &self,
        properties: &serde_json::Value,
        _physical_resource_id: &PhysicalResourceId,
    ) -> Result<HandlerOutput, RemoteError> {
        self.accounts.lock().remove(&Self::account_name(properties));
        Ok(HandlerOutput::new())
    }
}

/// Full composition: the workflow's Execute step fans out account creation
/// across target accounts, each item dispatching a lifecycle request whose
/// external calls go through the backoff executor; the outcome is reported
/// through a completion sink.
#[tokio::test]
async fn end_to_end_provisioning_flow() {
    let dispatcher = Arc::new(LifecycleDispatcher::new());
    let handler = Arc::new(AccountHandler::new());
    dispatcher.register(handler.clone());

    let items: Vec<WorkItem> = ["audit", "log-archive", "workload-1"]
        .iter()
        .map(|name| {
            WorkItem::new(
                format!("account-{name}"),
                serde_json::json!({ "accountName": name }),
            )
        })
        .collect();

    let op_dispatcher = dispatcher.clone();
    let step = FanOutStep::new(
        FanOutScheduler::new(),
        FanOutRequest::new(items, 2),
        move |item: WorkItem| {
            let dispatcher = op_dispatcher.clone();
            async move {
                let envelope = dispatcher
                    .dispatch(LifecycleRequest::Create {
                        resource_kind: "organization-account".to_string(),
                        properties: item.payload.clone(),
                    })
                    .await;
                if envelope.is_success() {
                    StepResult::success()
                } else {
                    StepResult::failure(envelope.reason.unwrap_or_default())
                }
            }
            .boxed()
        },
    );

    let outcome = fast_engine().run(&step).await;
    assert_eq!(outcome.state, WorkflowState::Success);

    // Every target account exists exactly once despite the throttled calls
    let accounts = handler.accounts.lock().clone();
    assert_eq!(accounts.len(), 3);
    // Each account needed one throttled attempt plus one successful attempt
    assert_eq!(handler.remote_calls.load(Ordering::SeqCst), 6);

    let batch = step.batch_result().unwrap();
    assert!(batch.is_success());
    assert_eq!(batch.results.len(), 3);

    // Report the terminal outcome through the polling sink
    let sink = PollingSink::new();
    sink.report(CompletionEnvelope::success(PhysicalResourceId::new(
        outcome.workflow_id.to_string(),
    )))
    .await;
    assert!(sink.status().unwrap().is_success());
}
