//! # Fan-Out Execute Step
//!
//! Adapter that lets a workflow's Execute step delegate to the fan-out
//! scheduler: Execute dispatches the batch to completion, Verify reports the
//! stored aggregate so the engine's Choice routing terminates the run.

use crate::fanout::{FanOutBatchResult, FanOutRequest, FanOutScheduler, WorkItem};
use crate::resilience::RemoteError;
use crate::types::StepResult;
use crate::workflow::engine::WorkflowSteps;
use futures::future::BoxFuture;
use parking_lot::Mutex;

/// Wraps a fan-out batch as the Execute step of a workflow
pub struct FanOutStep<Op> {
    scheduler: FanOutScheduler,
    request: Mutex<Option<FanOutRequest>>,
    op: Op,
    batch: Mutex<Option<FanOutBatchResult>>,
}

impl<Op> FanOutStep<Op>
where
    Op: Fn(WorkItem) -> BoxFuture<'static, StepResult> + Send + Sync + Clone + 'static,
{
    pub fn new(scheduler: FanOutScheduler, request: FanOutRequest, op: Op) -> Self {
        Self {
            scheduler,
            request: Mutex::new(Some(request)),
            op,
            batch: Mutex::new(None),
        }
    }

    /// Per-item outcomes of the dispatched batch, once Execute has run
    pub fn batch_result(&self) -> Option<FanOutBatchResult> {
        self.batch.lock().clone()
    }
}

#[async_trait::async_trait]
impl<Op> WorkflowSteps for FanOutStep<Op>
where
    Op: Fn(WorkItem) -> BoxFuture<'static, StepResult> + Send + Sync + Clone + 'static,
{
    async fn execute(&self) -> Result<StepResult, RemoteError> {
        let request = self.request.lock().take();
        let Some(request) = request else {
            return Ok(StepResult::failure("fan-out batch already dispatched"));
        };

        match self.scheduler.run(request, self.op.clone()).await {
            Ok(batch) => {
                let result = if batch.aggregate.is_success_like() {
                    StepResult::new(batch.aggregate).with_data(
                        "completedItems",
                        serde_json::json!(batch.results.len()),
                    )
                } else {
                    StepResult::failure(format!(
                        "fan-out items failed: {:?}",
                        batch.failed_items()
                    ))
                };
                *self.batch.lock() = Some(batch);
                Ok(result)
            }
            Err(error) => Ok(StepResult::failure(error.to_string())),
        }
    }

    async fn verify(&self) -> Result<StepResult, RemoteError> {
        match self.batch.lock().as_ref() {
            Some(batch) => Ok(StepResult::new(batch.aggregate)),
            None => Ok(StepResult::failure("fan-out batch was never dispatched")),
        }
    }
}
