//! # Fan-Out Scheduler
//!
//! Semaphore-bounded dispatch of a batch of work items. Items are dispatched
//! up to `max_concurrency` in flight; as each completes the next queued item
//! starts. There is no completion-order guarantee and no fail-fast
//! cancellation.

use crate::constants::events;
use crate::events::EventPublisher;
use crate::fanout::{FanOutBatchResult, FanOutRequest, WorkItem};
use crate::types::{ExecutionStatus, StepResult};
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Errors detected before any item is dispatched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FanOutError {
    #[error("max_concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("duplicate work item id '{0}' in batch")]
    DuplicateItemId(String),

    #[error("dependency cycle involving items: {0:?}")]
    DependencyCycle(Vec<String>),
}

/// Bounded-concurrency batch scheduler
#[derive(Debug, Clone, Default)]
pub struct FanOutScheduler {
    events: EventPublisher,
}

impl FanOutScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_publisher(events: EventPublisher) -> Self {
        Self { events }
    }

    /// Run `op` over every item in the batch and reduce the outcomes.
    ///
    /// The aggregate is `FAILURE` iff any item's result is `FAILURE`; a
    /// non-mandatory item's failure is rewritten to
    /// `NON_MANDATORY_FAILURE` and counts toward success.
    pub async fn run<Op, Fut>(
        &self,
        request: FanOutRequest,
        op: Op,
    ) -> Result<FanOutBatchResult, FanOutError>
    where
        Op: Fn(WorkItem) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StepResult> + Send + 'static,
    {
        if request.max_concurrency == 0 {
            return Err(FanOutError::InvalidConcurrency);
        }

        let known_ids = validate_item_ids(&request.items)?;
        if let Some(involved) = find_dependency_cycle(&request.items) {
            return Err(FanOutError::DependencyCycle(involved));
        }

        if request.baseline_condition == Some(false) {
            info!(
                items = request.items.len(),
                "Baseline condition not met, skipping fan-out batch"
            );
            let _ = self
                .events
                .publish(
                    events::FANOUT_BATCH_SKIPPED,
                    serde_json::json!({ "items": request.items.len() }),
                )
                .await;
            return Ok(FanOutBatchResult {
                results: HashMap::new(),
                aggregate: ExecutionStatus::Success,
            });
        }

        info!(
            items = request.items.len(),
            max_concurrency = request.max_concurrency,
            "Dispatching fan-out batch"
        );
        let _ = self
            .events
            .publish(
                events::FANOUT_BATCH_STARTED,
                serde_json::json!({
                    "items": request.items.len(),
                    "maxConcurrency": request.max_concurrency,
                }),
            )
            .await;

        let semaphore = Arc::new(Semaphore::new(request.max_concurrency));
        let completed: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
        let (done_tx, done_rx) = watch::channel(());
        let done_tx = Arc::new(done_tx);
        let op = Arc::new(op);

        let mut join_set = JoinSet::new();
        for item in request.items {
            let semaphore = semaphore.clone();
            let completed = completed.clone();
            let done_tx = done_tx.clone();
            let mut done_rx = done_rx.clone();
            let op = op.clone();
            let dependencies: Vec<String> = item
                .depends_on
                .clone()
                .unwrap_or_default()
                .into_iter()
                .filter(|dep| {
                    let known = known_ids.contains(dep);
                    if !known {
                        warn!(item_id = %item.id, dependency = %dep, "Ignoring unknown dependency");
                    }
                    known
                })
                .collect();

            join_set.spawn(async move {
                // Dependencies are awaited before taking a permit so a
                // waiting item cannot starve its own dependency chain
                while !dependencies.iter().all(|dep| completed.lock().contains(dep)) {
                    if done_rx.changed().await.is_err() {
                        break;
                    }
                }

                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("fan-out semaphore closed");

                debug!(item_id = %item.id, "Work item dispatched");
                let outcome = {
                    let item = item.clone();
                    let op = op.clone();
                    AssertUnwindSafe(async move { (*op)(item).await })
                        .catch_unwind()
                        .await
                };
                let result = match outcome {
                    Ok(result) => result,
                    Err(_) => StepResult::failure("work item operation panicked"),
                };

                completed.lock().insert(item.id.clone());
                let _ = done_tx.send(());

                (item, result)
            });
        }

        let mut results = HashMap::new();
        let mut aggregate = ExecutionStatus::Success;
        while let Some(joined) = join_set.join_next().await {
            let (item, mut result) = joined.expect("fan-out item task failed to join");

            if result.is_failure() && !item.mandatory {
                debug!(item_id = %item.id, "Tolerating non-mandatory item failure");
                result.status = ExecutionStatus::NonMandatoryFailure;
            }
            if result.is_failure() {
                aggregate = ExecutionStatus::Failure;
            }

            let _ = self
                .events
                .publish(
                    events::FANOUT_ITEM_COMPLETED,
                    serde_json::json!({
                        "itemId": item.id.clone(),
                        "status": result.status.to_string(),
                    }),
                )
                .await;
            results.insert(item.id, result);
        }

        info!(
            items = results.len(),
            aggregate = %aggregate,
            "Fan-out batch completed"
        );
        let _ = self
            .events
            .publish(
                events::FANOUT_BATCH_COMPLETED,
                serde_json::json!({ "aggregate": aggregate.to_string() }),
            )
            .await;

        Ok(FanOutBatchResult { results, aggregate })
    }
}

/// Check id uniqueness and return the set of known ids
fn validate_item_ids(items: &[WorkItem]) -> Result<HashSet<String>, FanOutError> {
    let mut known = HashSet::with_capacity(items.len());
    for item in items {
        if !known.insert(item.id.clone()) {
            return Err(FanOutError::DuplicateItemId(item.id.clone()));
        }
    }
    Ok(known)
}

/// Kahn's algorithm over the ordering hints; returns the items left in a
/// cycle, if any. Unknown dependency ids do not participate.
fn find_dependency_cycle(items: &[WorkItem]) -> Option<Vec<String>> {
    let known: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
    let mut indegree: HashMap<&str, usize> = HashMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for item in items {
        indegree.entry(item.id.as_str()).or_insert(0);
        for dep in item.depends_on.iter().flatten() {
            if known.contains(dep.as_str()) {
                *indegree.entry(item.id.as_str()).or_insert(0) += 1;
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(item.id.as_str());
            }
        }
    }

    let mut ready: Vec<&str> = indegree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut resolved = 0usize;

    while let Some(id) = ready.pop() {
        resolved += 1;
        for dependent in dependents.get(id).into_iter().flatten() {
            let degree = indegree.get_mut(dependent).expect("known dependent");
            *degree -= 1;
            if *degree == 0 {
                ready.push(dependent);
            }
        }
    }

    if resolved == items.len() {
        None
    } else {
        let mut involved: Vec<String> = indegree
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(id, _)| id.to_string())
            .collect();
        involved.sort_unstable();
        Some(involved)
    }
}
