//! Poll-and-return and push-callback delivery of completion envelopes.

use crate::completion::envelope::CompletionEnvelope;
use crate::constants::system;
use crate::resilience::{BackoffExecutor, RemoteError, RetryPolicy};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Abstract sink for terminal results, decoupling workflow logic from the
/// delivery transport.
#[async_trait::async_trait]
pub trait CompletionSink: Send + Sync {
    /// Record or deliver a terminal result. Delivery problems are handled
    /// inside the sink; the workflow outcome never depends on them.
    async fn report(&self, envelope: CompletionEnvelope);
}

/// Polling mode: the invoker repeatedly asks for the current result.
#[derive(Debug, Default)]
pub struct PollingSink {
    last: Mutex<Option<CompletionEnvelope>>,
}

impl PollingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest reported result, if any
    pub fn status(&self) -> Option<CompletionEnvelope> {
        self.last.lock().clone()
    }
}

#[async_trait::async_trait]
impl CompletionSink for PollingSink {
    async fn report(&self, envelope: CompletionEnvelope) {
        *self.last.lock() = Some(envelope);
    }
}

/// Outbound delivery channel used by [`PushSink`], e.g. an HTTP PUT against
/// a presigned completion URL.
#[async_trait::async_trait]
pub trait CompletionTransport: Send + Sync {
    async fn send(&self, envelope: &CompletionEnvelope) -> Result<(), RemoteError>;
}

/// Push mode: the component received a one-time callback address at
/// invocation time and performs exactly one outbound delivery on reaching a
/// terminal state. The callback recipient may itself be transiently
/// unavailable, so delivery goes through the backoff executor with a small
/// fixed attempt count; failure after retries is logged and not re-attempted.
pub struct PushSink {
    transport: Arc<dyn CompletionTransport>,
    executor: BackoffExecutor,
}

impl PushSink {
    pub fn new(transport: Arc<dyn CompletionTransport>) -> Self {
        Self::with_attempts(transport, system::COMPLETION_DELIVERY_ATTEMPTS)
    }

    pub fn with_attempts(transport: Arc<dyn CompletionTransport>, attempts: u32) -> Self {
        Self {
            transport,
            executor: BackoffExecutor::with_policy(RetryPolicy {
                starting_delay: Duration::from_millis(system::DEFAULT_STARTING_DELAY_MS),
                max_attempts: attempts,
            }),
        }
    }
}

#[async_trait::async_trait]
impl CompletionSink for PushSink {
    async fn report(&self, envelope: CompletionEnvelope) {
        let mut envelope = envelope;
        if !envelope.is_success() && envelope.reason.is_none() {
            envelope.reason = Some("See structured logs for details".to_string());
        }

        let transport = self.transport.clone();
        let delivery = self
            .executor
            .execute(|| {
                let transport = transport.clone();
                let envelope = envelope.clone();
                async move { transport.send(&envelope).await }
            })
            .await;

        match delivery {
            Ok(()) => {
                info!(
                    physical_resource_id = %envelope.physical_resource_id,
                    status = ?envelope.status,
                    "Completion delivered"
                );
            }
            Err(retry_error) => {
                error!(
                    physical_resource_id = %envelope.physical_resource_id,
                    error = %retry_error,
                    "Completion delivery failed, giving up"
                );
            }
        }
    }
}
