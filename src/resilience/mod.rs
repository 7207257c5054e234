//! # Resilience Patterns
//!
//! Throttling-aware retry with exponential backoff and full jitter. Every
//! external call in the system is funneled through [`BackoffExecutor`]; no
//! component retries remote calls at its own layer.
//!
//! There is deliberately no circuit breaker: each call site retries
//! independently with no shared rate-limit budget across concurrent callers.

pub mod backoff;
pub mod classification;

pub use backoff::{BackoffExecutor, RetryError, RetryPolicy};
pub use classification::RemoteError;
