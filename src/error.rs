use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ProvisionError {
    RetryExhausted(String),
    RemoteCallError(String),
    LifecycleError(String),
    FanOutError(String),
    WorkflowError(String),
    CompletionError(String),
    ConfigurationError(String),
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::RetryExhausted(msg) => write!(f, "Retry exhausted: {msg}"),
            ProvisionError::RemoteCallError(msg) => write!(f, "Remote call error: {msg}"),
            ProvisionError::LifecycleError(msg) => write!(f, "Lifecycle error: {msg}"),
            ProvisionError::FanOutError(msg) => write!(f, "Fan-out error: {msg}"),
            ProvisionError::WorkflowError(msg) => write!(f, "Workflow error: {msg}"),
            ProvisionError::CompletionError(msg) => write!(f, "Completion error: {msg}"),
            ProvisionError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ProvisionError {}

pub type Result<T> = std::result::Result<T, ProvisionError>;
