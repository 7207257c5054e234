use crate::constants::system;
use crate::error::{ProvisionError, Result};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub max_concurrency: usize,
    pub retry_max_attempts: u32,
    pub retry_starting_delay_ms: u64,
    pub wait_interval_seconds: u64,
    pub completion_delivery_attempts: u32,
    pub event_channel_capacity: usize,
    pub custom_settings: HashMap<String, String>,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            max_concurrency: system::DEFAULT_MAX_CONCURRENCY,
            retry_max_attempts: system::DEFAULT_MAX_ATTEMPTS,
            retry_starting_delay_ms: system::DEFAULT_STARTING_DELAY_MS,
            wait_interval_seconds: system::STACK_WAIT_SECONDS,
            completion_delivery_attempts: system::COMPLETION_DELIVERY_ATTEMPTS,
            event_channel_capacity: 1000,
            custom_settings: HashMap::new(),
        }
    }
}

impl ProvisionConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(max_concurrency) = std::env::var("PROVISION_MAX_CONCURRENCY") {
            config.max_concurrency = max_concurrency.parse().map_err(|e| {
                ProvisionError::ConfigurationError(format!("Invalid max_concurrency: {e}"))
            })?;
        }

        if let Ok(max_attempts) = std::env::var("PROVISION_RETRY_MAX_ATTEMPTS") {
            config.retry_max_attempts = max_attempts.parse().map_err(|e| {
                ProvisionError::ConfigurationError(format!("Invalid retry_max_attempts: {e}"))
            })?;
        }

        if let Ok(starting_delay) = std::env::var("PROVISION_RETRY_STARTING_DELAY_MS") {
            config.retry_starting_delay_ms = starting_delay.parse().map_err(|e| {
                ProvisionError::ConfigurationError(format!("Invalid retry_starting_delay_ms: {e}"))
            })?;
        }

        if let Ok(wait_interval) = std::env::var("PROVISION_WAIT_INTERVAL_SECONDS") {
            config.wait_interval_seconds = wait_interval.parse().map_err(|e| {
                ProvisionError::ConfigurationError(format!("Invalid wait_interval_seconds: {e}"))
            })?;
        }

        Ok(config)
    }

    pub fn wait_interval(&self) -> Duration {
        Duration::from_secs(self.wait_interval_seconds)
    }

    pub fn retry_starting_delay(&self) -> Duration {
        Duration::from_millis(self.retry_starting_delay_ms)
    }
}
