//! # Physical Resource Id
//!
//! Stable identity string for an externally provisioned resource. For a given
//! logical resource the same input properties always yield the same physical
//! id; a changed id across an Update signals that the old physical resource
//! must be torn down after the new one succeeds, and a mismatched id on
//! Delete guards against acting twice on a resource that was already
//! replaced.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhysicalResourceId(String);

impl PhysicalResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Deterministic id from a resource kind and the identifying parts of
    /// the input properties
    pub fn from_parts(kind: &str, parts: &[&str]) -> Self {
        let mut id = String::from(kind);
        for part in parts {
            id.push('-');
            id.push_str(part);
        }
        Self(id)
    }

    /// Explicit fallback for resources with no deterministic identity.
    /// Never used implicitly.
    pub fn random_fallback() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhysicalResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PhysicalResourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
