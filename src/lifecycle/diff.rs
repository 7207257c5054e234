//! # Desired-State Set Difference
//!
//! Update handlers for association-style resources compute the set
//! difference between old and new desired state and issue only incremental
//! add/remove mutations, instead of unconditionally replacing the whole
//! resource.

/// Incremental mutation plan derived from old and new desired state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetDiff {
    /// Members present in the new state but not the old
    pub to_add: Vec<String>,

    /// Members present in the old state but not the new
    pub to_remove: Vec<String>,
}

impl SetDiff {
    /// Compute the difference, preserving the input ordering of each side
    pub fn compute(old: &[String], new: &[String]) -> Self {
        let to_add = new
            .iter()
            .filter(|member| !old.contains(member))
            .cloned()
            .collect();
        let to_remove = old
            .iter()
            .filter(|member| !new.contains(member))
            .cloned()
            .collect();
        Self { to_add, to_remove }
    }

    /// True when old and new desired state are identical as sets
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}
