use std::collections::HashMap;

/// Tracks which entities have their detail panel open. Unseen keys are collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionMap {
    flags: HashMap<String, bool>,
}

impl ExpansionMap {
    /// Create an empty map where everything is collapsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag for `key` and return the new value.
    pub fn toggle(&mut self, key: &str) -> bool {
        let flag = self.flags.entry(key.to_string()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Whether `key` is currently expanded.
    pub fn is_expanded(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    /// Number of expanded entries.
    pub fn expanded_count(&self) -> usize {
        self.flags.values().filter(|flag| **flag).count()
    }

    /// Collapse everything.
    pub fn clear(&mut self) {
        self.flags.clear();
    }
}
