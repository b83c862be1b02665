//! Priority aliases such as `DefinePriority Services 3`.
//!
//! The table only lives for the duration of one parse; queries never consult it.
use std::collections::HashMap;

/// Ephemeral name to priority map. The first definition of a name wins.
#[derive(Debug, Default)]
pub struct PriorityAliases {
    targets: HashMap<String, u32>,
}

impl PriorityAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `name` unless it is already defined. Returns false for a redefinition.
    pub fn define(&mut self, name: &str, target: u32) -> bool {
        if self.targets.contains_key(name) {
            return false;
        }
        self.targets.insert(name.to_string(), target);
        true
    }

    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.targets.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
