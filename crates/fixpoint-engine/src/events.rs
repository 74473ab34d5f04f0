use std::collections::BTreeSet;

use fixpoint_core::FlagSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForcedMutations {
    set: BTreeSet<String>,
    clear: BTreeSet<String>,
}

impl ForcedMutations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_flag(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.clear.remove(&name);
        self.set.insert(name);
        self
    }

    pub fn clear_flag(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.set.remove(&name);
        self.clear.insert(name);
        self
    }

    pub fn merge(mut self, later: ForcedMutations) -> Self {
        for name in later.set {
            self.clear.remove(&name);
            self.set.insert(name);
        }
        for name in later.clear {
            self.set.remove(&name);
            self.clear.insert(name);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.clear.is_empty()
    }

    pub fn set_flags(&self) -> impl Iterator<Item = &str> {
        self.set.iter().map(String::as_str)
    }

    pub fn clear_flags(&self) -> impl Iterator<Item = &str> {
        self.clear.iter().map(String::as_str)
    }

    pub fn apply(&self, flags: &mut FlagSet) -> bool {
        let mut changed = false;
        for name in &self.set {
            changed |= flags.set(name);
        }
        for name in &self.clear {
            changed |= flags.clear(name);
        }
        changed
    }
}
