use std::collections::BTreeSet;

use crate::FlagSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guard {
    requires_present: BTreeSet<String>,
    requires_absent: BTreeSet<String>,
}

impl Guard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(mut self, name: impl Into<String>) -> Self {
        self.requires_present.insert(name.into());
        self
    }

    pub fn when_not(mut self, name: impl Into<String>) -> Self {
        self.requires_absent.insert(name.into());
        self
    }

    pub fn passes(&self, flags: &FlagSet) -> bool {
        self.requires_present.iter().all(|name| flags.is_set(name))
            && self.requires_absent.iter().all(|name| !flags.is_set(name))
    }

    pub fn contradiction(&self) -> Option<&str> {
        self.requires_present
            .intersection(&self.requires_absent)
            .next()
            .map(String::as_str)
    }

    pub fn is_unconditional(&self) -> bool {
        self.requires_present.is_empty() && self.requires_absent.is_empty()
    }

    pub fn requires_present(&self) -> impl Iterator<Item = &str> {
        self.requires_present.iter().map(String::as_str)
    }

    pub fn requires_absent(&self) -> impl Iterator<Item = &str> {
        self.requires_absent.iter().map(String::as_str)
    }

    pub(crate) fn add_required_absent(&mut self, name: &str) {
        self.requires_absent.insert(name.to_string());
    }
}
