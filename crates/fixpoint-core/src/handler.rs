use std::collections::BTreeSet;
use std::fmt;

use anyhow::{bail, Result};

use crate::Guard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    Declined(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    Succeeded,
    Declined(String),
    Failed(String),
}

impl HandlerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Declined(_) => "declined",
            Self::Failed(_) => "failed",
        }
    }
}

pub enum HandlerAction<C> {
    FlagOnly,
    Invoke(Box<dyn FnMut(&mut C) -> Result<ActionOutcome>>),
}

impl<C> fmt::Debug for HandlerAction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlagOnly => f.write_str("FlagOnly"),
            Self::Invoke(_) => f.write_str("Invoke"),
        }
    }
}

#[derive(Debug)]
pub struct Handler<C> {
    name: String,
    guard: Guard,
    action: HandlerAction<C>,
    set_on_success: BTreeSet<String>,
    clear_on_success: BTreeSet<String>,
}

impl<C> Handler<C> {
    pub fn invoke<F>(name: impl Into<String>, guard: Guard, action: F) -> Self
    where
        F: FnMut(&mut C) -> Result<ActionOutcome> + 'static,
    {
        Self {
            name: name.into(),
            guard,
            action: HandlerAction::Invoke(Box::new(action)),
            set_on_success: BTreeSet::new(),
            clear_on_success: BTreeSet::new(),
        }
    }

    pub fn flag_only(name: impl Into<String>, guard: Guard) -> Self {
        Self {
            name: name.into(),
            guard,
            action: HandlerAction::FlagOnly,
            set_on_success: BTreeSet::new(),
            clear_on_success: BTreeSet::new(),
        }
    }

    pub fn sets(mut self, name: impl Into<String>) -> Self {
        self.set_on_success.insert(name.into());
        self
    }

    pub fn clears(mut self, name: impl Into<String>) -> Self {
        self.clear_on_success.insert(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn has_external_action(&self) -> bool {
        matches!(self.action, HandlerAction::Invoke(_))
    }

    pub fn run_action(&mut self, ctx: &mut C) -> Result<ActionOutcome> {
        match &mut self.action {
            HandlerAction::FlagOnly => Ok(ActionOutcome::Completed),
            HandlerAction::Invoke(action) => action(ctx),
        }
    }

    pub fn set_on_success(&self) -> impl Iterator<Item = &str> {
        self.set_on_success.iter().map(String::as_str)
    }

    pub fn clear_on_success(&self) -> impl Iterator<Item = &str> {
        self.clear_on_success.iter().map(String::as_str)
    }
}

#[derive(Debug, Default)]
pub struct HandlerRegistry<C> {
    handlers: Vec<Handler<C>>,
}

impl<C> HandlerRegistry<C> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn register(&mut self, handler: Handler<C>) -> Result<()> {
        if let Some(name) = handler.guard.contradiction() {
            bail!(
                "handler '{}' requires flag '{}' both present and absent",
                handler.name,
                name
            );
        }
        if self
            .handlers
            .iter()
            .any(|existing| existing.name == handler.name)
        {
            bail!("handler '{}' is already registered", handler.name);
        }
        if handler.guard.is_unconditional() {
            if handler.has_external_action() {
                bail!(
                    "unconditionally guarded handler '{}' must not perform an external action",
                    handler.name
                );
            }
            if !handler.set_on_success.is_empty() {
                bail!(
                    "unconditionally guarded handler '{}' must only clear flags",
                    handler.name
                );
            }
        }

        self.handlers.push(handler);
        Ok(())
    }

    pub fn require_absent_everywhere(&mut self, name: &str) {
        for handler in &mut self.handlers {
            handler.guard.add_required_absent(name);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handler_names(&self) -> Vec<String> {
        self.handlers
            .iter()
            .map(|handler| handler.name.clone())
            .collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Handler<C>> {
        self.handlers.iter_mut()
    }
}
