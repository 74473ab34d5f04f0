mod flags;
mod guard;
mod handler;

pub use flags::FlagSet;
pub use guard::Guard;
pub use handler::{
    ActionOutcome, Handler, HandlerAction, HandlerOutcome, HandlerRegistry,
};

#[cfg(test)]
mod tests;
