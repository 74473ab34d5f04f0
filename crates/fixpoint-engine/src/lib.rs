mod events;
mod report;
mod run;

pub use events::ForcedMutations;
pub use report::{ConvergenceReport, HandlerExecution};
pub use run::converge;
