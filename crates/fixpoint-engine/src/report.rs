use fixpoint_core::HandlerOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerExecution {
    pub pass: usize,
    pub handler: String,
    pub outcome: HandlerOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergenceReport {
    pub passes: usize,
    pub changed: bool,
    pub executions: Vec<HandlerExecution>,
}

impl ConvergenceReport {
    pub fn failures(&self) -> Vec<&HandlerExecution> {
        self.executions
            .iter()
            .filter(|execution| matches!(execution.outcome, HandlerOutcome::Failed(_)))
            .collect()
    }

    pub fn succeeded(&self, handler: &str) -> bool {
        self.executions.iter().any(|execution| {
            execution.handler == handler && execution.outcome == HandlerOutcome::Succeeded
        })
    }

    pub fn executed(&self, handler: &str) -> bool {
        self.executions
            .iter()
            .any(|execution| execution.handler == handler)
    }
}
