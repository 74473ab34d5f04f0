use anyhow::{bail, Result};
use fixpoint_core::{ActionOutcome, FlagSet, HandlerOutcome, HandlerRegistry};

use crate::events::ForcedMutations;
use crate::report::{ConvergenceReport, HandlerExecution};

pub fn converge<C>(
    registry: &mut HandlerRegistry<C>,
    ctx: &mut C,
    flags: &mut FlagSet,
    forced: &ForcedMutations,
) -> Result<ConvergenceReport> {
    let mut changed = forced.apply(flags);
    let mut executions: Vec<HandlerExecution> = Vec::new();
    let pass_cap = registry.len() + 1;
    let mut passes = 0;

    loop {
        passes += 1;
        let mut pass_changed = false;
        let mut fired: Vec<String> = Vec::new();

        for handler in registry.iter_mut() {
            if !handler.guard().passes(flags) {
                continue;
            }

            let name = handler.name().to_string();
            let outcome = match handler.run_action(ctx) {
                Ok(ActionOutcome::Completed) => {
                    let mutations: Vec<(String, bool)> = handler
                        .set_on_success()
                        .map(|flag| (flag.to_string(), true))
                        .chain(
                            handler
                                .clear_on_success()
                                .map(|flag| (flag.to_string(), false)),
                        )
                        .collect();
                    for (flag, present) in mutations {
                        let flag_changed = if present {
                            flags.set(&flag)
                        } else {
                            flags.clear(&flag)
                        };
                        pass_changed |= flag_changed;
                    }
                    fired.push(name.clone());
                    HandlerOutcome::Succeeded
                }
                Ok(ActionOutcome::Declined(reason)) => HandlerOutcome::Declined(reason),
                Err(err) => HandlerOutcome::Failed(format!("{err:#}")),
            };

            executions.push(HandlerExecution {
                pass: passes,
                handler: name,
                outcome,
            });
        }

        if !pass_changed {
            break;
        }
        changed = true;

        if passes >= pass_cap {
            bail!(
                "no fixed point after {} passes; flags were still changing, \
                 handlers fired in the final pass: {}",
                passes,
                fired.join(", ")
            );
        }
    }

    Ok(ConvergenceReport {
        passes,
        changed,
        executions,
    })
}
