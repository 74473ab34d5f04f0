use anstyle::{AnsiColor, Style};
use fixpoint_core::HandlerOutcome;
use fixpoint_engine::ConvergenceReport;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    use std::io::IsTerminal;

    if std::env::var_os("NO_COLOR").is_some() {
        return OutputStyle::Plain;
    }
    if std::io::stdout().is_terminal() {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

fn colorize(style: Style, text: &str) -> String {
    format!("{style}{text}{style:#}")
}

fn succeeded_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::Green.into()))
}

fn declined_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::Yellow.into()))
}

fn failed_style() -> Style {
    Style::new().fg_color(Some(AnsiColor::Red.into())).bold()
}

pub(crate) fn report_lines(report: &ConvergenceReport, style: OutputStyle) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "converged in {} pass{}",
        report.passes,
        if report.passes == 1 { "" } else { "es" }
    ));

    if report.executions.is_empty() {
        lines.push("no handlers fired; state already converged".to_string());
        return lines;
    }

    for execution in &report.executions {
        let outcome = match (&execution.outcome, style) {
            (HandlerOutcome::Succeeded, OutputStyle::Plain) => "succeeded".to_string(),
            (HandlerOutcome::Succeeded, OutputStyle::Rich) => {
                colorize(succeeded_style(), "succeeded")
            }
            (HandlerOutcome::Declined(reason), OutputStyle::Plain) => {
                format!("declined: {reason}")
            }
            (HandlerOutcome::Declined(reason), OutputStyle::Rich) => {
                format!("{}: {reason}", colorize(declined_style(), "declined"))
            }
            (HandlerOutcome::Failed(error), OutputStyle::Plain) => format!("failed: {error}"),
            (HandlerOutcome::Failed(error), OutputStyle::Rich) => {
                format!("{}: {error}", colorize(failed_style(), "failed"))
            }
        };
        lines.push(format!(
            "pass {}: {} {}",
            execution.pass, execution.handler, outcome
        ));
    }

    let failures = report.failures();
    if !failures.is_empty() {
        lines.push(format!(
            "{} handler(s) failed and will be retried on the next run",
            failures.len()
        ));
    }
    lines
}
