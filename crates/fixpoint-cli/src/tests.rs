use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};

use clap::Parser;
use clap_complete::Shell;
use fixpoint_core::HandlerOutcome;
use fixpoint_engine::{ConvergenceReport, HandlerExecution};
use fixpoint_host::StateLayout;

use crate::flows::{doctor_lines, mutate_fact, status_lines};
use crate::render::{report_lines, OutputStyle};
use crate::{completion, Cli, Commands};

static TEST_DIR_SEQ: AtomicU64 = AtomicU64::new(0);

fn test_layout() -> StateLayout {
    let seq = TEST_DIR_SEQ.fetch_add(1, Ordering::SeqCst);
    StateLayout::new(
        std::env::temp_dir().join(format!("fixpoint-cli-test-{}-{seq}", std::process::id())),
    )
}

fn sample_report() -> ConvergenceReport {
    ConvergenceReport {
        passes: 2,
        changed: true,
        executions: vec![
            HandlerExecution {
                pass: 1,
                handler: "install-package".to_string(),
                outcome: HandlerOutcome::Succeeded,
            },
            HandlerExecution {
                pass: 1,
                handler: "start-service".to_string(),
                outcome: HandlerOutcome::Declined("no desired version configured yet".to_string()),
            },
            HandlerExecution {
                pass: 2,
                handler: "start-service".to_string(),
                outcome: HandlerOutcome::Failed("service command failed".to_string()),
            },
        ],
    }
}

#[test]
fn plain_report_lines_describe_each_execution() {
    let lines = report_lines(&sample_report(), OutputStyle::Plain);
    assert_eq!(lines[0], "converged in 2 passes");
    assert_eq!(lines[1], "pass 1: install-package succeeded");
    assert_eq!(
        lines[2],
        "pass 1: start-service declined: no desired version configured yet"
    );
    assert_eq!(lines[3], "pass 2: start-service failed: service command failed");
    assert_eq!(
        lines[4],
        "1 handler(s) failed and will be retried on the next run"
    );
}

#[test]
fn empty_report_renders_as_already_converged() {
    let report = ConvergenceReport {
        passes: 1,
        changed: false,
        executions: Vec::new(),
    };
    let lines = report_lines(&report, OutputStyle::Plain);
    assert_eq!(lines[0], "converged in 1 pass");
    assert_eq!(lines[1], "no handlers fired; state already converged");
}

#[test]
fn rich_report_lines_embed_ansi_styling() {
    let lines = report_lines(&sample_report(), OutputStyle::Rich);
    assert!(lines[1].contains("\u{1b}["));
    assert!(lines[1].contains("succeeded"));
}

#[test]
fn fact_mutations_round_trip_through_status() {
    let layout = test_layout();

    assert!(mutate_fact(&layout, "beacon.repo-available", true).expect("must set"));
    assert!(!mutate_fact(&layout, "beacon.repo-available", true).expect("must be idempotent"));
    assert!(mutate_fact(&layout, "beacon.config-written", true).expect("must set"));

    let lines = status_lines(&layout).expect("must render status");
    assert_eq!(lines[0], "flags:");
    assert!(lines.contains(&"  beacon.config-written".to_string()));
    assert!(lines.contains(&"  beacon.repo-available".to_string()));
    assert!(lines.contains(&"pending events: (none)".to_string()));

    assert!(mutate_fact(&layout, "beacon.repo-available", false).expect("must clear"));
    let lines = status_lines(&layout).expect("must render status");
    assert!(!lines.contains(&"  beacon.repo-available".to_string()));

    let _ = fs::remove_dir_all(layout.root());
}

#[test]
fn status_on_a_fresh_layout_reports_nothing() {
    let layout = test_layout();
    let lines = status_lines(&layout).expect("must render status");
    assert_eq!(
        lines,
        vec![
            "flags: (none)".to_string(),
            "pending events: (none)".to_string()
        ]
    );
}

#[test]
fn doctor_reports_layout_paths_and_config_summary() {
    let layout = test_layout();
    layout.ensure_base_dirs().expect("must create dirs");
    fs::write(
        layout.config_path(),
        "component = \"beacon\"\npackage = \"storpool-beacon\"\nservice = \"storpool_beacon\"\n",
    )
    .expect("must write config");

    let lines = doctor_lines(&layout);
    assert!(lines[0].starts_with("root: "));
    assert!(lines.contains(&"component: beacon".to_string()));
    assert!(lines.contains(&"desired version: (pending)".to_string()));

    let _ = fs::remove_dir_all(layout.root());
}

#[test]
fn doctor_surfaces_unreadable_config() {
    let layout = test_layout();
    let lines = doctor_lines(&layout);
    assert!(lines
        .iter()
        .any(|line| line.starts_with("config not loadable: ")));
}

#[test]
fn completions_script_is_generated() {
    let mut generated = Vec::new();
    completion::write_completions(Shell::Bash, &mut generated).expect("must generate");
    let script = String::from_utf8(generated).expect("must be utf-8");
    assert!(script.contains("fixpoint"));
}

#[test]
fn cli_parses_run_and_event_commands() {
    let cli = Cli::try_parse_from(["fixpoint", "run"]).expect("must parse");
    assert!(matches!(cli.command, Commands::Run));

    let cli = Cli::try_parse_from(["fixpoint", "--root", "/tmp/fp", "event", "upgrade"])
        .expect("must parse");
    assert_eq!(cli.root.as_deref(), Some(std::path::Path::new("/tmp/fp")));
    match cli.command {
        Commands::Event { name } => assert_eq!(name, "upgrade"),
        other => panic!("unexpected command: {other:?}"),
    }

    let cli = Cli::try_parse_from(["fixpoint", "set-fact", "beacon.repo-available"])
        .expect("must parse");
    match cli.command {
        Commands::SetFact { name } => assert_eq!(name, "beacon.repo-available"),
        other => panic!("unexpected command: {other:?}"),
    }
}
