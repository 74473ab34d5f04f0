use std::io;

use anyhow::Result;
use fixpoint_host::{
    default_state_root, load_flags, pending_event_names, queue_event, run_convergence, save_flags,
    CommandInstaller, CommandServiceController, ConsoleStatusSink, EnvEnvironmentProbe,
    FileConfigSource, HostConfig, HostEvent, ProvisionContext, StateLayout,
};

use crate::render::{current_output_style, report_lines};
use crate::{completion, Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => default_state_root()?,
    };
    let layout = StateLayout::new(root);

    match cli.command {
        Commands::Run => {
            let config = FileConfigSource::new(layout.clone()).load()?;
            let mut ctx = build_context(&layout, &config);
            let report = run_convergence(&layout, &config, &mut ctx)?;
            for line in report_lines(&report, current_output_style()) {
                println!("{line}");
            }
        }
        Commands::Status => {
            for line in status_lines(&layout)? {
                println!("{line}");
            }
        }
        Commands::Event { name } => {
            let event = HostEvent::parse(&name)?;
            layout.ensure_base_dirs()?;
            queue_event(&layout, event)?;
            println!("queued event: {}", event.as_str());
        }
        Commands::SetFact { name } => {
            let changed = mutate_fact(&layout, &name, true)?;
            if changed {
                println!("set flag: {name}");
            } else {
                println!("flag already set: {name}");
            }
        }
        Commands::ClearFact { name } => {
            let changed = mutate_fact(&layout, &name, false)?;
            if changed {
                println!("cleared flag: {name}");
            } else {
                println!("flag already clear: {name}");
            }
        }
        Commands::Doctor => {
            for line in doctor_lines(&layout) {
                println!("{line}");
            }
        }
        Commands::Completions { shell } => {
            completion::write_completions(shell, &mut io::stdout())?;
        }
    }

    Ok(())
}

fn build_context(layout: &StateLayout, config: &HostConfig) -> ProvisionContext {
    let (program, base_args) = config.install_program();
    ProvisionContext {
        installer: Box::new(CommandInstaller::new(program, base_args)),
        controller: Box::new(CommandServiceController::new(config.service_command.clone())),
        probe: Box::new(EnvEnvironmentProbe {
            restricted_override: config.restricted,
        }),
        config_source: Box::new(FileConfigSource::new(layout.clone())),
        status: Box::new(ConsoleStatusSink),
    }
}

pub(crate) fn status_lines(layout: &StateLayout) -> Result<Vec<String>> {
    let flags = load_flags(layout)?;
    let events = pending_event_names(layout)?;

    let mut lines = Vec::new();
    if flags.is_empty() {
        lines.push("flags: (none)".to_string());
    } else {
        lines.push("flags:".to_string());
        for name in flags.names() {
            lines.push(format!("  {name}"));
        }
    }
    if events.is_empty() {
        lines.push("pending events: (none)".to_string());
    } else {
        lines.push("pending events:".to_string());
        for name in &events {
            lines.push(format!("  {name}"));
        }
    }
    Ok(lines)
}

pub(crate) fn mutate_fact(layout: &StateLayout, name: &str, present: bool) -> Result<bool> {
    layout.ensure_base_dirs()?;
    let mut flags = load_flags(layout)?;
    let changed = if present {
        flags.set(name)
    } else {
        flags.clear(name)
    };
    if changed {
        save_flags(layout, &flags)?;
    }
    Ok(changed)
}

pub(crate) fn doctor_lines(layout: &StateLayout) -> Vec<String> {
    let mut lines = vec![
        format!("root: {}", layout.root().display()),
        format!("config: {}", layout.config_path().display()),
        format!("flags: {}", layout.flags_path().display()),
        format!("events: {}", layout.events_path().display()),
    ];
    match FileConfigSource::new(layout.clone()).load() {
        Ok(config) => {
            lines.push(format!("component: {}", config.component));
            lines.push(format!("package: {}", config.package));
            lines.push(format!("service: {}", config.service));
            lines.push(format!(
                "desired version: {}",
                config
                    .version
                    .as_deref()
                    .filter(|raw| !raw.trim().is_empty())
                    .unwrap_or("(pending)")
            ));
        }
        Err(err) => lines.push(format!("config not loadable: {err:#}")),
    }
    lines
}
