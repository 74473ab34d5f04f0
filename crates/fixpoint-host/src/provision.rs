use anyhow::Result;
use fixpoint_core::{ActionOutcome, Guard, Handler, HandlerRegistry};
use fixpoint_engine::{converge, ConvergenceReport, ForcedMutations};

use crate::events_file::{forced_mutations_for, take_pending_events};
use crate::store_file::{load_flags, save_flags};
use crate::{HostConfig, ProvisionContext, StateLayout};

pub const FACT_REPO_AVAILABLE: &str = "repo-available";
pub const FACT_CONFIG_WRITTEN: &str = "config-written";
pub const FLAG_PACKAGE_INSTALLED: &str = "package-installed";
pub const FLAG_SERVICE_STARTED: &str = "service-started";
pub const FLAG_STOP: &str = "stop";
pub const FLAG_STOPPED: &str = "stopped";

pub fn provisioning_registry(
    config: &HostConfig,
) -> Result<HandlerRegistry<ProvisionContext>> {
    let mut registry = HandlerRegistry::new();

    let package = config.package.clone();
    registry.register(
        Handler::invoke(
            "install-package",
            Guard::new()
                .when(config.flag(FACT_REPO_AVAILABLE))
                .when(config.flag(FACT_CONFIG_WRITTEN))
                .when_not(config.flag(FLAG_PACKAGE_INSTALLED)),
            move |ctx: &mut ProvisionContext| {
                if ctx.probe.is_restricted() {
                    ctx.status
                        .update(&format!("restricted environment, not installing {package}"));
                    return Ok(ActionOutcome::Completed);
                }

                ctx.status.update("obtaining the requested version");
                let Some(version) = ctx.config_source.desired_version()? else {
                    return Ok(ActionOutcome::Declined(
                        "no desired version configured yet".to_string(),
                    ));
                };

                ctx.status
                    .update(&format!("installing {package} {version}"));
                let newly_installed = match ctx.installer.install(&package, &version) {
                    Ok(newly_installed) => newly_installed,
                    Err(err) => {
                        ctx.status
                            .update(&format!("could not install {package}: {err:#}"));
                        return Err(err);
                    }
                };

                if newly_installed.is_empty() {
                    ctx.status
                        .update(&format!("{package} was already installed"));
                } else {
                    ctx.status.update(&format!(
                        "installed: {}",
                        newly_installed.join(", ")
                    ));
                }
                Ok(ActionOutcome::Completed)
            },
        )
        .sets(config.flag(FLAG_PACKAGE_INSTALLED)),
    )?;

    let service = config.service.clone();
    registry.register(
        Handler::invoke(
            "start-service",
            Guard::new()
                .when(config.flag(FLAG_PACKAGE_INSTALLED))
                .when_not(config.flag(FLAG_SERVICE_STARTED)),
            move |ctx: &mut ProvisionContext| {
                if ctx.probe.is_restricted() {
                    ctx.status
                        .update(&format!("restricted environment, not starting {service}"));
                    return Ok(ActionOutcome::Completed);
                }

                ctx.status
                    .update(&format!("enabling and starting {service}"));
                if let Err(err) = ctx.controller.resume(&service) {
                    ctx.status
                        .update(&format!("could not start {service}: {err:#}"));
                    return Err(err);
                }
                Ok(ActionOutcome::Completed)
            },
        )
        .sets(config.flag(FLAG_SERVICE_STARTED)),
    )?;

    registry.register(
        Handler::flag_only(
            "restart-trigger",
            Guard::new()
                .when(config.flag(FLAG_SERVICE_STARTED))
                .when_not(config.flag(FLAG_PACKAGE_INSTALLED)),
        )
        .clears(config.flag(FLAG_SERVICE_STARTED)),
    )?;

    registry.register(
        Handler::flag_only(
            "reinstall-trigger",
            Guard::new()
                .when(config.flag(FLAG_PACKAGE_INSTALLED))
                .when_not(config.flag(FACT_CONFIG_WRITTEN)),
        )
        .clears(config.flag(FLAG_PACKAGE_INSTALLED)),
    )?;

    registry.require_absent_everywhere(&config.flag(FLAG_STOPPED));

    let package = config.package.clone();
    let service = config.service.clone();
    let mut teardown = Handler::invoke(
        "teardown",
        Guard::new()
            .when(config.flag(FLAG_STOP))
            .when_not(config.flag(FLAG_STOPPED)),
        move |ctx: &mut ProvisionContext| {
            if ctx.probe.is_restricted() {
                ctx.status
                    .update("restricted environment, skipping service and package teardown");
                return Ok(ActionOutcome::Completed);
            }

            ctx.status
                .update(&format!("stopping and disabling {service}"));
            if let Err(err) = ctx.controller.pause(&service) {
                ctx.status
                    .update(&format!("could not stop {service}: {err:#}"));
                return Err(err);
            }

            ctx.status.update(&format!("removing {package}"));
            if let Err(err) = ctx.installer.remove(&package) {
                ctx.status
                    .update(&format!("could not remove {package}: {err:#}"));
                return Err(err);
            }
            Ok(ActionOutcome::Completed)
        },
    )
    .clears(config.flag(FLAG_STOP))
    .clears(config.flag(FLAG_PACKAGE_INSTALLED))
    .clears(config.flag(FLAG_SERVICE_STARTED))
    .sets(config.flag(FLAG_STOPPED));
    if let Some(notify) = &config.notify_stop_flag {
        teardown = teardown.sets(notify.clone());
    }
    registry.register(teardown)?;

    Ok(registry)
}

pub fn run_convergence(
    layout: &StateLayout,
    config: &HostConfig,
    ctx: &mut ProvisionContext,
) -> Result<ConvergenceReport> {
    layout.ensure_base_dirs()?;

    let mut flags = load_flags(layout)?;
    let forced = take_pending_events(layout)?
        .into_iter()
        .fold(ForcedMutations::new(), |merged, event| {
            merged.merge(forced_mutations_for(event, config))
        });

    let mut registry = provisioning_registry(config)?;
    let report = converge(&mut registry, ctx, &mut flags, &forced)?;
    save_flags(layout, &flags)?;
    Ok(report)
}
