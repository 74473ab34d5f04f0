use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

mod collaborators;
mod config;
mod events_file;
mod provision;
mod shims;
mod store_file;

pub use collaborators::{
    ConfigSource, EnvironmentProbe, Installer, ProvisionContext, ServiceController, StatusSink,
};
pub use config::HostConfig;
pub use events_file::{
    forced_mutations_for, pending_event_names, queue_event, take_pending_events, HostEvent,
};
pub use provision::{
    provisioning_registry, run_convergence, FACT_CONFIG_WRITTEN, FACT_REPO_AVAILABLE,
    FLAG_PACKAGE_INSTALLED, FLAG_SERVICE_STARTED, FLAG_STOP, FLAG_STOPPED,
};
pub use shims::{
    CommandInstaller, CommandServiceController, ConsoleStatusSink, EnvEnvironmentProbe,
    FileConfigSource,
};
pub use store_file::{load_flags, save_flags};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    pub fn flags_path(&self) -> PathBuf {
        self.state_dir().join("flags.json")
    }

    pub fn events_path(&self) -> PathBuf {
        self.state_dir().join("events.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [self.root.clone(), self.state_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

pub fn default_state_root() -> Result<PathBuf> {
    if let Some(root) = std::env::var_os("FIXPOINT_ROOT") {
        if !root.is_empty() {
            return Ok(PathBuf::from(root));
        }
    }

    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows state root")?;
        return Ok(PathBuf::from(app_data).join("Fixpoint"));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve state root")?;
    Ok(PathBuf::from(home).join(".fixpoint"))
}

pub(crate) fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}
