use std::fs;
use std::process::Command;

use anyhow::{bail, Context, Result};
use semver::Version;

use crate::{
    ConfigSource, EnvironmentProbe, HostConfig, Installer, ServiceController, StateLayout,
    StatusSink,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInstaller {
    program: String,
    base_args: Vec<String>,
}

impl CommandInstaller {
    pub fn new(program: impl Into<String>, base_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            base_args,
        }
    }
}

impl Installer for CommandInstaller {
    fn install(&mut self, package: &str, version: &Version) -> Result<Vec<String>> {
        let output = Command::new(&self.program)
            .args(&self.base_args)
            .arg("install")
            .arg(format!("{package}={version}"))
            .output()
            .with_context(|| format!("failed to run installer command: {}", self.program))?;
        if !output.status.success() {
            bail!(
                "installer command failed with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn remove(&mut self, package: &str) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&self.base_args)
            .arg("remove")
            .arg(package)
            .output()
            .with_context(|| format!("failed to run installer command: {}", self.program))?;
        if !output.status.success() {
            bail!(
                "installer command failed with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandServiceController {
    program: String,
}

impl CommandServiceController {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run_verb(&self, verb: &str, service: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .arg(verb)
            .arg(service)
            .status()
            .with_context(|| {
                format!("failed to run service command: {} {verb} {service}", self.program)
            })?;
        if !status.success() {
            bail!("service command '{} {verb} {service}' failed with {status}", self.program);
        }
        Ok(())
    }
}

impl Default for CommandServiceController {
    fn default() -> Self {
        Self::new("systemctl")
    }
}

impl ServiceController for CommandServiceController {
    fn resume(&mut self, service: &str) -> Result<()> {
        self.run_verb("start", service)
    }

    fn pause(&mut self, service: &str) -> Result<()> {
        self.run_verb("stop", service)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvEnvironmentProbe {
    pub restricted_override: bool,
}

impl EnvironmentProbe for EnvEnvironmentProbe {
    fn is_restricted(&self) -> bool {
        if self.restricted_override {
            return true;
        }
        std::env::var("FIXPOINT_RESTRICTED")
            .map(|value| !value.is_empty() && value != "0")
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfigSource {
    layout: StateLayout,
}

impl FileConfigSource {
    pub fn new(layout: StateLayout) -> Self {
        Self { layout }
    }

    pub fn load(&self) -> Result<HostConfig> {
        let path = self.layout.config_path();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read host config: {}", path.display()))?;
        HostConfig::from_toml_str(&content)
            .with_context(|| format!("failed to load host config: {}", path.display()))
    }
}

impl ConfigSource for FileConfigSource {
    fn desired_version(&self) -> Result<Option<Version>> {
        self.load()?.desired_version()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleStatusSink;

impl StatusSink for ConsoleStatusSink {
    fn update(&mut self, message: &str) {
        println!("{message}");
    }
}
