use anyhow::Result;
use semver::Version;

pub trait Installer {
    fn install(&mut self, package: &str, version: &Version) -> Result<Vec<String>>;
    fn remove(&mut self, package: &str) -> Result<()>;
}

pub trait ServiceController {
    fn resume(&mut self, service: &str) -> Result<()>;
    fn pause(&mut self, service: &str) -> Result<()>;
}

pub trait EnvironmentProbe {
    fn is_restricted(&self) -> bool;
}

pub trait ConfigSource {
    fn desired_version(&self) -> Result<Option<Version>>;
}

pub trait StatusSink {
    fn update(&mut self, message: &str);
}

pub struct ProvisionContext {
    pub installer: Box<dyn Installer>,
    pub controller: Box<dyn ServiceController>,
    pub probe: Box<dyn EnvironmentProbe>,
    pub config_source: Box<dyn ConfigSource>,
    pub status: Box<dyn StatusSink>,
}
