use anyhow::{anyhow, Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostConfig {
    pub component: String,
    pub package: String,
    pub service: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub restricted: bool,
    #[serde(default)]
    pub notify_stop_flag: Option<String>,
    #[serde(default = "default_install_command")]
    pub install_command: String,
    #[serde(default = "default_service_command")]
    pub service_command: String,
}

fn default_install_command() -> String {
    "apt-get --yes".to_string()
}

fn default_service_command() -> String {
    "systemctl".to_string()
}

impl HostConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse host config")?;

        for (field, value) in [
            ("component", &config.component),
            ("package", &config.package),
            ("service", &config.service),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("host config field '{field}' must not be empty"));
            }
        }
        if config.component.contains('.') {
            return Err(anyhow!(
                "component name '{}' must not contain '.'",
                config.component
            ));
        }
        if let Some(flag) = &config.notify_stop_flag {
            if flag.trim().is_empty() {
                return Err(anyhow!("notify_stop_flag must not be empty when present"));
            }
        }
        if config.install_command.split_whitespace().next().is_none() {
            return Err(anyhow!("install_command must name a program"));
        }
        if config.service_command.split_whitespace().count() != 1 {
            return Err(anyhow!("service_command must be a single program name"));
        }
        config.desired_version()?;

        Ok(config)
    }

    pub fn install_program(&self) -> (String, Vec<String>) {
        let mut parts = self.install_command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        (program, parts.collect())
    }

    pub fn flag(&self, fact: &str) -> String {
        format!("{}.{}", self.component, fact)
    }

    pub fn desired_version(&self) -> Result<Option<Version>> {
        let Some(raw) = &self.version else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let version = Version::parse(raw)
            .with_context(|| format!("invalid desired version '{raw}'"))?;
        Ok(Some(version))
    }
}
