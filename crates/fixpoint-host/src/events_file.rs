use std::fs;

use anyhow::{anyhow, Context, Result};
use fixpoint_engine::ForcedMutations;
use serde::{Deserialize, Serialize};

use crate::provision::{
    FACT_CONFIG_WRITTEN, FLAG_PACKAGE_INSTALLED, FLAG_SERVICE_STARTED, FLAG_STOP, FLAG_STOPPED,
};
use crate::{current_unix_timestamp, HostConfig, StateLayout};

const EVENT_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Upgrade,
    Reconfigure,
    Stop,
    Reprovision,
}

impl HostEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upgrade => "upgrade",
            Self::Reconfigure => "reconfigure",
            Self::Stop => "stop",
            Self::Reprovision => "reprovision",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "upgrade" => Ok(Self::Upgrade),
            "reconfigure" => Ok(Self::Reconfigure),
            "stop" => Ok(Self::Stop),
            "reprovision" => Ok(Self::Reprovision),
            _ => Err(anyhow!("unknown host event: {value}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EventQueueFile {
    version: u32,
    events: Vec<String>,
    updated_at_unix: u64,
}

pub fn queue_event(layout: &StateLayout, event: HostEvent) -> Result<()> {
    let mut events = read_event_names(layout)?;
    events.push(event.as_str().to_string());
    write_event_names(layout, events)
}

pub fn take_pending_events(layout: &StateLayout) -> Result<Vec<HostEvent>> {
    let names = read_event_names(layout)?;
    let events = names
        .iter()
        .map(|name| HostEvent::parse(name))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid event queue: {}", layout.events_path().display()))?;

    if !names.is_empty() {
        write_event_names(layout, Vec::new())?;
    }
    Ok(events)
}

pub fn pending_event_names(layout: &StateLayout) -> Result<Vec<String>> {
    read_event_names(layout)
}

pub fn forced_mutations_for(event: HostEvent, config: &HostConfig) -> ForcedMutations {
    match event {
        HostEvent::Upgrade => ForcedMutations::new()
            .clear_flag(config.flag(FLAG_PACKAGE_INSTALLED))
            .clear_flag(config.flag(FLAG_SERVICE_STARTED)),
        HostEvent::Reconfigure => {
            ForcedMutations::new().clear_flag(config.flag(FACT_CONFIG_WRITTEN))
        }
        HostEvent::Stop => ForcedMutations::new().set_flag(config.flag(FLAG_STOP)),
        HostEvent::Reprovision => ForcedMutations::new()
            .clear_flag(config.flag(FLAG_STOP))
            .clear_flag(config.flag(FLAG_STOPPED)),
    }
}

fn read_event_names(layout: &StateLayout) -> Result<Vec<String>> {
    let path = layout.events_path();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read event queue: {}", path.display()));
        }
    };

    let parsed: EventQueueFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse event queue: {}", path.display()))?;
    Ok(parsed.events)
}

fn write_event_names(layout: &StateLayout, events: Vec<String>) -> Result<()> {
    let path = layout.events_path();
    let state = EventQueueFile {
        version: EVENT_FILE_VERSION,
        events,
        updated_at_unix: current_unix_timestamp(),
    };
    let content = serde_json::to_string_pretty(&state)
        .with_context(|| format!("failed serializing event queue: {}", path.display()))?;
    fs::write(&path, content)
        .with_context(|| format!("failed to write event queue: {}", path.display()))
}
