use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use fixpoint_core::FlagSet;
use serde::{Deserialize, Serialize};

use crate::{current_unix_timestamp, StateLayout};

const FLAG_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct FlagStateFile {
    version: u32,
    flags: Vec<String>,
    updated_at_unix: u64,
}

pub fn load_flags(layout: &StateLayout) -> Result<FlagSet> {
    let path = layout.flags_path();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(FlagSet::new()),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read flag state: {}", path.display()));
        }
    };

    let parsed: FlagStateFile = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse flag state: {}", path.display()))?;
    Ok(FlagSet::from_names(parsed.flags))
}

pub fn save_flags(layout: &StateLayout, flags: &FlagSet) -> Result<PathBuf> {
    let path = layout.flags_path();
    let state = FlagStateFile {
        version: FLAG_FILE_VERSION,
        flags: flags.names().map(str::to_string).collect(),
        updated_at_unix: current_unix_timestamp(),
    };
    let content = serde_json::to_string_pretty(&state)
        .with_context(|| format!("failed serializing flag state: {}", path.display()))?;
    fs::write(&path, content)
        .with_context(|| format!("failed to write flag state: {}", path.display()))?;
    Ok(path)
}
