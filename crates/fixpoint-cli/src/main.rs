mod completion;
mod flows;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(name = "fixpoint")]
#[command(about = "Flag-driven convergence for host service provisioning", long_about = None)]
pub(crate) struct Cli {
    #[arg(long)]
    pub(crate) root: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    Run,
    Status,
    Event { name: String },
    SetFact { name: String },
    ClearFact { name: String },
    Doctor,
    Completions { shell: Shell },
}

fn main() -> Result<()> {
    flows::run_cli(Cli::parse())
}

#[cfg(test)]
mod tests;
