use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gwbind")]
#[command(about = "gwbind: manage Application Gateway bindings as one unit")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./gwbind.toml when present)
    #[arg(short, long, global = true, env = "GWBIND_CONFIG")]
    pub config: Option<String>,

    /// Log level (overrides logging.level; RUST_LOG wins over both)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a binding and record its state
    Create(CreateArgs),
    /// Refresh a binding's state from the gateway
    Read(ReadArgs),
    /// Apply a changed binding declaration
    Update(UpdateArgs),
    /// Remove every entity a binding owns
    Delete(DeleteArgs),
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Binding declaration (.json or .toml)
    #[arg(short, long)]
    pub binding: PathBuf,
    /// Where to write the resulting state
    #[arg(short, long)]
    pub state: PathBuf,
}

#[derive(clap::Args)]
pub struct ReadArgs {
    /// State file written by create or update
    #[arg(short, long)]
    pub state: PathBuf,
    /// Overwrite the state file with what was read
    #[arg(long)]
    pub save: bool,
}

#[derive(clap::Args)]
pub struct UpdateArgs {
    /// New binding declaration (.json or .toml)
    #[arg(short, long)]
    pub binding: PathBuf,
    /// State file written by create or update; rewritten on success
    #[arg(short, long)]
    pub state: PathBuf,
}

#[derive(clap::Args)]
pub struct DeleteArgs {
    /// State file written by create or update; removed once the delete succeeds
    #[arg(short, long)]
    pub state: PathBuf,
}
