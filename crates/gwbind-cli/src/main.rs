mod cli;
mod commands;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gwbind_arm::{ArmTransport, StaticToken};
use gwbind_cli::config::{AppConfig, loader::load_config};
use gwbind_cli::observability::init_tracing_with_level;
use gwbind_core::BindingReconciler;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).map_err(anyhow::Error::msg)?;
    init_tracing_with_level(cli.log_level.as_deref().unwrap_or(&config.logging.level));

    let reconciler = make_reconciler(&config)?;
    match &cli.command {
        Commands::Create(args) => commands::binding::create(&reconciler, args).await?,
        Commands::Read(args) => commands::binding::read(&reconciler, args).await?,
        Commands::Update(args) => commands::binding::update(&reconciler, args).await?,
        Commands::Delete(args) => commands::binding::delete(&reconciler, args).await?,
    }

    Ok(())
}

fn make_reconciler(config: &AppConfig) -> Result<BindingReconciler<ArmTransport>> {
    let token = config
        .azure
        .token
        .clone()
        .context("No ARM token configured. Set azure.token or GWBIND__AZURE__TOKEN")?;
    let transport = ArmTransport::new(config.azure.arm_config(), Arc::new(StaticToken::new(token)))
        .context("Failed to set up ARM transport")?;
    Ok(BindingReconciler::new(transport).with_allocator(config.allocator()))
}
