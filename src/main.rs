// ABOUTME: Entry point for the cirrus CLI application.
// ABOUTME: Parses arguments, sets up logging, and dispatches to command handlers.

mod cli;
mod commands;

use std::env;

use clap::Parser;
use cirrus::config;
use cirrus::error::Result;
use cirrus::output::Output;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mode = cli.output_mode();
    if let Err(e) = run(cli).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(cli.output_mode());
    let cwd = env::current_dir()?;
    let spec_file = cli.config;

    match cli.command {
        Commands::Init { project, force } => {
            config::init_config(&cwd, project.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Create { project } => {
            let spec = commands::load_spec(&cwd, spec_file.as_deref(), project.as_deref())?;
            commands::create(spec, output).await
        }
        Commands::Cleanup { project } => {
            let spec = commands::load_spec(&cwd, spec_file.as_deref(), project.as_deref())?;
            commands::cleanup(spec, output).await
        }
        Commands::Roster { project, vars } => {
            let spec = commands::load_spec(&cwd, spec_file.as_deref(), project.as_deref())?;
            commands::roster(spec, vars, output).await
        }
    }
}
