// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments, and global output flags.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use cirrus::output::OutputMode;

#[derive(Parser)]
#[command(name = "cirrus")]
#[command(about = "Provision and tear down OpenStack clusters from a YAML spec")]
#[command(version)]
pub struct Cli {
    /// Cluster spec file (default: cirrus.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a commented cirrus.yml template
    Init {
        /// Project name to put in the template
        #[arg(short, long)]
        project: Option<String>,

        /// Overwrite an existing cirrus.yml
        #[arg(short, long)]
        force: bool,
    },

    /// Create every cloud resource of the cluster
    Create {
        /// Project name (overrides the config file)
        project: Option<String>,
    },

    /// Remove every cloud resource of the cluster
    Cleanup {
        /// Project name (overrides the config file)
        project: Option<String>,
    },

    /// Show addresses of the running instances
    Roster {
        /// Project name (overrides the config file)
        project: Option<String>,

        /// Include resolved inventory groups and variables
        #[arg(long)]
        vars: bool,
    },
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }

    /// Log filter for the `-v` count when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
