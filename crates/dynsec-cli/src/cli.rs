//! Command-line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dynsec - dynamic-security group file tool
#[derive(Parser, Debug)]
#[command(name = "dynsec")]
#[command(about = "Check, format and inspect dynamic-security group files", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, env = "DYNSEC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Apply documents all-or-nothing, overriding the configured load mode
    #[arg(long, global = true)]
    pub atomic: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a file and verify every link is mirrored
    Check {
        /// YAML file to check
        file: PathBuf,
    },
    /// Rewrite a file in canonical form
    Fmt {
        /// YAML file to read
        file: PathBuf,
        /// Write here instead of stdout (replaced atomically)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List groups with their roles and clients
    Show {
        /// YAML file to read
        file: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Configuration commands
    Config {
        /// Config action
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print one value by dotted key (e.g. `limits.max_clients`)
    Get {
        /// Dotted key
        key: String,
    },
    /// Write a default configuration file
    Init {
        /// Where to write it
        file: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
