//! # dynsec-cli
//!
//! Command-line tools for dynamic-security group files:
//! - `check`: load a file and verify every link is mirrored
//! - `fmt`: rewrite a file in canonical form
//! - `show`: list groups with their roles and clients
//! - `config`: inspect or create the TOML configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;

use cli::{Args, Command};
use dynsec_core::{DynsecConfig, LoadOptions, Result};

/// Resolve configuration and dispatch one command.
pub fn run(args: Args) -> Result<()> {
    let mut config = DynsecConfig::load(args.config.as_deref())?;
    if args.atomic {
        config.load = LoadOptions::atomic();
    }
    log::debug!("Effective configuration: {config:?}");

    match args.command {
        Command::Check { file } => commands::cmd_check(&file, &config),
        Command::Fmt { file, output } => commands::cmd_fmt(&file, output.as_deref(), &config),
        Command::Show { file, json } => commands::cmd_show(&file, json, &config),
        Command::Config { action } => config_handlers::handle_config_command(&config, action),
    }
}
