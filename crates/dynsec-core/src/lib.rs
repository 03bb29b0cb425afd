//! Dynsec Core: shared errors and configuration.
//!
//! This crate has no internal dynsec dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`config`]: Capacity limits and load options, read from TOML

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;

pub use config::{DynsecConfig, Limits, LoadMode, LoadOptions};
pub use error::{Error, Result};
