//! Configuration loading, env substitution, and validation.
//!
//! Config files: `sigrelay.toml`, `sigrelay.yaml`, `sigrelay.yml`, or
//! `sigrelay.json`, searched in `./` then `~/.config/sigrelay/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{LoadedConfig, config_dir, find_config_file, load, load_config},
    schema::{BotConfig, SigrelayConfig, SignalConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
