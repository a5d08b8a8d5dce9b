use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::SigrelayConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "sigrelay.toml",
    "sigrelay.yaml",
    "sigrelay.yml",
    "sigrelay.json",
];

/// A loaded configuration and where it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: SigrelayConfig,
    /// `None` when no file was found and defaults are in use.
    pub path: Option<PathBuf>,
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<SigrelayConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path).with_context(|| format!("invalid config {}", path.display()))
}

/// Load `explicit` if given, otherwise the first config file found in the
/// standard locations, otherwise defaults.
///
/// Search order:
/// 1. `./sigrelay.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/sigrelay/sigrelay.{toml,yaml,yml,json}` (user-global)
pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };
    let Some(path) = path else {
        debug!("no config file found, using defaults");
        return Ok(LoadedConfig::default());
    };
    debug!(path = %path.display(), "loading config");
    Ok(LoadedConfig {
        config: load_config(&path)?,
        path: Some(path),
    })
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|path| path.exists())
}

/// Returns the user-global config directory (`~/.config/sigrelay/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "sigrelay").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> Result<SigrelayConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(Error::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}
