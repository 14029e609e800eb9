//! Optional config file loading. Search order: ./armoread.toml, then
//! $XDG_CONFIG_HOME/armoread/config.toml (or ~/.config/armoread/config.toml).

use crate::armory::Region;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "armoread.toml";

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct Config {
    /// Armory region when neither --eu nor --us is given.
    pub region: Option<Region>,
    /// Armory host to use instead of the region's host, e.g. a mirror.
    pub base_url: Option<String>,
    /// Default realm when -r is not given.
    pub realm: Option<String>,
    /// Default guild when -g is not given.
    pub guild: Option<String>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds; 0 disables it.
    pub timeout_secs: Option<u64>,
    /// Root for items/, chars/, guilds/ and OPML files.
    pub output_dir: Option<PathBuf>,
    /// Rank map for guildopml when -m is not given, e.g. "013 2 4".
    pub rank_map: Option<String>,
    /// Rank names indexed by rank (0-9), replacing the built-in names.
    pub rank_names: Option<Vec<String>>,
}

/// Candidate config paths in search order.
pub fn config_paths() -> Result<Vec<PathBuf>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join(CONFIG_FILE_NAME)];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("armoread").join("config.toml"));
    }
    Ok(paths)
}

/// Load the first config file found. Missing files return Ok(None).
/// Invalid TOML or an I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    for path in config_paths()? {
        if path.exists() {
            return load_config_from(&path).map(Some);
        }
    }
    Ok(None)
}

pub fn load_config_from(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    let config: Config =
        toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
