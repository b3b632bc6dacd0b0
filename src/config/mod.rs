mod schema;

pub use schema::{ApiConfig, Config, ScreeningConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/ashby-screen/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("ashby-screen"))
}

/// Get the default config file path (~/.config/ashby-screen/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// With no explicit `path` the default location is tried, and a missing
/// file there means "all defaults". An explicit path must exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed or has unknown fields
/// - `api.timeout` is not a valid duration
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            path
        }
        None => match get_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Config::default()),
        },
    };

    let config = parse_config_file(&config_path)?;
    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}

fn parse_config_file(config_path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config = parse_config(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_saphyr::from_str(content)?;
    config.api.timeout_duration()?;
    Ok(config)
}
