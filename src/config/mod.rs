mod init;
mod schema;

pub use init::write_default_config;
pub use schema::{Config, ModelsConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/saju-match/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("saju-match"))
}

/// Get the default config file path (~/.config/saju-match/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Ensure the parent directory of `path` exists
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/saju-match/config.yaml) and falls back to built-in defaults
///   when that file does not exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p
        }
        None => match get_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                tracing::debug!("no config file, using defaults");
                return Ok(Config::default());
            }
        },
    };

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!(
            "Failed to parse config: invalid YAML in {}",
            config_path.display()
        )
    })?;

    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
}

/// Validate the whole config, collecting every error.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if let Err(e) = crate::scoring::validate_models(&config.models) {
        errors.extend(e);
    }
    if let Err(e) = crate::scoring::validate_penalties(&config.penalties) {
        errors.extend(e);
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
