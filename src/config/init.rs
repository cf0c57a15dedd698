use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::Write;
use std::path::PathBuf;

use super::{ensure_parent_dir, get_config_path, Config};

const HEADER: &str = "\
# saju-match configuration
#
# models.stem / models.branch: JSON model files for the affinity predictors.
#   Leave unset to score with models.fallback_prediction (0.5 = 25 of 50 points).
# penalties: deduction per sal category; omitted keys keep their defaults.
";

/// Write the default configuration file.
///
/// Uses `path` when given, otherwise the default config path. Refuses to
/// replace an existing file unless `force` is set. Returns the written path.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p,
        None => get_config_path().context("Could not determine home directory")?,
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite",
            config_path.display()
        );
    }

    let yaml = serde_saphyr::to_string(&Config::default())
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    ensure_parent_dir(&config_path)?;

    let mut file = AtomicWriteFile::open(&config_path)
        .with_context(|| format!("Failed to open {} for writing", config_path.display()))?;
    file.write_all(HEADER.as_bytes())
        .and_then(|_| file.write_all(yaml.as_bytes()))
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", config_path.display()))?;

    tracing::info!(path = %config_path.display(), "wrote default config");
    Ok(config_path)
}
