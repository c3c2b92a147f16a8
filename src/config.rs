use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::placement::Placement;
use crate::processing::sample::MAX_WALLPAPER_DIM;

/// Runtime configuration, read from YAML with kebab-case keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Largest width or height of a decoded wallpaper.
    pub max_dimension: u32,
    /// Where the desktop facility writes staged wallpapers.
    pub staging_dir: PathBuf,
    /// Surfaces used when a request names none.
    pub default_placement: Placement,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            max_dimension: MAX_WALLPAPER_DIM,
            staging_dir: std::env::temp_dir().join("wallpaper-loader"),
            default_placement: Placement::default(),
        }
    }
}

impl Configuration {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_dimension > 0, "max-dimension must be positive");
        ensure!(
            !self.staging_dir.as_os_str().is_empty(),
            "staging-dir must not be empty"
        );
        if self.staging_dir.exists() {
            ensure!(
                self.staging_dir.is_dir(),
                "staging-dir {} is not a directory",
                self.staging_dir.display()
            );
        }
        Ok(())
    }
}

/// Resolve the configuration the binary runs with.
///
/// No path means defaults. A path that was named but cannot be read is an
/// error rather than a silent fallback. The result is validated either way.
pub fn load(path: Option<&Path>) -> Result<Configuration> {
    let cfg = match path {
        Some(path) => from_yaml_file(path)?,
        None => Configuration::default(),
    };
    cfg.validate().context("validating configuration")?;
    Ok(cfg)
}

pub fn from_yaml_file(path: &Path) -> Result<Configuration> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    from_yaml_str(&raw).with_context(|| format!("failed to parse config at {}", path.display()))
}

pub fn from_yaml_str(raw: &str) -> Result<Configuration> {
    // an empty document deserializes to null, which means "all defaults"
    if raw.trim().is_empty() {
        return Ok(Configuration::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}
