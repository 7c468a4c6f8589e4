//! Command implementations.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use mapsmith_core::Config;

pub mod check;
pub mod generate;
pub mod rewrite;

/// Command-line values that take precedence over file and environment
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Output directory.
    pub output: Option<PathBuf>,

    /// Site origin.
    pub site_url: Option<String>,

    /// Content API base URL.
    pub api_url: Option<String>,
}

/// Load configuration and apply command-line overrides.
///
/// Overrides are applied before validation, so a flag can replace a broken
/// file or environment value.
pub fn load_config(config_path: &Path, overrides: &Overrides) -> Result<Config> {
    let mut config = Config::read(Some(config_path)).wrap_err("Failed to load configuration")?;

    if let Some(output) = &overrides.output {
        config.site.output_dir = output.to_string_lossy().to_string();
    }

    if let Some(site_url) = &overrides.site_url {
        tracing::info!(site_url, "Overriding site origin from CLI");
        config.site.origin = Some(site_url.clone());
    }

    if let Some(api_url) = &overrides.api_url {
        tracing::info!(api_url, "Overriding content API from CLI");
        config.api.base_url = api_url.clone();
    }

    config.validate().wrap_err("Invalid configuration")?;

    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}
