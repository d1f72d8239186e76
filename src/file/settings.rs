// src/file/settings.rs
use super::FileHandler;
use crate::config::settings::{Settings, APP_DIR_NAME};
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Result, Context};

pub const ENV_PREFIX: &str = "CAR_ANALYZER";

/// Settings are layered: built-in defaults, then the RON file, then
/// `CAR_ANALYZER_*` environment variables (`__` separates nested keys).
#[derive(Debug)]
pub struct SettingsFileHandler {
    env_prefix: String,
}

impl SettingsFileHandler {
    pub fn new() -> Self {
        Self::with_env_prefix(ENV_PREFIX)
    }

    pub fn with_env_prefix(prefix: &str) -> Self {
        Self { env_prefix: prefix.to_string() }
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join("settings.ron")
    }
}

impl FileHandler<Settings> for SettingsFileHandler {
    fn load(&self, path: &Path) -> Result<Settings> {
        let defaults = config::Config::try_from(&Settings::default())
            .context("Failed to build default settings")?;

        let layered = config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Ron)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        layered.try_deserialize().context("Failed to parse settings")
    }

    fn save(&self, data: &Settings, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = ron::ser::to_string_pretty(
            data,
            ron::ser::PrettyConfig::new()
                .new_line("\n".to_string())
                .depth_limit(4)
        )?;
        fs::write(path, content)?;
        Ok(())
    }
}
