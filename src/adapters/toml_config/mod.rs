// TOML config adapter - Configuration management using TOML files

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::OverlaySettings;
use crate::ports::*;
use crate::utils::logging::LogFormat;

/// Table holding trimark settings in a config file
pub const CONFIG_SECTION: &str = "trimark";

/// Built-in defaults, lowest precedence
pub const DEFAULTS: &[(&str, &str)] = &[
    ("log_level", "info"),
    ("log_format", "pretty"),
    ("ffmpeg_path", "ffmpeg"),
    ("ffprobe_path", "ffprobe"),
    ("threading", "single"),
    ("default_transparency", "50"),
    ("default_scale", "100"),
    ("export_file_name", "result.mp4"),
    ("preview_file_name", "first_frame.png"),
];

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    config: RwLock<HashMap<String, String>>,
    config_file_path: RwLock<Option<PathBuf>>,
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter populated with defaults
    pub fn new() -> Self {
        let config = DEFAULTS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Self {
            config: RwLock::new(config),
            config_file_path: RwLock::new(None),
        }
    }

    /// Path of the last loaded config file
    pub fn config_file_path(&self) -> Option<PathBuf> {
        self.config_file_path
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Merge the `[trimark]` table of a TOML document over current values
    pub fn merge_toml(&self, toml_content: &str) -> Result<usize, DomainError> {
        let parsed: toml::Value = toml::from_str(toml_content)
            .map_err(|e| DomainError::Configuration(format!("Failed to parse TOML config: {}", e)))?;

        let Some(table) = parsed.get(CONFIG_SECTION).and_then(|section| section.as_table()) else {
            return Ok(0);
        };

        let mut config = self.write();
        let mut merged = 0;
        for (key, value) in table {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(DomainError::Configuration(format!(
                        "Unsupported value for {}: {}",
                        key, other
                    )))
                }
            };
            config.insert(key.clone(), value);
            merged += 1;
        }
        Ok(merged)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.config.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.config.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn parse_bounded(
        config: &HashMap<String, String>,
        key: &str,
        bounds: std::ops::RangeInclusive<u16>,
    ) -> Result<(), DomainError> {
        if let Some(raw) = config.get(key) {
            let value: u16 = raw
                .parse()
                .map_err(|e| DomainError::Configuration(format!("Invalid {} value: {}", key, e)))?;
            if !bounds.contains(&value) {
                return Err(DomainError::Configuration(format!(
                    "{} must be between {} and {}, got {}",
                    key,
                    bounds.start(),
                    bounds.end(),
                    value
                )));
            }
        }
        Ok(())
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigPort for TomlConfigAdapter {
    async fn get_config(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.read().get(key).cloned())
    }

    async fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, DomainError> {
        Ok(self
            .read()
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.write().insert(key.to_string(), value.to_string());
        tracing::debug!("Set config {} = {}", key, value);
        Ok(())
    }

    async fn load_config(&self, file_path: &str) -> Result<(), DomainError> {
        let path = Path::new(file_path);
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::Io(format!("Failed to read config file {}: {}", file_path, e)))?;

        let merged = self.merge_toml(&content)?;
        tracing::info!("Loaded {} settings from {}", merged, file_path);
        *self
            .config_file_path
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(path.to_path_buf());
        Ok(())
    }

    async fn validate_config(&self) -> Result<(), DomainError> {
        let config = self.read();

        if let Some(log_level) = config.get("log_level") {
            LogLevel::parse(log_level)?;
        }
        if let Some(log_format) = config.get("log_format") {
            LogFormat::parse(log_format)?;
        }
        if let Some(threading) = config.get("threading") {
            Threading::parse(threading)?;
        }

        Self::parse_bounded(&config, "default_transparency", OverlaySettings::TRANSPARENCY_RANGE)?;
        Self::parse_bounded(&config, "default_scale", OverlaySettings::SCALE_RANGE)?;

        for key in ["ffmpeg_path", "ffprobe_path", "export_file_name", "preview_file_name"] {
            if config.get(key).is_some_and(|value| value.trim().is_empty()) {
                return Err(DomainError::Configuration(format!("{} cannot be empty", key)));
            }
        }

        Ok(())
    }

    async fn get_all_config_keys(&self) -> Result<Vec<String>, DomainError> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_defaults_are_valid() {
        let adapter = TomlConfigAdapter::new();
        adapter.validate_config().await.unwrap();
        assert_eq!(
            adapter.get_config("threading").await.unwrap().as_deref(),
            Some("single")
        );
    }

    #[tokio::test]
    async fn test_merge_toml_section() {
        let adapter = TomlConfigAdapter::new();
        let merged = adapter
            .merge_toml("[trimark]\nthreading = \"multi\"\ndefault_scale = 250\n")
            .unwrap();
        assert_eq!(merged, 2);
        assert_eq!(
            adapter.get_config_or_default("default_scale", "100").await.unwrap(),
            "250"
        );
        adapter.validate_config().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_defaults() {
        let adapter = TomlConfigAdapter::new();
        adapter.set_config("default_transparency", "0").await.unwrap();
        assert!(matches!(
            adapter.validate_config().await,
            Err(DomainError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_unknown_threading() {
        let adapter = TomlConfigAdapter::new();
        adapter.set_config("threading", "hyper").await.unwrap();
        assert!(adapter.validate_config().await.is_err());
    }

    #[tokio::test]
    async fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trimark.toml");
        std::fs::write(&path, "[trimark]\nlog_level = \"debug\"\n").unwrap();

        let adapter = TomlConfigAdapter::new();
        adapter.load_config(path.to_str().unwrap()).await.unwrap();
        assert_eq!(
            adapter.get_config("log_level").await.unwrap().as_deref(),
            Some("debug")
        );
        assert_eq!(adapter.config_file_path(), Some(path));
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let adapter = TomlConfigAdapter::new();
        assert!(adapter.merge_toml("[trimark\nbroken").is_err());
    }
}
