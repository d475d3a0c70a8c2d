//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::domain::errors::DomainError;
use crate::domain::model::OverlaySettings;
use crate::ports::{ConfigPort, EngineLoadConfig, LogLevel, Threading};
use crate::utils::logging::{LogFormat, LoggingConfig};

/// Files searched, in order, when `--config` is not given
pub const CONFIG_CANDIDATES: &[&str] = &["trimark.toml", "config/trimark.toml"];

/// Environment variables mapped onto config keys
pub const ENV_MAPPINGS: &[(&str, &str)] = &[
    ("TRIMARK_LOG_LEVEL", "log_level"),
    ("TRIMARK_LOG_FORMAT", "log_format"),
    ("TRIMARK_FFMPEG_PATH", "ffmpeg_path"),
    ("TRIMARK_FFPROBE_PATH", "ffprobe_path"),
    ("TRIMARK_THREADING", "threading"),
    ("TRIMARK_DEFAULT_TRANSPARENCY", "default_transparency"),
    ("TRIMARK_DEFAULT_SCALE", "default_scale"),
    ("TRIMARK_EXPORT_FILE_NAME", "export_file_name"),
    ("TRIMARK_PREVIEW_FILE_NAME", "preview_file_name"),
];

/// Typed view of the resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub threading: Threading,
    pub default_overlay: OverlaySettings,
    pub export_file_name: String,
    pub preview_file_name: String,
}

impl AppSettings {
    /// Read and type-check every key from a config port
    pub async fn from_config(config: &dyn ConfigPort) -> Result<Self, DomainError> {
        let transparency = parse_u16(
            "default_transparency",
            &config.get_config_or_default("default_transparency", "50").await?,
        )?;
        let scale = parse_u16(
            "default_scale",
            &config.get_config_or_default("default_scale", "100").await?,
        )?;

        Ok(Self {
            log_level: LogLevel::parse(&config.get_config_or_default("log_level", "info").await?)?,
            log_format: LogFormat::parse(&config.get_config_or_default("log_format", "pretty").await?)?,
            ffmpeg_path: PathBuf::from(config.get_config_or_default("ffmpeg_path", "ffmpeg").await?),
            ffprobe_path: PathBuf::from(config.get_config_or_default("ffprobe_path", "ffprobe").await?),
            threading: Threading::parse(&config.get_config_or_default("threading", "single").await?)?,
            default_overlay: OverlaySettings::new(transparency, scale)?,
            export_file_name: config
                .get_config_or_default("export_file_name", "result.mp4")
                .await?,
            preview_file_name: config
                .get_config_or_default("preview_file_name", "first_frame.png")
                .await?,
        })
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level,
            format: self.log_format,
            target: matches!(self.log_level, LogLevel::Trace | LogLevel::Debug),
        }
    }

    pub fn engine_load_config(&self) -> EngineLoadConfig {
        EngineLoadConfig {
            binary: self.ffmpeg_path.clone(),
            threading: self.threading,
        }
    }
}

fn parse_u16(key: &str, raw: &str) -> Result<u16, DomainError> {
    raw.trim()
        .parse()
        .map_err(|e| DomainError::Configuration(format!("Invalid {} value {}: {}", key, raw, e)))
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub async fn initialize_configuration_hierarchy(
    config: &dyn ConfigPort,
    cli: &Cli,
) -> Result<AppSettings> {
    // Defaults are already present in the adapter
    load_config_file(config, cli.config.as_deref()).await?;
    apply_environment(config, std::env::vars()).await?;
    apply_cli_overrides(config, cli).await?;

    config
        .validate_config()
        .await
        .context("Configuration is invalid")?;
    let settings = AppSettings::from_config(config)
        .await
        .context("Failed to resolve configuration")?;

    debug!(?settings, "Configuration hierarchy initialized");
    Ok(settings)
}

/// Load an explicit config file, or the first candidate that exists
pub async fn load_config_file(config: &dyn ConfigPort, explicit: Option<&str>) -> Result<Option<String>> {
    if let Some(path) = explicit {
        config
            .load_config(path)
            .await
            .with_context(|| format!("Failed to load config file {}", path))?;
        return Ok(Some(path.to_string()));
    }

    for candidate in CONFIG_CANDIDATES {
        if Path::new(candidate).is_file() {
            config
                .load_config(candidate)
                .await
                .with_context(|| format!("Failed to load config file {}", candidate))?;
            return Ok(Some(candidate.to_string()));
        }
    }

    debug!("No configuration file found, using defaults");
    Ok(None)
}

/// Apply `TRIMARK_*` overrides from an environment snapshot
pub async fn apply_environment<I>(config: &dyn ConfigPort, vars: I) -> Result<usize>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut overrides = 0;
    for (name, value) in vars {
        let Some((_, key)) = ENV_MAPPINGS.iter().find(|(env_var, _)| *env_var == name) else {
            continue;
        };
        debug!("Environment override: {} = {}", name, value);
        config.set_config(key, &value).await?;
        overrides += 1;
    }

    if overrides > 0 {
        info!("Applied {} environment variable overrides", overrides);
    }
    Ok(overrides)
}

/// Apply global CLI flags over everything else
pub async fn apply_cli_overrides(config: &dyn ConfigPort, cli: &Cli) -> Result<usize> {
    let mut overrides = Vec::new();
    if let Some(level) = &cli.log_level {
        overrides.push(("log_level", level.clone()));
    }
    if cli.json_logs {
        overrides.push(("log_format", "json".to_string()));
    }
    if let Some(threading) = &cli.threading {
        overrides.push(("threading", threading.clone()));
    }
    if let Some(ffmpeg) = &cli.ffmpeg {
        overrides.push(("ffmpeg_path", ffmpeg.clone()));
    }
    if let Some(ffprobe) = &cli.ffprobe {
        overrides.push(("ffprobe_path", ffprobe.clone()));
    }

    for (key, value) in &overrides {
        debug!("CLI override: {} = {}", key, value);
        config.set_config(key, value).await?;
    }
    Ok(overrides.len())
}
