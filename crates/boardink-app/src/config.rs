//! Host configuration and command-line arguments.

use crate::AppError;
use boardink_core::config::{ConfigError, EngineConfig};
use boardink_core::elements::Color;
use boardink_render::{EXPORT_FILENAME, ExportOptions};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "BOARDINK_CONFIG";

/// Export settings as they appear in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub pixel_ratio: f64,
    pub background: Color,
    pub filename: String,
    /// Font used for text labels in exported images.
    pub font_path: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        let options = ExportOptions::default();
        Self {
            pixel_ratio: options.pixel_ratio,
            background: options.background,
            filename: EXPORT_FILENAME.to_string(),
            font_path: None,
        }
    }
}

impl ExportSettings {
    /// Resolve into exporter options, reading the font file if one is set.
    pub fn to_options(&self) -> Result<ExportOptions, AppError> {
        let font = match &self.font_path {
            Some(path) => Some(std::fs::read(path).map_err(|source| AppError::Io {
                path: path.clone(),
                source,
            })?),
            None => None,
        };
        Ok(ExportOptions {
            pixel_ratio: self.pixel_ratio,
            background: self.background,
            filename: self.filename.clone(),
            font,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Simulated surface size in device pixels.
    pub width: u32,
    pub height: u32,
    /// Board directory; the platform data dir when unset.
    pub store_dir: Option<PathBuf>,
    pub engine: EngineConfig,
    pub export: ExportSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
            store_dir: None,
            engine: EngineConfig::default(),
            export: ExportSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Config from `BOARDINK_CONFIG`, or defaults when it is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                log::info!("loading config from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Replay input against a board and optionally export it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Parser)]
#[command(name = "boardink", version, about)]
pub struct CliArgs {
    /// Board to open.
    #[arg(value_parser = clap::builder::NonEmptyStringValueParser::new())]
    pub board_id: String,
    /// JSON event script to replay.
    #[arg(long, value_name = "EVENTS_JSON")]
    pub script: Option<PathBuf>,
    /// Directory to write `canvas-image.png` into.
    #[arg(long = "export", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
    /// Board directory, overriding the config file.
    #[arg(long = "store", value_name = "DIR")]
    pub store_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args =
            CliArgs::try_parse_from(["boardink", "b1", "--script", "s.json", "--export", "out"])
                .unwrap();
        assert_eq!(args.board_id, "b1");
        assert_eq!(args.script, Some(PathBuf::from("s.json")));
        assert_eq!(args.export_dir, Some(PathBuf::from("out")));
        assert_eq!(args.store_dir, None);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(CliArgs::try_parse_from(["boardink"]).is_err());
        assert!(CliArgs::try_parse_from(["boardink", ""]).is_err());
        assert!(CliArgs::try_parse_from(["boardink", "b1", "--script"]).is_err());
        assert!(CliArgs::try_parse_from(["boardink", "b1", "--frobnicate"]).is_err());
        assert!(CliArgs::try_parse_from(["boardink", "b1", "b2"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boardink.json");
        std::fs::write(
            &path,
            r##"{"width":320,"engine":{"key_debounce_ms":50},"export":{"background":"#000000"}}"##,
        )
        .unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 800);
        assert_eq!(config.engine.key_debounce_ms, 50);
        assert_eq!(config.export.background, Color::BLACK);
        assert!((config.export.pixel_ratio - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_export_settings_missing_font() {
        let settings = ExportSettings {
            font_path: Some(PathBuf::from("/no/such/font.ttf")),
            ..ExportSettings::default()
        };
        assert!(matches!(settings.to_options(), Err(AppError::Io { .. })));
    }
}
