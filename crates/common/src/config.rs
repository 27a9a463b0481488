//! Environment configuration: where assets and the detector model live.
//!
//! Pipeline geometry and encoder settings are not here; they belong to
//! `PipelineConfig` in the project model.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Optional asset collaborators (background, outro, fonts).
    pub assets: AssetConfig,

    /// Face detector model location.
    pub detector: DetectorConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Write `<output>.plan.json` next to every rendered file.
    pub write_plan_report: bool,
}

/// Filesystem-resident optional assets. None of them is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding all asset files.
    pub dir: PathBuf,

    /// Still image used as the backdrop of the webcam layout.
    pub background: String,

    /// Closing clip appended after the main composition.
    pub outro: String,

    /// Font for the title overlay.
    pub title_font: String,

    /// Font for the broadcaster caption.
    pub caption_font: String,
}

/// Face detector model configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Explicit path to the frontal-face cascade. When unset the standard
    /// OpenCV data directories are searched.
    pub cascade_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "shortsmith=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            background: "fond_short.png".to_string(),
            outro: "fin_de_short.mp4".to_string(),
            title_font: "Roboto-Bold.ttf".to_string(),
            caption_font: "Roboto-Regular.ttf".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AssetConfig {
    /// Asset config rooted at `dir` with the default file names.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn background_path(&self) -> PathBuf {
        self.dir.join(&self.background)
    }

    pub fn outro_path(&self) -> PathBuf {
        self.dir.join(&self.outro)
    }

    pub fn title_font_path(&self) -> PathBuf {
        self.dir.join(&self.title_font)
    }

    pub fn caption_font_path(&self) -> PathBuf {
        self.dir.join(&self.caption_font)
    }

    /// Return `path` if it exists on disk right now.
    ///
    /// Assets are checked at use time, never cached.
    pub fn existing(path: PathBuf) -> Option<PathBuf> {
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults on any problem.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("shortsmith").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_paths_join_dir() {
        let assets = AssetConfig::in_dir("/srv/assets");
        assert_eq!(
            assets.background_path(),
            PathBuf::from("/srv/assets/fond_short.png")
        );
        assert_eq!(
            assets.outro_path(),
            PathBuf::from("/srv/assets/fin_de_short.mp4")
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"assets": {"dir": "/opt/short"}, "write_plan_report": true}"#)
                .unwrap();
        assert_eq!(config.assets.dir, PathBuf::from("/opt/short"));
        assert_eq!(config.assets.title_font, "Roboto-Bold.ttf");
        assert_eq!(config.logging.level, "info");
        assert!(config.write_plan_report);
        assert!(config.detector.cascade_path.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/shortsmith/config.json"));
        assert!(!config.write_plan_report);
        assert_eq!(config.assets.dir, PathBuf::from("assets"));
    }
}
