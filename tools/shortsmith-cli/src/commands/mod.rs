pub mod check;
pub mod config;
pub mod plan;
pub mod render;

use shortsmith_common::config::{config_file_path, AppConfig};
use shortsmith_project_model::config::PipelineConfig;

use crate::SettingsArgs;

/// Effective configuration after applying command-line overrides.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app: AppConfig,
    pub pipeline: PipelineConfig,
}

impl Settings {
    pub fn load(args: &SettingsArgs) -> anyhow::Result<Self> {
        let mut app = match &args.config {
            Some(path) => AppConfig::load_from(path),
            None => AppConfig::load_from(&config_file_path()),
        };
        if let Some(dir) = &args.assets_dir {
            app.assets.dir = dir.clone();
        }
        if let Some(cascade) = &args.cascade {
            app.detector.cascade_path = Some(cascade.clone());
        }

        let pipeline = match &args.pipeline {
            Some(path) => PipelineConfig::from_json_file(path)
                .map_err(|e| anyhow::anyhow!("Invalid pipeline config: {e}"))?,
            None => PipelineConfig::default(),
        };

        Ok(Self { app, pipeline })
    }
}
