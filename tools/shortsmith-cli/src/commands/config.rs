//! Show the effective configuration.

use shortsmith_common::config::config_file_path;

use super::Settings;

pub fn run(settings: &Settings, save: bool) -> anyhow::Result<()> {
    let effective = serde_json::json!({
        "app": settings.app,
        "pipeline": settings.pipeline,
    });
    println!("{}", serde_json::to_string_pretty(&effective)?);

    if save {
        settings.app.save()?;
        eprintln!("Saved application config to {}", config_file_path().display());
    }
    Ok(())
}
