//! Classify a recording and print its composition plan.

use std::path::PathBuf;

use shortsmith_project_model::metadata::ClipMetadata;
use shortsmith_render_engine::ClipAssembler;

use super::Settings;

pub fn run(
    settings: Settings,
    input: PathBuf,
    title: Option<String>,
    broadcaster: Option<String>,
) -> anyhow::Result<()> {
    let metadata = ClipMetadata {
        title,
        broadcaster_name: broadcaster,
        game_name: None,
    };
    let max_duration = settings.pipeline.max_duration_secs;
    let assembler = ClipAssembler::from_app_config(settings.pipeline, &settings.app)?;

    let sequence = assembler.plan(&input, max_duration, &metadata)?;
    println!("{}", serde_json::to_string_pretty(&sequence)?);
    eprintln!(
        "Layout: {} ({} layers, {:.2}s total{})",
        sequence.main.layout.name(),
        sequence.main.layers().len(),
        sequence.total_duration_secs(),
        if sequence.outro.is_some() { ", with outro" } else { "" }
    );
    Ok(())
}
