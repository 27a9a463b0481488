//! Check external tools, the face detector and assets.

use shortsmith_common::config::AssetConfig;
use shortsmith_processing_core::detector::default_face_detector;
use shortsmith_render_engine::command_exists;

use super::Settings;

pub fn run(settings: &Settings) -> anyhow::Result<()> {
    println!("Shortsmith System Check");
    println!("{}", "=".repeat(50));

    let mut ready = true;
    for tool in ["ffmpeg", "ffprobe"] {
        if command_exists(tool) {
            println!("[OK] {tool} found in PATH");
        } else {
            println!("[FAIL] {tool} not found in PATH");
            ready = false;
        }
    }

    match default_face_detector(&settings.app.detector) {
        Ok(detector) => println!("[OK] Face detector: {}", detector.name()),
        Err(e) => {
            println!("[FAIL] {e}");
            ready = false;
        }
    }

    let assets = &settings.app.assets;
    println!();
    println!("Optional assets in {}:", assets.dir.display());
    for (label, path, fallback) in [
        ("Background", assets.background_path(), "solid black"),
        ("Outro", assets.outro_path(), "no outro"),
        ("Title font", assets.title_font_path(), "default typeface"),
        ("Caption font", assets.caption_font_path(), "default typeface"),
    ] {
        match AssetConfig::existing(path.clone()) {
            Some(_) => println!("[OK] {label}: {}", path.display()),
            None => println!("[WARN] {label} missing ({}), using {fallback}", path.display()),
        }
    }

    let pipeline = &settings.pipeline;
    println!();
    println!(
        "Pipeline: {} @ {} fps, webcam zone {}, cap {:.0}s",
        pipeline.resolution, pipeline.encoder.fps, pipeline.webcam_zone, pipeline.max_duration_secs
    );

    println!();
    if ready {
        println!("All required capabilities are available. Shortsmith is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }
    Ok(())
}
