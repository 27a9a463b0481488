//! Assemble and render a Short.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use shortsmith_project_model::metadata::ClipMetadata;
use shortsmith_render_engine::{process_clip_async, ClipAssembler, RenderProgress, RenderStage};

use super::Settings;

const TEST_INPUT: &str = "video.mp4";
const TEST_TITLE: &str = "Test de montage de clip";
const TEST_BROADCASTER: &str = "Anyme023";
const TEST_GAME: &str = "Valorant";

/// Input file and metadata for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub input: PathBuf,
    pub metadata: ClipMetadata,
}

impl RenderRequest {
    /// All four positionals, or the built-in test values.
    pub fn from_positionals(
        input: Option<PathBuf>,
        title: Option<String>,
        broadcaster: Option<String>,
        game: Option<String>,
    ) -> Self {
        match (input, title, broadcaster, game) {
            (Some(input), Some(title), Some(broadcaster), Some(game)) => Self {
                input,
                metadata: ClipMetadata::new(title, broadcaster, game),
            },
            (None, None, None, None) => Self::test_values(),
            _ => {
                tracing::warn!(
                    "Expected INPUT TITLE BROADCASTER GAME; using the built-in test values"
                );
                Self::test_values()
            }
        }
    }

    fn test_values() -> Self {
        Self {
            input: PathBuf::from(TEST_INPUT),
            metadata: ClipMetadata::new(TEST_TITLE, TEST_BROADCASTER, TEST_GAME),
        }
    }
}

pub async fn run(
    settings: Settings,
    request: RenderRequest,
    output: PathBuf,
    max_duration: f64,
    plan_report: bool,
) -> anyhow::Result<()> {
    println!("Rendering Short from: {}", request.input.display());
    println!("  Title: {}", request.metadata.title());
    println!("  Broadcaster: {}", request.metadata.broadcaster_handle());
    println!("  Output: {}", output.display());

    let write_report = plan_report || settings.app.write_plan_report;
    let assembler = ClipAssembler::from_app_config(settings.pipeline, &settings.app)
        .map(|a| a.with_plan_report(write_report).with_progress(Box::new(print_progress)));

    let result = match assembler {
        Ok(assembler) => {
            process_clip_async(
                Arc::new(assembler),
                request.input,
                output,
                max_duration,
                request.metadata,
            )
            .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(path) => {
            println!("\nDone: {}", path.display());
            Ok(())
        }
        Err(e) => {
            println!("\nProcessing failed: {e}");
            Err(e.into())
        }
    }
}

fn print_progress(p: RenderProgress) {
    match p.stage {
        RenderStage::Preparing => print!("\r  Preparing render...  "),
        RenderStage::Failed => print!("\r  Render failed.  "),
        _ => print!(
            "\r  Progress: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_rendered,
            p.total_frames,
            p.eta_secs,
        ),
    }
    std::io::stdout().flush().ok();
}
