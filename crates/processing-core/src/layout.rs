//! Layout selection: one boolean in, one of two composition plans out.

use shortsmith_common::error::ShortsmithResult;
use shortsmith_project_model::config::PipelineConfig;
use shortsmith_project_model::plan::{AudioSource, CompositionPlan, Layer, Layout};

use crate::geometry::{GeometryEngine, SourceFrame};

/// Layers built before the decision, shared by both layouts.
#[derive(Debug, Clone)]
pub struct LayoutInputs {
    pub source: SourceFrame,
    /// Backdrop at target resolution. Dropped by the full-bleed layout.
    pub background: Layer,
    pub title: Layer,
    pub caption: Layer,
    pub audio: AudioSource,
}

/// Chooses between the webcam and full-bleed compositions.
#[derive(Debug, Clone, Copy)]
pub struct LayoutSelector {
    geometry: GeometryEngine,
}

impl LayoutSelector {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            geometry: GeometryEngine::new(config),
        }
    }

    /// Build the plan for a classification result.
    ///
    /// With a face: `[background, gameplay, webcam, title, caption]`.
    /// Without: `[full-bleed, title, caption]`.
    pub fn select(&self, face_detected: bool, inputs: LayoutInputs) -> ShortsmithResult<CompositionPlan> {
        let LayoutInputs {
            source,
            background,
            title,
            caption,
            audio,
        } = inputs;

        let layout = if face_detected {
            Layout::WithWebcam {
                background,
                gameplay: self.geometry.gameplay_layer(source)?,
                webcam: self.geometry.webcam_layer(source)?,
                title,
                caption,
            }
        } else {
            Layout::FullBleed {
                gameplay: self.geometry.full_bleed_layer(source)?,
                title,
                caption,
            }
        };

        tracing::info!(
            layout = layout.name(),
            face_detected,
            duration_secs = source.duration_secs,
            "Composition layout selected"
        );

        Ok(CompositionPlan {
            layout,
            resolution: self.geometry.resolution(),
            duration_secs: source.duration_secs,
            audio,
        })
    }
}
