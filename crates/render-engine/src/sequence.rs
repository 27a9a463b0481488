//! The final render sequence: main composition plus optional outro.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use shortsmith_common::config::AssetConfig;
use shortsmith_common::error::ShortsmithResult;
use shortsmith_project_model::config::EncoderProfile;
use shortsmith_project_model::plan::CompositionPlan;

use crate::media::MediaProbe;

/// Closing clip appended after the main composition, stretched to the
/// target resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutroSegment {
    pub path: PathBuf,
    pub duration_secs: f64,
    pub has_audio: bool,
}

impl OutroSegment {
    /// Probe the outro asset if it exists. A missing asset yields `None`.
    pub fn from_assets(
        assets: &AssetConfig,
        media: &dyn MediaProbe,
    ) -> ShortsmithResult<Option<Self>> {
        let Some(path) = AssetConfig::existing(assets.outro_path()) else {
            tracing::info!(
                path = %assets.outro_path().display(),
                "No outro asset, skipping outro"
            );
            return Ok(None);
        };

        let info = media.probe(&path)?;
        tracing::info!(
            path = %path.display(),
            duration_secs = info.duration_secs,
            "Appending outro"
        );
        Ok(Some(Self {
            path,
            duration_secs: info.duration_secs,
            has_audio: info.has_audio,
        }))
    }
}

/// Time span of one segment in the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpan {
    pub start_secs: f64,
    pub end_secs: f64,
}

/// Everything a backend needs to produce the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSequence {
    /// Source recording the plan's source layers and audio read from.
    pub source: PathBuf,
    pub main: CompositionPlan,
    pub outro: Option<OutroSegment>,
    pub encoder: EncoderProfile,
}

impl RenderSequence {
    pub fn main_span(&self) -> SegmentSpan {
        SegmentSpan {
            start_secs: 0.0,
            end_secs: self.main.duration_secs,
        }
    }

    /// The outro starts where the main composition ends.
    pub fn outro_span(&self) -> Option<SegmentSpan> {
        self.outro.as_ref().map(|outro| SegmentSpan {
            start_secs: self.main.duration_secs,
            end_secs: self.main.duration_secs + outro.duration_secs,
        })
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.outro_span()
            .map_or(self.main.duration_secs, |span| span.end_secs)
    }

    pub fn total_frames(&self) -> u64 {
        (self.total_duration_secs() * self.encoder.fps as f64).ceil() as u64
    }
}
