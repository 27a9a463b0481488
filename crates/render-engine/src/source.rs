//! The opened, trimmed source clip.

use std::path::Path;

use image::RgbImage;

use shortsmith_common::error::{ShortsmithError, ShortsmithResult};
use shortsmith_processing_core::geometry::SourceFrame;
use shortsmith_project_model::geometry::Size;
use shortsmith_project_model::plan::AudioSource;

use crate::media::{FrameReader, MediaInfo, MediaProbe};

/// Exclusive handle to the source recording for one pipeline run.
///
/// The decoder is released exactly once: by [`SourceClip::close`] or,
/// on any early return, by `Drop`.
pub struct SourceClip {
    info: MediaInfo,
    duration_secs: f64,
    frames: Option<Box<dyn FrameReader>>,
}

impl SourceClip {
    /// Probe and open `path`, trimming to at most `max_duration_secs`.
    pub fn open(
        media: &dyn MediaProbe,
        path: &Path,
        max_duration_secs: f64,
    ) -> ShortsmithResult<Self> {
        let info = media.probe(path)?;
        if info.width == 0 || info.height == 0 {
            return Err(ShortsmithError::probe(format!(
                "{} has an empty frame size",
                path.display()
            )));
        }
        if info.duration_secs.is_nan() || info.duration_secs <= 0.0 {
            return Err(ShortsmithError::probe(format!(
                "{} has no positive duration",
                path.display()
            )));
        }

        let frames = media.open_frames(&info)?;
        let duration_secs = info.duration_secs.min(max_duration_secs);

        tracing::info!(
            path = %path.display(),
            size = %info.size(),
            source_duration_secs = info.duration_secs,
            duration_secs,
            has_audio = info.has_audio,
            "Opened source clip"
        );
        if duration_secs < info.duration_secs {
            tracing::info!(
                from_secs = info.duration_secs,
                to_secs = duration_secs,
                "Source clip trimmed to duration cap"
            );
        }

        Ok(Self {
            info,
            duration_secs,
            frames: Some(frames),
        })
    }

    pub fn path(&self) -> &Path {
        &self.info.path
    }

    pub fn size(&self) -> Size {
        self.info.size()
    }

    /// Duration after trimming.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Duration of the untrimmed recording.
    pub fn source_duration_secs(&self) -> f64 {
        self.info.duration_secs
    }

    pub fn was_trimmed(&self) -> bool {
        self.duration_secs < self.info.duration_secs
    }

    pub fn audio(&self) -> AudioSource {
        if self.info.has_audio {
            AudioSource::SourceTrack
        } else {
            AudioSource::Silent
        }
    }

    /// Size and trimmed duration, as the geometry engine sees them.
    pub fn frame(&self) -> SourceFrame {
        SourceFrame {
            size: self.size(),
            duration_secs: self.duration_secs,
        }
    }

    /// Decode the frame at t=0.
    pub fn first_frame(&mut self) -> ShortsmithResult<RgbImage> {
        let path = self.info.path.display().to_string();
        let reader = self.frames.as_mut().ok_or_else(|| {
            ShortsmithError::frame_extraction(format!("source clip {path} is already closed"))
        })?;

        reader.frame_at(0.0).map_err(|e| {
            ShortsmithError::frame_extraction(format!(
                "cannot extract the first frame of {path}: {e}"
            ))
        })
    }

    pub fn is_open(&self) -> bool {
        self.frames.is_some()
    }

    /// Release the decoder.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut reader) = self.frames.take() {
            reader.close();
            tracing::debug!(path = %self.info.path.display(), "Released source clip");
        }
    }
}

impl Drop for SourceClip {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for SourceClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceClip")
            .field("info", &self.info)
            .field("duration_secs", &self.duration_secs)
            .field("open", &self.is_open())
            .finish()
    }
}
