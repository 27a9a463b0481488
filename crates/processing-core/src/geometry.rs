//! Geometry engine: crop rectangles, resize targets, and positions for
//! the webcam strip, the gameplay strip, and the full-bleed zoom.
//!
//! Pure functions over [`Size`] and [`Rect`]. Rounding comes from
//! `shortsmith_project_model::geometry` so both layouts share it.

use shortsmith_common::error::{ShortsmithError, ShortsmithResult};
use shortsmith_project_model::config::PipelineConfig;
use shortsmith_project_model::geometry::{centered_offset, Point, Rect, Resolution, Size};
use shortsmith_project_model::plan::{Layer, LayerContent, LayerRole, Placement, VideoTransform};

/// Dimensions and length of the (trimmed) source clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceFrame {
    pub size: Size,
    pub duration_secs: f64,
}

impl SourceFrame {
    pub fn new(width: u32, height: u32, duration_secs: f64) -> Self {
        Self {
            size: Size::new(width, height),
            duration_secs,
        }
    }
}

/// Computes source-layer transforms for a fixed target resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryEngine {
    resolution: Resolution,
    webcam_zone: Rect,
    webcam_height: u32,
    gameplay_height: u32,
}

impl GeometryEngine {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            resolution: config.resolution,
            webcam_zone: config.webcam_zone,
            webcam_height: config.webcam_height(),
            gameplay_height: config.gameplay_height(),
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Webcam zone cropped from the source, resized to the webcam strip
    /// height, centered horizontally and anchored at the top.
    pub fn webcam_layer(&self, source: SourceFrame) -> ShortsmithResult<Layer> {
        let crop = self
            .webcam_zone
            .clamp_nondegenerate(source.size)
            .ok_or_else(|| {
                ShortsmithError::geometry(format!(
                    "webcam zone {} has no area inside a {} source",
                    self.webcam_zone, source.size
                ))
            })?;
        let scale = crop.size().scale_to_height(self.webcam_height);
        let position = Point::new(centered_offset(self.resolution.width, scale.width), 0);

        Ok(source_layer(
            LayerRole::Webcam,
            VideoTransform {
                crop: Some(crop),
                scale,
                post_crop: None,
            },
            position,
            source.duration_secs,
        ))
    }

    /// Everything below the webcam zone, resized to the gameplay strip
    /// height, centered horizontally and stacked under the webcam strip.
    pub fn gameplay_layer(&self, source: SourceFrame) -> ShortsmithResult<Layer> {
        let width = source.size.width as i32;
        let height = source.size.height as i32;
        let top = self.webcam_zone.y2.clamp(0, height);
        let crop = Rect::new(0, top, width, height);
        if crop.is_degenerate() {
            return Err(ShortsmithError::geometry(format!(
                "no gameplay area below row {} in a {} source",
                self.webcam_zone.y2, source.size
            )));
        }

        let scale = crop.size().scale_to_height(self.gameplay_height);
        let position = Point::new(
            centered_offset(self.resolution.width, scale.width),
            self.webcam_height as i32,
        );

        Ok(source_layer(
            LayerRole::Gameplay,
            VideoTransform {
                crop: Some(crop),
                scale,
                post_crop: None,
            },
            position,
            source.duration_secs,
        ))
    }

    /// The whole source resized to the target height, then center-cropped
    /// to exactly the target resolution.
    ///
    /// Sources narrower than the target aspect are resized by width
    /// instead so the frame is always covered.
    pub fn full_bleed_layer(&self, source: SourceFrame) -> ShortsmithResult<Layer> {
        if source.size.is_empty() {
            return Err(ShortsmithError::geometry(format!(
                "cannot zoom an empty {} source",
                source.size
            )));
        }

        let target = self.resolution;
        let mut scale = source.size.scale_to_height(target.height);
        if scale.width < target.width {
            scale = source.size.scale_to_width(target.width);
        }

        let origin = Point::new(
            centered_offset(scale.width, target.width),
            centered_offset(scale.height, target.height),
        );

        Ok(source_layer(
            LayerRole::FullBleed,
            VideoTransform {
                crop: None,
                scale,
                post_crop: Some(Rect::from_origin(origin, target)),
            },
            Point::ORIGIN,
            source.duration_secs,
        ))
    }
}

fn source_layer(
    role: LayerRole,
    transform: VideoTransform,
    position: Point,
    duration_secs: f64,
) -> Layer {
    Layer {
        role,
        content: LayerContent::Source(transform),
        placement: Placement::At(position),
        duration_secs,
    }
}
