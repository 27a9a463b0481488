//! Composition plans: ordered, positioned layers ready for rendering.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect, Resolution, Size};
use crate::text::TextStyle;

/// What a layer represents in the composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerRole {
    Background,
    Gameplay,
    Webcam,
    FullBleed,
    Title,
    Caption,
}

impl LayerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Gameplay => "gameplay",
            Self::Webcam => "webcam",
            Self::FullBleed => "full_bleed",
            Self::Title => "title",
            Self::Caption => "caption",
        }
    }
}

/// Crop/scale chain applied to the source clip's video.
///
/// Applied in order: `crop` on the source frame, uniform resize to
/// `scale`, then `post_crop` on the resized image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoTransform {
    pub crop: Option<Rect>,
    pub scale: Size,
    pub post_crop: Option<Rect>,
}

impl VideoTransform {
    /// Size of the frames this transform produces.
    pub fn output_size(&self) -> Size {
        match self.post_crop {
            Some(rect) => rect.size(),
            None => self.scale,
        }
    }
}

/// Frame source of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerContent {
    /// Solid color fill, `[r, g, b]`.
    Solid { color: [u8; 3], size: Size },

    /// Still image stretched to `size`.
    Image { path: PathBuf, size: Size },

    /// The source clip's video through a crop/scale chain.
    Source(VideoTransform),

    /// Rendered caption text.
    Text { text: String, style: TextStyle },
}

/// Horizontal anchor for layers positioned relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAnchor {
    Left,
    Center,
    Right,
}

/// Vertical anchor for layers positioned relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAnchor {
    Top,
    Center,
    Bottom,
}

/// Where a layer's top-left corner goes on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Placement {
    /// Fixed pixel position in target-resolution space.
    At(Point),

    /// Resolved against the layer's own rendered size (text).
    Anchored {
        horizontal: HorizontalAnchor,
        vertical: VerticalAnchor,
    },
}

/// A positioned visual element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub role: LayerRole,
    pub content: LayerContent,
    pub placement: Placement,
    pub duration_secs: f64,
}

impl Layer {
    /// Pixel size of the layer, when known before rendering.
    pub fn size(&self) -> Option<Size> {
        match &self.content {
            LayerContent::Solid { size, .. } | LayerContent::Image { size, .. } => Some(*size),
            LayerContent::Source(transform) => Some(transform.output_size()),
            LayerContent::Text { .. } => None,
        }
    }

    /// Fixed position, if the layer has one.
    pub fn position(&self) -> Option<Point> {
        match self.placement {
            Placement::At(point) => Some(point),
            Placement::Anchored { .. } => None,
        }
    }

    /// Whether the layer draws from the source clip's video.
    pub fn uses_source(&self) -> bool {
        matches!(self.content, LayerContent::Source(_))
    }
}

/// Audio attached to a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioSource {
    /// The (trimmed) source clip's own audio track.
    SourceTrack,
    /// The source has no audio stream.
    Silent,
}

/// The two composition shapes.
///
/// Exactly one is chosen per run, right after classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum Layout {
    /// Backdrop, gameplay strip, webcam on top, then captions.
    WithWebcam {
        background: Layer,
        gameplay: Layer,
        webcam: Layer,
        title: Layer,
        caption: Layer,
    },

    /// Zoom-cropped gameplay covering the whole frame, then captions.
    FullBleed {
        gameplay: Layer,
        title: Layer,
        caption: Layer,
    },
}

impl Layout {
    pub fn name(&self) -> &'static str {
        match self {
            Self::WithWebcam { .. } => "with_webcam",
            Self::FullBleed { .. } => "full_bleed",
        }
    }
}

/// Ordered layers plus resolution, duration, and audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionPlan {
    pub layout: Layout,
    pub resolution: Resolution,
    pub duration_secs: f64,
    pub audio: AudioSource,
}

impl CompositionPlan {
    /// Layers bottom-to-top.
    pub fn layers(&self) -> Vec<&Layer> {
        match &self.layout {
            Layout::WithWebcam {
                background,
                gameplay,
                webcam,
                title,
                caption,
            } => vec![background, gameplay, webcam, title, caption],
            Layout::FullBleed {
                gameplay,
                title,
                caption,
            } => vec![gameplay, title, caption],
        }
    }

    pub fn layer_roles(&self) -> Vec<LayerRole> {
        self.layers().iter().map(|layer| layer.role).collect()
    }

    pub fn has_webcam(&self) -> bool {
        matches!(self.layout, Layout::WithWebcam { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_layer(role: LayerRole) -> Layer {
        Layer {
            role,
            content: LayerContent::Text {
                text: "hello".to_string(),
                style: TextStyle::title(),
            },
            placement: Placement::Anchored {
                horizontal: HorizontalAnchor::Center,
                vertical: VerticalAnchor::Top,
            },
            duration_secs: 4.0,
        }
    }

    #[test]
    fn test_transform_output_size_prefers_post_crop() {
        let transform = VideoTransform {
            crop: None,
            scale: Size::new(3413, 1920),
            post_crop: Some(Rect::new(1166, 0, 2246, 1920)),
        };
        assert_eq!(transform.output_size(), Size::new(1080, 1920));
    }

    #[test]
    fn test_full_bleed_layer_order() {
        let gameplay = Layer {
            role: LayerRole::FullBleed,
            content: LayerContent::Source(VideoTransform {
                crop: None,
                scale: Size::new(1080, 1920),
                post_crop: None,
            }),
            placement: Placement::At(Point::ORIGIN),
            duration_secs: 4.0,
        };
        let plan = CompositionPlan {
            layout: Layout::FullBleed {
                gameplay,
                title: text_layer(LayerRole::Title),
                caption: text_layer(LayerRole::Caption),
            },
            resolution: Size::VERTICAL_HD,
            duration_secs: 4.0,
            audio: AudioSource::SourceTrack,
        };

        assert_eq!(
            plan.layer_roles(),
            vec![LayerRole::FullBleed, LayerRole::Title, LayerRole::Caption]
        );
        assert!(!plan.has_webcam());
        assert_eq!(plan.layers()[0].size(), Some(Size::VERTICAL_HD));
        assert!(plan.layers()[1].size().is_none());
    }

    #[test]
    fn test_plan_serializes_with_layout_tag() {
        let plan = CompositionPlan {
            layout: Layout::FullBleed {
                gameplay: text_layer(LayerRole::FullBleed),
                title: text_layer(LayerRole::Title),
                caption: text_layer(LayerRole::Caption),
            },
            resolution: Size::VERTICAL_HD,
            duration_secs: 1.0,
            audio: AudioSource::Silent,
        };
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["layout"]["layout"], "full_bleed");
        assert_eq!(json["audio"], "silent");
    }
}
