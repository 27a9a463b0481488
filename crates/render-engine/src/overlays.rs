//! Backdrop and caption layers built before the layout decision.
//!
//! Every asset here is optional. A missing file is resolved with a fixed
//! fallback and a log line, never an error.

use std::path::{Path, PathBuf};

use shortsmith_common::config::AssetConfig;
use shortsmith_project_model::geometry::{Point, Resolution};
use shortsmith_project_model::metadata::ClipMetadata;
use shortsmith_project_model::plan::{
    HorizontalAnchor, Layer, LayerContent, LayerRole, Placement, VerticalAnchor,
};
use shortsmith_project_model::text::TextStyle;

const BLACK: [u8; 3] = [0, 0, 0];

/// Backdrop covering the whole frame for `duration_secs`.
///
/// Uses the background image asset when present, else solid black.
pub fn background_layer(assets: &AssetConfig, resolution: Resolution, duration_secs: f64) -> Layer {
    let content = match AssetConfig::existing(assets.background_path()) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Using background image");
            LayerContent::Image {
                path,
                size: resolution,
            }
        }
        None => {
            tracing::info!(
                path = %assets.background_path().display(),
                "Background image not found, using solid black"
            );
            LayerContent::Solid {
                color: BLACK,
                size: resolution,
            }
        }
    };

    Layer {
        role: LayerRole::Background,
        content,
        placement: Placement::At(Point::ORIGIN),
        duration_secs,
    }
}

/// Title layer, anchored top-center.
pub fn title_layer(
    metadata: &ClipMetadata,
    style: &TextStyle,
    assets: &AssetConfig,
    duration_secs: f64,
) -> Layer {
    text_layer(
        LayerRole::Title,
        metadata.title().to_string(),
        resolve_style(style, &assets.title_font_path()),
        VerticalAnchor::Top,
        duration_secs,
    )
}

/// Broadcaster handle (`@name`), anchored bottom-center.
pub fn caption_layer(
    metadata: &ClipMetadata,
    style: &TextStyle,
    assets: &AssetConfig,
    duration_secs: f64,
) -> Layer {
    text_layer(
        LayerRole::Caption,
        metadata.broadcaster_handle(),
        resolve_style(style, &assets.caption_font_path()),
        VerticalAnchor::Bottom,
        duration_secs,
    )
}

fn text_layer(
    role: LayerRole,
    text: String,
    style: TextStyle,
    vertical: VerticalAnchor,
    duration_secs: f64,
) -> Layer {
    Layer {
        role,
        content: LayerContent::Text { text, style },
        placement: Placement::Anchored {
            horizontal: HorizontalAnchor::Center,
            vertical,
        },
        duration_secs,
    }
}

/// Pick the style's own font if set, else the named asset. Fall back to
/// the renderer's default typeface when neither exists.
fn resolve_style(style: &TextStyle, asset_font: &Path) -> TextStyle {
    let wanted: PathBuf = style
        .font
        .clone()
        .unwrap_or_else(|| asset_font.to_path_buf());

    let font = AssetConfig::existing(wanted.clone());
    if font.is_none() {
        tracing::warn!(
            font = %wanted.display(),
            "Font not found, falling back to default typeface"
        );
    }
    style.clone().with_font(font)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortsmith_project_model::geometry::Size;

    #[test]
    fn test_background_falls_back_to_black() {
        let dir = tempfile::tempdir().unwrap();
        let layer = background_layer(&AssetConfig::in_dir(dir.path()), Size::VERTICAL_HD, 8.0);

        assert_eq!(
            layer.content,
            LayerContent::Solid {
                color: [0, 0, 0],
                size: Size::VERTICAL_HD
            }
        );
        assert_eq!(layer.duration_secs, 8.0);
    }

    #[test]
    fn test_background_uses_image_asset() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetConfig::in_dir(dir.path());
        std::fs::write(assets.background_path(), b"png").unwrap();

        let layer = background_layer(&assets, Size::VERTICAL_HD, 8.0);
        assert_eq!(
            layer.content,
            LayerContent::Image {
                path: assets.background_path(),
                size: Size::VERTICAL_HD
            }
        );
    }

    #[test]
    fn test_missing_fonts_fall_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetConfig::in_dir(dir.path());
        let metadata = ClipMetadata::new("Ace", "Anyme023", "Valorant");

        let caption = caption_layer(&metadata, &TextStyle::caption(), &assets, 5.0);
        match caption.content {
            LayerContent::Text { text, style } => {
                assert_eq!(text, "@Anyme023");
                assert_eq!(style.font, None);
                assert_eq!(style.font_size, 40);
            }
            other => panic!("expected text, got {other:?}"),
        }
        assert_eq!(
            caption.placement,
            Placement::Anchored {
                horizontal: HorizontalAnchor::Center,
                vertical: VerticalAnchor::Bottom
            }
        );
    }

    #[test]
    fn test_title_uses_font_asset_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetConfig::in_dir(dir.path());
        std::fs::write(assets.title_font_path(), b"ttf").unwrap();
        let metadata = ClipMetadata::default();

        let title = title_layer(&metadata, &TextStyle::title(), &assets, 5.0);
        match title.content {
            LayerContent::Text { text, style } => {
                assert_eq!(text, "Titre du clip");
                assert_eq!(style.font, Some(assets.title_font_path()));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }
}
