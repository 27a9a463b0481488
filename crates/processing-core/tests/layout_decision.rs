use image::{GrayImage, Rgb, RgbImage};

use shortsmith_common::error::ShortsmithResult;
use shortsmith_processing_core::face_zone::{FaceBox, FaceDetector, FaceZoneClassifier};
use shortsmith_processing_core::geometry::SourceFrame;
use shortsmith_processing_core::layout::{LayoutInputs, LayoutSelector};
use shortsmith_project_model::config::{DetectionParams, PipelineConfig};
use shortsmith_project_model::geometry::{Point, Size};
use shortsmith_project_model::plan::{
    AudioSource, HorizontalAnchor, Layer, LayerContent, LayerRole, Placement, VerticalAnchor,
};
use shortsmith_project_model::text::TextStyle;

/// Treats any pixel brighter than 250 as part of a face.
struct BrightPixelDetector;

impl FaceDetector for BrightPixelDetector {
    fn detect(&self, gray: &GrayImage, _: &DetectionParams) -> ShortsmithResult<Vec<FaceBox>> {
        Ok(gray
            .enumerate_pixels()
            .find(|(_, _, p)| p.0[0] > 250)
            .map(|(x, y, _)| FaceBox {
                x,
                y,
                width: 1,
                height: 1,
            })
            .into_iter()
            .collect())
    }

    fn name(&self) -> &str {
        "bright-pixel"
    }
}

fn layout_inputs(width: u32, height: u32, duration_secs: f64) -> LayoutInputs {
    let text = |role, label: &str, vertical, style| Layer {
        role,
        content: LayerContent::Text {
            text: label.to_string(),
            style,
        },
        placement: Placement::Anchored {
            horizontal: HorizontalAnchor::Center,
            vertical,
        },
        duration_secs,
    };
    LayoutInputs {
        source: SourceFrame::new(width, height, duration_secs),
        background: Layer {
            role: LayerRole::Background,
            content: LayerContent::Solid {
                color: [0, 0, 0],
                size: Size::VERTICAL_HD,
            },
            placement: Placement::At(Point::ORIGIN),
            duration_secs,
        },
        title: text(
            LayerRole::Title,
            "Ace on Bind",
            VerticalAnchor::Top,
            TextStyle::title(),
        ),
        caption: text(
            LayerRole::Caption,
            "@Anyme023",
            VerticalAnchor::Bottom,
            TextStyle::caption(),
        ),
        audio: AudioSource::SourceTrack,
    }
}

fn decide(frame: &RgbImage, duration_secs: f64) -> Vec<LayerRole> {
    let config = PipelineConfig::default();
    let classifier = FaceZoneClassifier::new(
        Box::new(BrightPixelDetector),
        config.webcam_zone,
        config.detection,
    );
    let face = classifier.has_face(frame).expect("classification succeeds");
    LayoutSelector::new(&config)
        .select(
            face,
            layout_inputs(frame.width(), frame.height(), duration_secs),
        )
        .expect("plan builds")
        .layer_roles()
}

#[test]
fn bright_spot_in_webcam_zone_keeps_webcam() {
    let mut frame = RgbImage::from_pixel(1920, 1080, Rgb([30, 30, 30]));
    frame.put_pixel(100, 100, Rgb([255, 255, 255]));

    assert_eq!(
        decide(&frame, 12.0),
        vec![
            LayerRole::Background,
            LayerRole::Gameplay,
            LayerRole::Webcam,
            LayerRole::Title,
            LayerRole::Caption,
        ]
    );
}

#[test]
fn bright_spot_outside_zone_goes_full_bleed() {
    let mut frame = RgbImage::from_pixel(1920, 1080, Rgb([30, 30, 30]));
    frame.put_pixel(1500, 900, Rgb([255, 255, 255]));

    assert_eq!(
        decide(&frame, 12.0),
        vec![LayerRole::FullBleed, LayerRole::Title, LayerRole::Caption]
    );
}

#[test]
fn full_bleed_fills_target_for_common_aspects() {
    let selector = LayoutSelector::new(&PipelineConfig::default());
    for (w, h) in [(1920, 1080), (1440, 1080), (1080, 1080), (1080, 1920), (720, 1280)] {
        let plan = selector
            .select(false, layout_inputs(w, h, 3.0))
            .expect("full bleed plan");
        assert_eq!(
            plan.layers()[0].size(),
            Some(Size::VERTICAL_HD),
            "source {w}x{h}"
        );
    }
}
