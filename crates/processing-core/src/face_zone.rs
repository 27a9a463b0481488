//! Face-in-webcam-zone classification.
//!
//! Decides, from the first frame of a clip, whether a face sits inside the
//! configured webcam zone. The pixel-level work is delegated to a
//! [`FaceDetector`]; this module owns ROI clamping and the policy for
//! unusable zones.

use image::{imageops, GrayImage, RgbImage};

use shortsmith_common::error::ShortsmithResult;
use shortsmith_project_model::config::DetectionParams;
use shortsmith_project_model::geometry::{Rect, Size};

/// A detected face, in pixels relative to the image handed to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Pluggable frontal-face detection backend.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a single-channel luminance image.
    fn detect(&self, gray: &GrayImage, params: &DetectionParams) -> ShortsmithResult<Vec<FaceBox>>;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Why a classification came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneVerdict {
    /// The detector reported at least one face.
    FaceFound { faces: usize },
    /// The detector ran and found nothing.
    NoFace,
    /// The zone has no area inside the frame.
    DegenerateZone,
    /// The zone is smaller than the smallest detectable face.
    ZoneTooSmall { roi: Size },
}

impl ZoneVerdict {
    pub fn has_face(&self) -> bool {
        matches!(self, Self::FaceFound { .. })
    }

    /// Whether the detector was consulted.
    pub fn detector_ran(&self) -> bool {
        matches!(self, Self::FaceFound { .. } | Self::NoFace)
    }
}

/// Classify `frame` and report the full verdict.
///
/// An unusable zone is "no face", never an error. Detector errors are
/// propagated unchanged.
pub fn classify_zone(
    frame: &RgbImage,
    zone: Rect,
    detector: &dyn FaceDetector,
    params: &DetectionParams,
) -> ShortsmithResult<ZoneVerdict> {
    let frame_size = Size::new(frame.width(), frame.height());
    let Some(roi) = zone.clamp_nondegenerate(frame_size) else {
        tracing::debug!(%zone, frame = %frame_size, "Webcam zone is degenerate after clamping");
        return Ok(ZoneVerdict::DegenerateZone);
    };

    let roi_size = roi.size();
    if roi_size.width < params.min_size.width || roi_size.height < params.min_size.height {
        tracing::debug!(roi = %roi_size, min = %params.min_size, "Webcam zone smaller than minimum face size");
        return Ok(ZoneVerdict::ZoneTooSmall { roi: roi_size });
    }

    let gray = luminance_roi(frame, roi);
    let faces = detector.detect(&gray, params)?;
    tracing::debug!(
        detector = detector.name(),
        roi = %roi,
        faces = faces.len(),
        "Face detection finished"
    );

    if faces.is_empty() {
        Ok(ZoneVerdict::NoFace)
    } else {
        Ok(ZoneVerdict::FaceFound { faces: faces.len() })
    }
}

/// `true` iff at least one face is found inside `zone`.
pub fn has_face_in_zone(
    frame: &RgbImage,
    zone: Rect,
    detector: &dyn FaceDetector,
    params: &DetectionParams,
) -> ShortsmithResult<bool> {
    classify_zone(frame, zone, detector, params).map(|verdict| verdict.has_face())
}

/// Crop `roi` out of `frame` and convert it to luminance.
fn luminance_roi(frame: &RgbImage, roi: Rect) -> GrayImage {
    let sub = imageops::crop_imm(
        frame,
        roi.x1 as u32,
        roi.y1 as u32,
        roi.width(),
        roi.height(),
    )
    .to_image();
    imageops::grayscale(&sub)
}

/// Classifier bound to one detector, zone, and parameter set.
pub struct FaceZoneClassifier {
    detector: Box<dyn FaceDetector>,
    zone: Rect,
    params: DetectionParams,
}

impl FaceZoneClassifier {
    pub fn new(detector: Box<dyn FaceDetector>, zone: Rect, params: DetectionParams) -> Self {
        Self {
            detector,
            zone,
            params,
        }
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    pub fn classify(&self, frame: &RgbImage) -> ShortsmithResult<ZoneVerdict> {
        classify_zone(frame, self.zone, self.detector.as_ref(), &self.params)
    }

    pub fn has_face(&self, frame: &RgbImage) -> ShortsmithResult<bool> {
        self.classify(frame).map(|verdict| verdict.has_face())
    }
}

impl std::fmt::Debug for FaceZoneClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceZoneClassifier")
            .field("detector", &self.detector.name())
            .field("zone", &self.zone)
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use shortsmith_common::error::ShortsmithError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Reports a face wherever a solid white square of at least
    /// `params.min_size` appears, scanning on a coarse grid.
    struct WhiteSquareDetector {
        calls: AtomicUsize,
        seen: Mutex<Option<(u32, u32)>>,
    }

    impl WhiteSquareDetector {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(None),
            }
        }
    }

    impl FaceDetector for WhiteSquareDetector {
        fn detect(
            &self,
            gray: &GrayImage,
            params: &DetectionParams,
        ) -> ShortsmithResult<Vec<FaceBox>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen.lock().unwrap() = Some(gray.dimensions());

            let (w, h) = (params.min_size.width, params.min_size.height);
            let mut faces = Vec::new();
            if gray.width() < w || gray.height() < h {
                return Ok(faces);
            }
            for y in (0..=gray.height() - h).step_by(4) {
                for x in (0..=gray.width() - w).step_by(4) {
                    let solid = (y..y + h)
                        .all(|py| (x..x + w).all(|px| gray.get_pixel(px, py).0[0] > 240));
                    if solid {
                        faces.push(FaceBox {
                            x,
                            y,
                            width: w,
                            height: h,
                        });
                    }
                }
            }
            Ok(faces)
        }

        fn name(&self) -> &str {
            "white-square"
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(&self, _: &GrayImage, _: &DetectionParams) -> ShortsmithResult<Vec<FaceBox>> {
            Err(ShortsmithError::detector_unavailable("cascade failed to load"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    const ZONE: Rect = Rect::new(5, 8, 542, 282);

    fn frame_with_square(width: u32, height: u32, at: (u32, u32), side: u32) -> RgbImage {
        let mut frame = RgbImage::from_pixel(width, height, Rgb([20, 30, 40]));
        for y in at.1..at.1 + side {
            for x in at.0..at.0 + side {
                frame.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        frame
    }

    #[test]
    fn test_face_inside_zone_is_found() {
        let detector = WhiteSquareDetector::new();
        let frame = frame_with_square(1280, 720, (200, 100), 48);
        let found =
            has_face_in_zone(&frame, ZONE, &detector, &DetectionParams::default()).unwrap();

        assert!(found);
        assert_eq!(*detector.seen.lock().unwrap(), Some((537, 274)));
    }

    #[test]
    fn test_face_outside_zone_is_ignored() {
        let detector = WhiteSquareDetector::new();
        let frame = frame_with_square(1280, 720, (900, 500), 48);
        let verdict = classify_zone(&frame, ZONE, &detector, &DetectionParams::default()).unwrap();

        assert_eq!(verdict, ZoneVerdict::NoFace);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_frame_without_faces() {
        let detector = WhiteSquareDetector::new();
        let frame = RgbImage::from_pixel(1280, 720, Rgb([0, 0, 0]));
        assert!(!has_face_in_zone(&frame, ZONE, &detector, &DetectionParams::default()).unwrap());
    }

    #[test]
    fn test_degenerate_zone_skips_detector() {
        let detector = WhiteSquareDetector::new();
        let frame = RgbImage::from_pixel(640, 360, Rgb([255, 255, 255]));
        let off_frame = Rect::new(-300, -200, -10, -5);
        let verdict =
            classify_zone(&frame, off_frame, &detector, &DetectionParams::default()).unwrap();

        assert_eq!(verdict, ZoneVerdict::DegenerateZone);
        assert!(!verdict.detector_ran());
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_frame_narrower_than_zone_start_skips_detector() {
        let detector = WhiteSquareDetector::new();
        let frame = RgbImage::from_pixel(4, 720, Rgb([255, 255, 255]));
        let found =
            has_face_in_zone(&frame, ZONE, &detector, &DetectionParams::default()).unwrap();

        assert!(!found);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_small_frame_clamps_zone() {
        let detector = WhiteSquareDetector::new();
        let frame = frame_with_square(320, 180, (100, 60), 30);
        let found =
            has_face_in_zone(&frame, ZONE, &detector, &DetectionParams::default()).unwrap();

        assert!(found);
        assert_eq!(*detector.seen.lock().unwrap(), Some((315, 172)));
    }

    #[test]
    fn test_detector_errors_propagate() {
        let frame = RgbImage::new(1280, 720);
        let err = has_face_in_zone(&frame, ZONE, &FailingDetector, &DetectionParams::default())
            .unwrap_err();
        assert!(err.is_fatal_configuration());
    }

    #[test]
    fn test_classifier_wraps_detector() {
        let classifier = FaceZoneClassifier::new(
            Box::new(WhiteSquareDetector::new()),
            ZONE,
            DetectionParams::default(),
        );
        let frame = frame_with_square(1920, 1080, (300, 120), 64);
        assert_eq!(classifier.detector_name(), "white-square");
        assert!(classifier.has_face(&frame).unwrap());
    }
}
