//! OpenCV Haar cascade frontal-face detector.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::GrayImage;
use opencv::core::{Mat, Rect as CvRect, Size as CvSize, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;

use shortsmith_common::error::{ShortsmithError, ShortsmithResult};
use shortsmith_project_model::config::DetectionParams;

use crate::face_zone::{FaceBox, FaceDetector};

/// `CascadeClassifier::detect_multi_scale` needs `&mut self`, so the
/// classifier sits behind a mutex to keep `detect` callable through `&self`.
pub struct HaarCascadeDetector {
    classifier: Mutex<CascadeClassifier>,
    path: PathBuf,
}

impl HaarCascadeDetector {
    /// Load a cascade file. Failure is a fatal configuration error.
    pub fn load(path: &Path) -> ShortsmithResult<Self> {
        let path_str = path.to_str().ok_or_else(|| {
            ShortsmithError::detector_unavailable(format!(
                "cascade path is not valid UTF-8: {}",
                path.display()
            ))
        })?;

        let classifier = CascadeClassifier::new(path_str).map_err(|e| {
            ShortsmithError::detector_unavailable(format!(
                "failed to load cascade {}: {e}",
                path.display()
            ))
        })?;

        let empty = classifier
            .empty()
            .map_err(|e| ShortsmithError::detector_unavailable(e.to_string()))?;
        if empty {
            return Err(ShortsmithError::detector_unavailable(format!(
                "cascade {} loaded empty",
                path.display()
            )));
        }

        Ok(Self {
            classifier: Mutex::new(classifier),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FaceDetector for HaarCascadeDetector {
    fn detect(&self, gray: &GrayImage, params: &DetectionParams) -> ShortsmithResult<Vec<FaceBox>> {
        let mat = Mat::new_rows_cols_with_data(
            gray.height() as i32,
            gray.width() as i32,
            gray.as_raw().as_slice(),
        )
        .map_err(|e| ShortsmithError::detection(format!("failed to wrap frame: {e}")))?;

        let mut faces = Vector::<CvRect>::new();
        let mut classifier = self
            .classifier
            .lock()
            .map_err(|_| ShortsmithError::detection("cascade classifier lock poisoned"))?;

        classifier
            .detect_multi_scale(
                &mat,
                &mut faces,
                params.scale_factor,
                params.min_neighbors as i32,
                0,
                CvSize::new(
                    params.min_size.width as i32,
                    params.min_size.height as i32,
                ),
                CvSize::new(0, 0),
            )
            .map_err(|e| ShortsmithError::detection(format!("detectMultiScale failed: {e}")))?;

        Ok(faces
            .iter()
            .map(|r| FaceBox {
                x: r.x.max(0) as u32,
                y: r.y.max(0) as u32,
                width: r.width.max(0) as u32,
                height: r.height.max(0) as u32,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "opencv-haar"
    }
}
